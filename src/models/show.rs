use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use crate::error::{EngineError, Result};
use crate::ids::{PromotionId, SeatId, ShowId};
use crate::models::promotion::Promotion;
use crate::models::seat::{Seat, SeatStatus};

/// Значения по умолчанию для новых шоу.
#[derive(Debug, Clone, Serialize)]
pub struct ShowDefaults {
    pub seat_price: Decimal,
    pub max_seats_per_user: u32,
}

impl Default for ShowDefaults {
    fn default() -> Self {
        Self {
            seat_price: dec!(10.00),
            max_seats_per_user: 50,
        }
    }
}

/// Буквенное обозначение в стиле колонок электронной таблицы:
/// 1 -> "A", 26 -> "Z", 27 -> "AA", 28 -> "AB".
pub fn column_label(mut n: u32) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Show {
    id: ShowId,
    name: String,
    scheduled_at: NaiveDateTime,
    min_age: u8,
    rows: u32,
    cols: u32,
    #[serde(skip)]
    seats: Vec<Seat>,
    promotion: Option<PromotionId>,
    default_seat_price: Decimal,
    max_seats_per_user: u32,
}

impl Show {
    /// Места нумеруются по колонкам: `id = col * rows + row`,
    /// метка - буквы колонки и номер ряда с единицы ("A1", "A2", …, "B1").
    pub fn new(
        id: ShowId,
        name: impl Into<String>,
        scheduled_at: NaiveDateTime,
        rows: u32,
        cols: u32,
        defaults: &ShowDefaults,
    ) -> Self {
        let mut seats = Vec::with_capacity((rows * cols) as usize);
        for col in 0..cols {
            let letters = column_label(col + 1);
            for row in 0..rows {
                let seat_id = SeatId(col * rows + row);
                seats.push(Seat::new(
                    seat_id,
                    format!("{}{}", letters, row + 1),
                    defaults.seat_price,
                ));
            }
        }

        Self {
            id,
            name: name.into(),
            scheduled_at,
            min_age: 0,
            rows,
            cols,
            seats,
            promotion: None,
            default_seat_price: defaults.seat_price,
            max_seats_per_user: defaults.max_seats_per_user,
        }
    }

    pub fn id(&self) -> ShowId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.scheduled_at
    }

    /// Перенос шоу. Проверка «в будущем» - на стороне вызывающего.
    pub fn reschedule(&mut self, at: NaiveDateTime) {
        self.scheduled_at = at;
    }

    pub fn min_age(&self) -> u8 {
        self.min_age
    }

    pub fn set_min_age(&mut self, age: u8) {
        self.min_age = age;
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn max_seats_per_user(&self) -> u32 {
        self.max_seats_per_user
    }

    pub fn set_max_seats_per_user(&mut self, max: u32) {
        self.max_seats_per_user = max;
    }

    pub fn default_seat_price(&self) -> Decimal {
        self.default_seat_price
    }

    /// Акция, применённая к шоу; `None` означает цены без скидки.
    pub fn promotion(&self) -> Option<PromotionId> {
        self.promotion
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, id: SeatId) -> Result<&Seat> {
        self.seats
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| EngineError::not_found("seat", id))
    }

    pub fn seat_at(&self, position: &str) -> Result<&Seat> {
        self.seats
            .iter()
            .find(|s| s.position() == position)
            .ok_or_else(|| EngineError::not_found("seat", position))
    }

    pub(crate) fn seat_mut(&mut self, id: SeatId) -> Result<&mut Seat> {
        self.seats
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| EngineError::not_found("seat", id))
    }

    pub(crate) fn seat_at_mut(&mut self, position: &str) -> Result<&mut Seat> {
        self.seats
            .iter_mut()
            .find(|s| s.position() == position)
            .ok_or_else(|| EngineError::not_found("seat", position))
    }

    /// `promotion` - акция из каталога площадки, применённая к шоу (или `None`).
    /// При переполнении цены шоу не меняется.
    pub(crate) fn set_default_seat_price(
        &mut self,
        price: Decimal,
        promotion: Option<&Promotion>,
    ) -> Result<()> {
        let prices = self.priced_seats(price, promotion)?;
        self.default_seat_price = price;
        self.assign_prices(prices);
        Ok(())
    }

    pub(crate) fn apply_promotion(&mut self, promotion: &Promotion) -> Result<()> {
        let prices = self.priced_seats(self.default_seat_price, Some(promotion))?;
        self.promotion = Some(promotion.id());
        self.assign_prices(prices);
        Ok(())
    }

    pub(crate) fn clear_promotion(&mut self) {
        self.promotion = None;
        let base = self.default_seat_price;
        for seat in &mut self.seats {
            seat.set_price(base);
        }
    }

    // Цена каждого места: base * множитель его уровня, либо base
    fn priced_seats(&self, base: Decimal, promotion: Option<&Promotion>) -> Result<Vec<Decimal>> {
        self.seats
            .iter()
            .map(|seat| match promotion.and_then(|p| p.multiplier_for(seat.id())) {
                Some(m) => base.checked_mul(m).ok_or_else(|| {
                    EngineError::validation(format!(
                        "price {} x {} for seat {} is out of range",
                        base,
                        m,
                        seat.position()
                    ))
                }),
                None => Ok(base),
            })
            .collect()
    }

    fn assign_prices(&mut self, prices: Vec<Decimal>) {
        for (seat, price) in self.seats.iter_mut().zip(prices) {
            seat.set_price(price);
        }
    }

    /// Минимальная и максимальная цена места в шоу.
    pub fn price_bounds(&self) -> Option<(Decimal, Decimal)> {
        let min = self.seats.iter().map(Seat::price).min()?;
        let max = self.seats.iter().map(Seat::price).max()?;
        Some((min, max))
    }

    pub fn seat_counts(&self) -> SeatCounts {
        let mut counts = SeatCounts {
            total: self.seats.len(),
            ..SeatCounts::default()
        };
        for seat in &self.seats {
            match seat.status() {
                SeatStatus::Empty => counts.empty += 1,
                SeatStatus::Held => counts.held += 1,
                SeatStatus::Booked => counts.booked += 1,
            }
        }
        counts
    }

    pub fn seat_map(&self) -> SeatMap {
        let lines = self
            .seats
            .chunks(self.rows.max(1) as usize)
            .enumerate()
            .map(|(col, seats)| SeatMapLine {
                letters: column_label(col as u32 + 1),
                statuses: seats.iter().map(Seat::status).collect(),
            })
            .collect();

        SeatMap {
            rows: self.rows,
            lines,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeatCounts {
    pub total: usize,
    pub empty: usize,
    pub held: usize,
    pub booked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatMapLine {
    pub letters: String,
    pub statuses: Vec<SeatStatus>,
}

/// Схема зала: по строке на каждую буквенную колонку, в строке - статусы
/// мест с номерами 1..=rows.
#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub rows: u32,
    pub lines: Vec<SeatMapLine>,
}

impl fmt::Display for SeatMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for number in 1..=self.rows {
            let cell = format!("{:<3}", number);
            f.write_str(&cell[..3])?;
        }
        writeln!(f)?;
        for line in &self.lines {
            for status in &line.statuses {
                write!(f, "{}  ", status.marker())?;
            }
            writeln!(f, "\t{}", line.letters)?;
        }
        write!(f, "\n Key:\nE = Empty\nH = Held\nB = Booked")
    }
}
