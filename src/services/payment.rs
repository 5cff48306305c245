//! payment.rs
//!
//! Оплата подтверждённого выбора и отмена бронирований.
//!
//! Ключевые компоненты:
//! 1.  **VolumeDiscount / Quote**: расчёт стоимости выбора. При покупке от
//!     `threshold` мест на каждое место действует скидка `percent` %.
//! 2.  **CardDetails**: проверка формата данных карты. Реального списания нет,
//!     карта с корректным форматом считается принятой.
//! 3.  **checkout**: перевод удержанных мест в проданные и запись бронирования
//!     в журнал покупателя. При любой ошибке места остаются удержанными.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use crate::error::{EngineError, Result};
use crate::ids::BookingId;
use crate::models::{Booking, SeatStatus, Show, User};
use crate::services::selection::SeatSelection;
use crate::venue::Venue;

/// Округление денежной суммы до копеек, банковское.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Скидка за объём покупки.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeDiscount {
    pub threshold: u32,
    pub percent: Decimal,
}

impl Default for VolumeDiscount {
    fn default() -> Self {
        Self {
            threshold: 6,
            percent: dec!(5),
        }
    }
}

impl VolumeDiscount {
    pub fn percent_for(&self, seats: usize) -> Decimal {
        if seats >= self.threshold as usize {
            self.percent
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub position: String,
    pub initial_price: Decimal,
    pub discount_percent: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub total: Decimal,
}

/// Стоимость выбора по текущим ценам мест шоу.
pub fn quote(show: &Show, selection: &SeatSelection, discount: &VolumeDiscount) -> Result<Quote> {
    let percent = discount.percent_for(selection.len());
    let factor = (dec!(100) - percent) / dec!(100);

    let out_of_range = || EngineError::validation("selection total is out of range");

    let mut lines = Vec::with_capacity(selection.len());
    for seat_id in selection.seat_ids() {
        let seat = show.seat(seat_id)?;
        lines.push(QuoteLine {
            position: seat.position().to_string(),
            initial_price: seat.price(),
            discount_percent: percent,
            price: seat.price().checked_mul(factor).ok_or_else(out_of_range)?,
        });
    }

    let total = lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.price))
        .ok_or_else(out_of_range)?;
    Ok(Quote { lines, total: round_money(total) })
}

/// Данные карты. Номер: четыре группы по четыре цифры через пробел или дефис.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CardDetails {
    #[validate(length(min = 1, message = "Имя держателя карты обязательно"))]
    pub holder: String,
    #[validate(custom(function = "validate_card_number"))]
    pub number: String,
    #[validate(custom(function = "validate_security_code"))]
    pub security_code: String,
}

fn validate_card_number(number: &str) -> std::result::Result<(), ValidationError> {
    let groups: Vec<&str> = number.split(['-', ' ']).collect();
    let separators = number.chars().filter(|c| *c == '-' || *c == ' ').count();
    let well_formed = groups.len() == 4
        && separators == 3
        && groups
            .iter()
            .all(|g| g.len() == 4 && g.chars().all(|c| c.is_ascii_digit()));

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("card_number");
        err.message = Some("Номер карты: 4 группы по 4 цифры".into());
        Err(err)
    }
}

fn validate_security_code(code: &str) -> std::result::Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("security_code");
        err.message = Some("Код безопасности: 3 цифры".into());
        Err(err)
    }
}

/// Итог оплаты.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub booking: Booking,
    pub quote: Quote,
}

/// Оплачивает подтверждённый выбор покупателя.
///
/// Порядок проверок: карта, тип аккаунта, подтверждение выбора, статус мест.
/// Места переводятся в `Booked` только когда все проверки пройдены.
pub fn checkout(
    venue: &mut Venue,
    selection: &SeatSelection,
    user: &mut User,
    card: &CardDetails,
    discount: &VolumeDiscount,
) -> Result<Receipt> {
    card.validate()
        .map_err(|e| EngineError::validation(e.to_string()))?;
    user.as_customer()?;

    if !selection.is_complete() {
        return Err(EngineError::validation(
            "selection must be accepted before payment",
        ));
    }

    let show = venue.show_mut(selection.show_id())?;
    for seat_id in selection.seat_ids() {
        let seat = show.seat(seat_id)?;
        if seat.status() != SeatStatus::Held {
            warn!(
                "Checkout for show {} rejected: seat {} is {}",
                show.id(),
                seat.position(),
                seat.status()
            );
            return Err(EngineError::SeatUnavailable(seat.position().to_string()));
        }
    }

    let quote = quote(show, selection, discount)?;
    for seat_id in selection.seat_ids() {
        show.seat_mut(seat_id)?.book()?;
    }
    let show_id = show.id();

    let booking_id = venue.next_booking_id();
    let positions = quote.lines.iter().map(|l| l.position.clone()).collect();
    let booking = Booking::new(booking_id, show_id, positions);
    user.as_customer_mut()?.add_booking(booking.clone());

    info!(
        "Booking {} paid by {}: show {}, {} seats, total {}",
        booking_id,
        user.username,
        show_id,
        booking.seats().len(),
        quote.total
    );
    Ok(Receipt { booking, quote })
}

/// Отменяет бронирование покупателя. Места остаются проданными.
pub fn cancel_booking(user: &mut User, id: BookingId) -> Result<Booking> {
    let booking = user.as_customer_mut()?.cancel_booking(id)?;
    info!(
        "Booking {} cancelled by {}, seats {:?} stay booked",
        id, user.username, booking.seats()
    );
    Ok(booking)
}
