//! selection.rs
//!
//! Выбор мест покупателем перед оплатой.
//!
//! Два входа в один и тот же механизм удержания мест:
//! 1.  **Автоматический выбор**: лучшие (с меньшим номером) свободные места
//!     в заданном ценовом диапазоне удерживаются сразу, все или ни одного.
//! 2.  **Интерактивный выбор**: места удерживаются по одному по метке ("B3").
//!     Выбор - очередь FIFO: при превышении нужного количества самое старое
//!     место возвращается в продажу.
//!
//! Выбор, полученный автоматически, можно дальше править интерактивно.
//! Отказ от выбора (`abandon`) освобождает все места, которые он удерживает.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::ids::{SeatId, ShowId};
use crate::models::{SeatStatus, Show};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Automatic,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    /// Удержано меньше мест, чем нужно, или выбор ещё не подтверждён.
    Collecting,
    /// Удержано ровно нужное количество и покупатель подтвердил выбор.
    Complete,
}

/// Ценовой диапазон для автоматического выбора, границы включительно.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Результат удержания места в интерактивном режиме.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldOutcome {
    pub held: String,
    /// Место, вытесненное из начала очереди, если выбор был полон.
    pub evicted: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatSelection {
    show_id: ShowId,
    wanted: u32,
    mode: SelectionMode,
    state: SelectionState,
    held: VecDeque<SeatId>,
}

impl SeatSelection {
    /// Пустой выбор для интерактивного режима.
    pub fn interactive(show: &Show, wanted: u32) -> Result<Self> {
        Self::check_count(show, wanted)?;
        Ok(Self {
            show_id: show.id(),
            wanted,
            mode: SelectionMode::Interactive,
            state: SelectionState::Collecting,
            held: VecDeque::new(),
        })
    }

    /// Удерживает `wanted` свободных мест с наименьшими номерами в диапазоне цен.
    ///
    /// Если подходящих мест меньше, чем нужно, ничего не удерживается
    /// и возвращается `InsufficientSeats`.
    pub fn automatic(show: &mut Show, wanted: u32, range: PriceRange) -> Result<Self> {
        Self::check_count(show, wanted)?;

        let mut candidates: Vec<SeatId> = show
            .seats()
            .iter()
            .filter(|s| s.is_empty() && range.contains(s.price()))
            .map(|s| s.id())
            .collect();
        candidates.sort_unstable();

        if candidates.len() < wanted as usize {
            return Err(EngineError::InsufficientSeats {
                requested: wanted,
                available: candidates.len(),
            });
        }

        let mut selection = Self {
            show_id: show.id(),
            wanted,
            mode: SelectionMode::Automatic,
            state: SelectionState::Collecting,
            held: VecDeque::with_capacity(wanted as usize),
        };
        for seat_id in candidates.into_iter().take(wanted as usize) {
            show.seat_mut(seat_id)?.hold()?;
            selection.held.push_back(seat_id);
        }

        info!(
            "Auto-selected {} seats for show {} in price range {}-{}",
            wanted, selection.show_id, range.min, range.max
        );
        Ok(selection)
    }

    fn check_count(show: &Show, wanted: u32) -> Result<()> {
        if wanted == 0 || wanted > show.max_seats_per_user() {
            return Err(EngineError::validation(format!(
                "number of seats must be between 1 and {}",
                show.max_seats_per_user()
            )));
        }
        Ok(())
    }

    fn check_show(&self, show: &Show) -> Result<()> {
        if show.id() != self.show_id {
            return Err(EngineError::validation(format!(
                "selection belongs to show {}, not {}",
                self.show_id,
                show.id()
            )));
        }
        Ok(())
    }

    pub fn show_id(&self) -> ShowId {
        self.show_id
    }

    pub fn wanted(&self) -> u32 {
        self.wanted
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.held.len() == self.wanted as usize
    }

    pub fn is_complete(&self) -> bool {
        self.state == SelectionState::Complete
    }

    /// Номера удержанных мест, от самого старого к самому новому.
    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.held.iter().copied()
    }

    pub fn positions(&self, show: &Show) -> Result<Vec<String>> {
        self.check_show(show)?;
        self.held
            .iter()
            .map(|id| show.seat(*id).map(|s| s.position().to_string()))
            .collect()
    }

    /// Удерживает место по метке. Занятое место отклоняется без побочных эффектов.
    pub fn hold(&mut self, show: &mut Show, position: &str) -> Result<HoldOutcome> {
        self.check_show(show)?;

        let seat = show.seat_at_mut(position)?;
        seat.hold()?;
        let seat_id = seat.id();
        self.held.push_back(seat_id);
        self.state = SelectionState::Collecting;

        let mut evicted = None;
        if self.held.len() > self.wanted as usize {
            if let Some(oldest) = self.held.pop_front() {
                let seat = show.seat_mut(oldest)?;
                seat.release();
                evicted = Some(seat.position().to_string());
            }
        }

        debug!(
            "Show {}: held {} ({}/{}), evicted {:?}",
            self.show_id,
            position,
            self.held.len(),
            self.wanted,
            evicted
        );
        Ok(HoldOutcome {
            held: position.to_string(),
            evicted,
        })
    }

    /// Возвращает в продажу одно место из этого выбора.
    pub fn release(&mut self, show: &mut Show, position: &str) -> Result<()> {
        self.check_show(show)?;

        let seat_id = show.seat_at(position)?.id();
        let index = self
            .held
            .iter()
            .position(|id| *id == seat_id)
            .ok_or_else(|| EngineError::not_found("held seat", position))?;
        self.held.remove(index);
        show.seat_mut(seat_id)?.release();
        self.state = SelectionState::Collecting;

        debug!("Show {}: released {}", self.show_id, position);
        Ok(())
    }

    /// Подтверждение возможно только при ровно `wanted` удержанных местах.
    pub fn accept(&mut self) -> Result<()> {
        if !self.is_full() {
            return Err(EngineError::validation(format!(
                "{} of {} seats selected",
                self.held.len(),
                self.wanted
            )));
        }
        self.state = SelectionState::Complete;
        Ok(())
    }

    /// Снова удерживает места выбора, освобождённые неудавшейся заменой.
    pub(crate) fn reclaim(&self, show: &mut Show) -> Result<()> {
        self.check_show(show)?;
        for seat_id in self.seat_ids() {
            let seat = show.seat_mut(seat_id)?;
            if seat.is_empty() {
                seat.hold()?;
            }
        }
        Ok(())
    }

    /// Отказ от выбора: все ещё удержанные им места снова свободны.
    /// Возвращает метки освобождённых мест.
    pub fn abandon(self, show: &mut Show) -> Result<Vec<String>> {
        self.check_show(show)?;

        let mut released = Vec::with_capacity(self.held.len());
        for seat_id in self.held {
            let seat = show.seat_mut(seat_id)?;
            if seat.status() == SeatStatus::Held && seat.release() {
                released.push(seat.position().to_string());
            }
        }

        info!(
            "Selection for show {} abandoned, {} seats released",
            self.show_id,
            released.len()
        );
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PromotionId;
    use crate::models::{Promotion, ShowDefaults};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn show(rows: u32, cols: u32) -> Show {
        let at = NaiveDate::from_ymd_opt(2030, 1, 1)
            .and_then(|d| d.and_hms_opt(20, 0, 0))
            .unwrap();
        Show::new(ShowId(0), "Test", at, rows, cols, &ShowDefaults::default())
    }

    fn statuses(show: &Show) -> Vec<SeatStatus> {
        show.seats().iter().map(|s| s.status()).collect()
    }

    #[test]
    fn automatic_picks_lowest_ids() {
        let mut show = show(10, 1);
        let selection =
            SeatSelection::automatic(&mut show, 3, PriceRange::new(dec!(5.0), dec!(10.0))).unwrap();

        assert_eq!(
            selection.seat_ids().collect::<Vec<_>>(),
            [SeatId(0), SeatId(1), SeatId(2)]
        );
        assert_eq!(selection.mode(), SelectionMode::Automatic);
        for seat in show.seats() {
            let expected = if seat.id().0 < 3 { SeatStatus::Held } else { SeatStatus::Empty };
            assert_eq!(seat.status(), expected);
        }
    }

    #[test]
    fn automatic_skips_taken_and_out_of_range_seats() {
        let mut show = show(10, 1);
        show.seat_at_mut("A1").unwrap().hold().unwrap();
        let promo =
            Promotion::new(PromotionId(0), "vip", &[dec!(3)], &[vec![1, 2]]).unwrap();
        show.apply_promotion(&promo).unwrap();

        let selection =
            SeatSelection::automatic(&mut show, 2, PriceRange::new(dec!(0), dec!(15))).unwrap();
        assert_eq!(selection.positions(&show).unwrap(), ["A4", "A5"]);
    }

    #[test]
    fn automatic_holds_nothing_when_short() {
        let mut show = show(4, 1);
        let err = SeatSelection::automatic(&mut show, 3, PriceRange::new(dec!(11), dec!(20)))
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientSeats { requested: 3, available: 0 });

        show.seat_at_mut("A1").unwrap().hold().unwrap();
        show.seat_at_mut("A2").unwrap().hold().unwrap();
        let before = statuses(&show);
        let err = SeatSelection::automatic(&mut show, 3, PriceRange::new(dec!(0), dec!(20)))
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientSeats { requested: 3, available: 2 });
        assert_eq!(statuses(&show), before);
    }

    #[test]
    fn automatic_takes_exactly_the_remaining_seats() {
        let mut show = show(3, 1);
        let selection =
            SeatSelection::automatic(&mut show, 3, PriceRange::new(dec!(10), dec!(10))).unwrap();
        assert!(selection.is_full());
    }

    #[test]
    fn count_must_respect_limit() {
        let mut show = show(5, 2);
        show.set_max_seats_per_user(4);
        assert!(matches!(
            SeatSelection::interactive(&show, 0),
            Err(EngineError::Validation(_))
        ));
        assert!(SeatSelection::interactive(&show, 5).is_err());
        assert!(SeatSelection::interactive(&show, 4).is_ok());
    }

    #[test]
    fn interactive_evicts_oldest_seat() {
        let mut show = show(5, 1);
        let mut selection = SeatSelection::interactive(&show, 2).unwrap();

        selection.hold(&mut show, "A1").unwrap();
        selection.hold(&mut show, "A2").unwrap();
        let outcome = selection.hold(&mut show, "A3").unwrap();

        assert_eq!(outcome.evicted.as_deref(), Some("A1"));
        assert_eq!(selection.positions(&show).unwrap(), ["A2", "A3"]);
        assert_eq!(show.seat_at("A1").unwrap().status(), SeatStatus::Empty);
        assert_eq!(show.seat_at("A2").unwrap().status(), SeatStatus::Held);
        assert_eq!(show.seat_at("A3").unwrap().status(), SeatStatus::Held);
    }

    #[test]
    fn interactive_rejects_taken_seat_without_side_effects() {
        let mut show = show(5, 1);
        let mut other = SeatSelection::interactive(&show, 1).unwrap();
        other.hold(&mut show, "A2").unwrap();

        let mut selection = SeatSelection::interactive(&show, 2).unwrap();
        selection.hold(&mut show, "A1").unwrap();
        let err = selection.hold(&mut show, "A2").unwrap_err();

        assert_eq!(err, EngineError::SeatUnavailable("A2".into()));
        assert_eq!(selection.positions(&show).unwrap(), ["A1"]);
        assert_eq!(show.seat_at("A2").unwrap().status(), SeatStatus::Held);
        assert!(matches!(
            selection.hold(&mut show, "Q7"),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn accept_requires_exact_count() {
        let mut show = show(5, 1);
        let mut selection = SeatSelection::interactive(&show, 2).unwrap();
        selection.hold(&mut show, "A1").unwrap();
        assert!(selection.accept().is_err());

        selection.hold(&mut show, "A2").unwrap();
        selection.accept().unwrap();
        assert!(selection.is_complete());

        // любое изменение снимает подтверждение
        selection.release(&mut show, "A1").unwrap();
        assert_eq!(selection.state(), SelectionState::Collecting);
        assert_eq!(show.seat_at("A1").unwrap().status(), SeatStatus::Empty);
    }

    #[test]
    fn release_only_own_seats() {
        let mut show = show(5, 1);
        let mut other = SeatSelection::interactive(&show, 1).unwrap();
        other.hold(&mut show, "A5").unwrap();

        let mut selection = SeatSelection::interactive(&show, 2).unwrap();
        selection.hold(&mut show, "A1").unwrap();
        assert!(matches!(
            selection.release(&mut show, "A5"),
            Err(EngineError::NotFound { .. })
        ));
        assert_eq!(show.seat_at("A5").unwrap().status(), SeatStatus::Held);
    }

    #[test]
    fn abandon_releases_held_seats() {
        let mut show = show(5, 1);
        let mut other = SeatSelection::interactive(&show, 1).unwrap();
        other.hold(&mut show, "A4").unwrap();

        let mut selection = SeatSelection::interactive(&show, 2).unwrap();
        selection.hold(&mut show, "A1").unwrap();
        selection.hold(&mut show, "A2").unwrap();

        let released = selection.abandon(&mut show).unwrap();
        assert_eq!(released, ["A1", "A2"]);
        assert_eq!(show.seat_at("A1").unwrap().status(), SeatStatus::Empty);
        assert_eq!(show.seat_at("A2").unwrap().status(), SeatStatus::Empty);
        assert_eq!(show.seat_at("A4").unwrap().status(), SeatStatus::Held);
    }

    #[test]
    fn selection_is_bound_to_its_show() {
        let mut first = show(3, 1);
        let mut selection = SeatSelection::interactive(&first, 1).unwrap();
        selection.hold(&mut first, "A1").unwrap();

        let at = first.scheduled_at();
        let mut second = Show::new(ShowId(1), "Other", at, 3, 1, &ShowDefaults::default());
        assert!(matches!(
            selection.hold(&mut second, "A2"),
            Err(EngineError::Validation(_))
        ));
    }
}
