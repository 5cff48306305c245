//! box_office.rs
//!
//! Корневой контекст движка: площадка, справочник пользователей и текущие
//! выборы мест (не больше одного на пользователя).
//!
//! HTTP-обработчики меняют состояние только через `BoxOffice`; вся структура
//! лежит под одним мьютексом в `AppState`, поэтому каждая операция атомарна.

use std::collections::HashMap;
use tracing::info;

use crate::error::{EngineError, Result};
use crate::ids::{BookingId, ShowId, UserId};
use crate::models::{Booking, Show, User, UserDirectory};
use crate::services::payment::{self, CardDetails, Quote, Receipt, VolumeDiscount};
use crate::services::selection::{HoldOutcome, PriceRange, SeatSelection};
use crate::venue::Venue;

#[derive(Debug)]
pub struct BoxOffice {
    venue: Venue,
    users: UserDirectory,
    selections: HashMap<UserId, SeatSelection>,
    discount: VolumeDiscount,
}

impl BoxOffice {
    pub fn new(venue: Venue, users: UserDirectory, discount: VolumeDiscount) -> Self {
        Self {
            venue,
            users,
            selections: HashMap::new(),
            discount,
        }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn venue_mut(&mut self) -> &mut Venue {
        &mut self.venue
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut UserDirectory {
        &mut self.users
    }

    pub fn discount(&self) -> &VolumeDiscount {
        &self.discount
    }

    /// Управлять шоу и акциями могут только менеджер площадки и администратор.
    pub fn require_staff(&self, user_id: UserId) -> Result<&User> {
        let user = self.users.get(user_id)?;
        if !user.account_type().is_staff() {
            return Err(EngineError::permission(format!(
                "{} cannot manage the venue",
                user.username
            )));
        }
        Ok(user)
    }

    fn require_customer(&self, user_id: UserId) -> Result<()> {
        self.users.get(user_id)?.as_customer().map(|_| ())
    }

    /// Снимает шоу с продажи вместе со всеми выборами на него.
    pub fn cancel_show(&mut self, show_id: ShowId) -> Result<Show> {
        let show = self.venue.cancel_show(show_id)?;
        let before = self.selections.len();
        self.selections.retain(|_, s| s.show_id() != show_id);
        let dropped = before - self.selections.len();
        if dropped > 0 {
            info!("Dropped {} selections for cancelled show {}", dropped, show_id);
        }
        Ok(show)
    }

    // === Выбор мест ===

    /// Прежний выбор пользователя, если он есть, отменяется до начала нового.
    /// Если подбор не удался, прежний выбор остаётся в силе.
    pub fn start_automatic(
        &mut self,
        user_id: UserId,
        show_id: ShowId,
        wanted: u32,
        range: PriceRange,
    ) -> Result<&SeatSelection> {
        self.require_customer(user_id)?;
        self.venue.show(show_id)?;

        // Места прежнего выбора участвуют в подборе; при неудаче они возвращаются
        let previous = self.selections.remove(&user_id);
        if let Some(previous) = &previous {
            previous
                .clone()
                .abandon(self.venue.show_mut(previous.show_id())?)?;
        }

        let show = self.venue.show_mut(show_id)?;
        match SeatSelection::automatic(show, wanted, range) {
            Ok(selection) => Ok(self.selections.entry(user_id).or_insert(selection)),
            Err(err) => {
                if let Some(previous) = previous {
                    previous.reclaim(self.venue.show_mut(previous.show_id())?)?;
                    self.selections.insert(user_id, previous);
                }
                Err(err)
            }
        }
    }

    pub fn start_interactive(
        &mut self,
        user_id: UserId,
        show_id: ShowId,
        wanted: u32,
    ) -> Result<&SeatSelection> {
        self.require_customer(user_id)?;
        let selection = SeatSelection::interactive(self.venue.show(show_id)?, wanted)?;
        self.abandon_existing(user_id)?;

        info!("User {} started selecting {} seats for show {}", user_id, wanted, show_id);
        Ok(self.selections.entry(user_id).or_insert(selection))
    }

    fn abandon_existing(&mut self, user_id: UserId) -> Result<()> {
        if let Some(previous) = self.selections.remove(&user_id) {
            let show = self.venue.show_mut(previous.show_id())?;
            previous.abandon(show)?;
        }
        Ok(())
    }

    pub fn selection(&self, user_id: UserId) -> Result<&SeatSelection> {
        self.selections
            .get(&user_id)
            .ok_or_else(|| EngineError::not_found("selection for user", user_id))
    }

    fn selection_and_show(&mut self, user_id: UserId) -> Result<(&mut SeatSelection, &mut Show)> {
        let selection = self
            .selections
            .get_mut(&user_id)
            .ok_or_else(|| EngineError::not_found("selection for user", user_id))?;
        let show = self.venue.show_mut(selection.show_id())?;
        Ok((selection, show))
    }

    pub fn hold(&mut self, user_id: UserId, position: &str) -> Result<HoldOutcome> {
        let (selection, show) = self.selection_and_show(user_id)?;
        selection.hold(show, position)
    }

    pub fn release(&mut self, user_id: UserId, position: &str) -> Result<()> {
        let (selection, show) = self.selection_and_show(user_id)?;
        selection.release(show, position)
    }

    pub fn accept(&mut self, user_id: UserId) -> Result<&SeatSelection> {
        let (selection, _) = self.selection_and_show(user_id)?;
        selection.accept()?;
        Ok(selection)
    }

    /// Отказ от выбора; возвращает освобождённые места.
    pub fn abandon(&mut self, user_id: UserId) -> Result<Vec<String>> {
        let selection = self
            .selections
            .remove(&user_id)
            .ok_or_else(|| EngineError::not_found("selection for user", user_id))?;
        let show = self.venue.show_mut(selection.show_id())?;
        selection.abandon(show)
    }

    pub fn quote(&self, user_id: UserId) -> Result<Quote> {
        let selection = self.selection(user_id)?;
        let show = self.venue.show(selection.show_id())?;
        payment::quote(show, selection, &self.discount)
    }

    /// Оплата текущего выбора. После успешной оплаты выбор закрывается.
    pub fn checkout(&mut self, user_id: UserId, card: &CardDetails) -> Result<Receipt> {
        let selection = self
            .selections
            .get(&user_id)
            .ok_or_else(|| EngineError::not_found("selection for user", user_id))?;
        let user = self.users.get_mut(user_id)?;
        let receipt = payment::checkout(&mut self.venue, selection, user, card, &self.discount)?;
        self.selections.remove(&user_id);
        Ok(receipt)
    }

    // === Бронирования ===

    pub fn bookings(&self, user_id: UserId) -> Result<&[Booking]> {
        Ok(self.users.get(user_id)?.as_customer()?.bookings())
    }

    pub fn cancel_booking(&mut self, user_id: UserId, booking_id: BookingId) -> Result<Booking> {
        payment::cancel_booking(self.users.get_mut(user_id)?, booking_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Customer, SeatStatus, ShowDefaults};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const ANN: UserId = UserId(0);
    const BOB: UserId = UserId(1);
    const STEVE: UserId = UserId(2);

    fn office() -> (BoxOffice, ShowId) {
        let mut venue = Venue::new("Hall", 5, 2, ShowDefaults::default());
        let at = NaiveDate::from_ymd_opt(2030, 5, 1)
            .and_then(|d| d.and_hms_opt(16, 40, 0))
            .unwrap();
        let show = venue.add_show("Test Show", at);

        let mut users = UserDirectory::new();
        users
            .add("Ann", "ann", "ann@example.com", "pw", Account::Customer(Customer::default()))
            .unwrap();
        users
            .add("Bob", "bob", "bob@example.com", "pw", Account::Customer(Customer::default()))
            .unwrap();
        users
            .add("Steve", "venue_steve", "steve@example.com", "pw", Account::VenueManager)
            .unwrap();

        (BoxOffice::new(venue, users, VolumeDiscount::default()), show)
    }

    fn card() -> CardDetails {
        CardDetails {
            holder: "Ann".into(),
            number: "1111-2222-3333-4444".into(),
            security_code: "999".into(),
        }
    }

    fn status(office: &BoxOffice, show: ShowId, position: &str) -> SeatStatus {
        office.venue().show(show).unwrap().seat_at(position).unwrap().status()
    }

    #[test]
    fn full_interactive_purchase() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 2).unwrap();
        office.hold(ANN, "A1").unwrap();
        office.hold(ANN, "B1").unwrap();
        office.accept(ANN).unwrap();

        let receipt = office.checkout(ANN, &card()).unwrap();
        assert_eq!(receipt.quote.total, dec!(20.00));
        assert_eq!(status(&office, show, "A1"), SeatStatus::Booked);
        assert_eq!(status(&office, show, "B1"), SeatStatus::Booked);
        assert!(office.selection(ANN).is_err());
        assert_eq!(office.bookings(ANN).unwrap().len(), 1);
    }

    #[test]
    fn new_selection_replaces_old_one() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 2).unwrap();
        office.hold(ANN, "A1").unwrap();

        office
            .start_automatic(ANN, show, 1, PriceRange::new(dec!(0), dec!(50)))
            .unwrap();
        // A1 освобождено старым выбором и тут же взято новым
        assert_eq!(office.selection(ANN).unwrap().positions(office.venue().show(show).unwrap()).unwrap(), ["A1"]);
        assert_eq!(office.venue().show(show).unwrap().seat_counts().held, 1);
    }

    #[test]
    fn failed_automatic_pick_keeps_previous_selection() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 2).unwrap();
        office.hold(ANN, "A1").unwrap();
        office.hold(ANN, "A2").unwrap();
        office.accept(ANN).unwrap();

        let err = office
            .start_automatic(ANN, show, 3, PriceRange::new(dec!(50), dec!(60)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientSeats { requested: 3, .. }));
        assert!(matches!(
            office.start_automatic(ANN, show, 51, PriceRange::new(dec!(0), dec!(60))),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            office.start_automatic(ANN, ShowId(7), 1, PriceRange::new(dec!(0), dec!(60))),
            Err(EngineError::NotFound { .. })
        ));

        let selection = office.selection(ANN).unwrap();
        assert!(selection.is_complete());
        assert_eq!(
            selection.positions(office.venue().show(show).unwrap()).unwrap(),
            ["A1", "A2"]
        );
        assert_eq!(status(&office, show, "A1"), SeatStatus::Held);
        assert_eq!(status(&office, show, "A2"), SeatStatus::Held);
        assert_eq!(office.venue().show(show).unwrap().seat_counts().held, 2);
    }

    #[test]
    fn staff_cannot_select_or_pay() {
        let (mut office, show) = office();
        assert!(matches!(
            office.start_interactive(STEVE, show, 1),
            Err(EngineError::Permission(_))
        ));
        assert!(office.require_staff(STEVE).is_ok());
        assert!(matches!(office.require_staff(ANN), Err(EngineError::Permission(_))));
    }

    #[test]
    fn users_do_not_see_each_others_holds() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 1).unwrap();
        office.start_interactive(BOB, show, 1).unwrap();
        office.hold(ANN, "A3").unwrap();

        assert_eq!(
            office.hold(BOB, "A3").unwrap_err(),
            EngineError::SeatUnavailable("A3".into())
        );
        assert!(matches!(office.release(BOB, "A3"), Err(EngineError::NotFound { .. })));

        office.abandon(BOB).unwrap();
        assert_eq!(status(&office, show, "A3"), SeatStatus::Held);
    }

    #[test]
    fn abandon_frees_seats() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 2).unwrap();
        office.hold(ANN, "A1").unwrap();
        office.hold(ANN, "A2").unwrap();

        let released = office.abandon(ANN).unwrap();
        assert_eq!(released, ["A1", "A2"]);
        assert_eq!(office.venue().show(show).unwrap().seat_counts().held, 0);
        assert!(office.abandon(ANN).is_err());
    }

    #[test]
    fn failed_checkout_keeps_selection() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 1).unwrap();
        office.hold(ANN, "A1").unwrap();

        assert!(office.checkout(ANN, &card()).is_err());
        assert!(office.selection(ANN).is_ok());
        assert_eq!(status(&office, show, "A1"), SeatStatus::Held);
    }

    #[test]
    fn cancelling_show_drops_its_selections() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 1).unwrap();
        office.cancel_show(show).unwrap();
        assert!(office.selection(ANN).is_err());
    }

    #[test]
    fn quote_follows_price_changes() {
        let (mut office, show) = office();
        office.start_interactive(ANN, show, 1).unwrap();
        office.hold(ANN, "A1").unwrap();
        office.venue_mut().set_default_seat_price(show, dec!(12.50)).unwrap();
        assert_eq!(office.quote(ANN).unwrap().total, dec!(12.50));
    }
}
