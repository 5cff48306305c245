//! seed.rs
//!
//! Демо-данные для запуска без внешнего хранилища: по одному пользователю
//! каждого типа, два шоу через месяц и акция «A1–A10 за полцены».

use chrono::{Days, NaiveDateTime, NaiveTime};
use rust_decimal_macros::dec;
use tracing::info;

use crate::box_office::BoxOffice;
use crate::error::Result;
use crate::models::{Account, Customer};

pub const DEMO_PROMOTION: &str = "Test Promotion (seats A1 to A10 half price)";

/// Заполняет справочник пользователей, афишу и каталог акций.
/// `now` задаёт точку отсчёта для дат шоу.
pub fn seed_demo_data(office: &mut BoxOffice, now: NaiveDateTime) -> Result<()> {
    let users = office.users_mut();
    users.add("wef", "wef", "wef@wef.com", "wefwef", Account::Customer(Customer::default()))?;
    users.add("Steve Venue", "venue_steve", "vsteve@bcpa.com", "VenueSteve25%", Account::VenueManager)?;
    users.add("Michael Agent", "agent_michael", "agent@external.com", "AgentMichael25%", Account::Agent)?;
    users.add("Xavier Admin", "admin_xavier", "admin@bcpa.com", "AdminXavier25%", Account::Admin)?;

    let day = (now + Days::new(30)).date();
    let matinee = day.and_time(NaiveTime::from_hms_opt(16, 40, 0).unwrap_or_default());
    let evening = day.and_time(NaiveTime::from_hms_opt(19, 40, 0).unwrap_or_default());

    let venue = office.venue_mut();
    venue.add_show("Test Show", matinee);
    venue.add_show("Test Show 2", evening);
    venue.create_promotion(DEMO_PROMOTION, &[dec!(0.5)], &[vec![0, 9]])?;

    info!(
        "Demo data seeded: {} users, {} shows, {} promotions",
        office.users().len(),
        office.venue().shows().count(),
        office.venue().promotions().count()
    );
    Ok(())
}
