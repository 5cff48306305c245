pub mod booking;
pub mod promotion;
pub mod seat;
pub mod show;
pub mod user;

pub use booking::Booking;
pub use promotion::{Promotion, Tier};
pub use seat::{Seat, SeatStatus};
pub use show::{Show, ShowDefaults, SeatCounts, SeatMap};
pub use user::{Account, AccountType, Customer, User, UserDirectory};
