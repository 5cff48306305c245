use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Номер места внутри шоу (0..rows*cols).
    SeatId
);
id_type!(ShowId);
id_type!(PromotionId);
id_type!(BookingId);
id_type!(UserId);

/// Монотонные счётчики идентификаторов.
///
/// Принадлежит площадке (`Venue`), а не глобальному состоянию: у каждого
/// экземпляра движка своя последовательность, тесты не влияют друг на друга.
#[derive(Debug, Default)]
pub struct IdAllocator {
    shows: u32,
    promotions: u32,
    bookings: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_show(&mut self) -> ShowId {
        ShowId(bump(&mut self.shows))
    }

    pub fn next_promotion(&mut self) -> PromotionId {
        PromotionId(bump(&mut self.promotions))
    }

    pub fn next_booking(&mut self) -> BookingId {
        BookingId(bump(&mut self.bookings))
    }
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}
