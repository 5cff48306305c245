use serde::Serialize;

use crate::ids::{BookingId, ShowId};

/// Запись о покупке: шоу и метки купленных мест.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    id: BookingId,
    show_id: ShowId,
    seats: Vec<String>,
}

impl Booking {
    pub fn new(id: BookingId, show_id: ShowId, seats: Vec<String>) -> Self {
        Self { id, show_id, seats }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn show_id(&self) -> ShowId {
        self.show_id
    }

    pub fn seats(&self) -> &[String] {
        &self.seats
    }
}
