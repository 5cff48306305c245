use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::error::{EngineError, Result};
use crate::ids::SeatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatStatus {
    Empty,
    Held,
    Booked,
}

impl SeatStatus {
    /// Буква для схемы зала: E / H / B.
    pub fn marker(self) -> char {
        match self {
            SeatStatus::Empty => 'E',
            SeatStatus::Held => 'H',
            SeatStatus::Booked => 'B',
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeatStatus::Empty => "EMPTY",
            SeatStatus::Held => "HELD",
            SeatStatus::Booked => "BOOKED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Seat {
    id: SeatId,
    position: String,
    price: Decimal,
    status: SeatStatus,
}

impl Seat {
    pub fn new(id: SeatId, position: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            position: position.into(),
            price,
            status: SeatStatus::Empty,
        }
    }

    pub fn id(&self) -> SeatId {
        self.id
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn status(&self) -> SeatStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.status == SeatStatus::Empty
    }

    pub(crate) fn set_price(&mut self, price: Decimal) {
        self.price = price;
    }

    // EMPTY -> HELD
    pub(crate) fn hold(&mut self) -> Result<()> {
        if self.status != SeatStatus::Empty {
            return Err(EngineError::SeatUnavailable(self.position.clone()));
        }
        self.status = SeatStatus::Held;
        Ok(())
    }

    // HELD -> EMPTY; false если место не было удержано
    pub(crate) fn release(&mut self) -> bool {
        if self.status == SeatStatus::Held {
            self.status = SeatStatus::Empty;
            true
        } else {
            false
        }
    }

    // HELD -> BOOKED
    pub(crate) fn book(&mut self) -> Result<()> {
        if self.status != SeatStatus::Held {
            return Err(EngineError::SeatUnavailable(self.position.clone()));
        }
        self.status = SeatStatus::Booked;
        Ok(())
    }
}
