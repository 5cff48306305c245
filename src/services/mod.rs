pub mod payment;
pub mod selection;

pub use payment::{CardDetails, Quote, QuoteLine, Receipt, VolumeDiscount};
pub use selection::{HoldOutcome, PriceRange, SeatSelection, SelectionMode, SelectionState};
