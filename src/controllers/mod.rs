pub mod bookings;
pub mod promotions;
pub mod selection;
pub mod shows;

use axum::Router;
use chrono::NaiveDateTime;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, EngineError};

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(shows::routes())
        .merge(promotions::routes())
        .merge(selection::routes())
        .merge(bookings::routes())
}

/* ---------- helpers ---------- */

// Ошибки validator превращаются в 400 с перечнем полей
fn validated<T: Validate>(req: T) -> Result<T, AppError> {
    req.validate()
        .map_err(|e| EngineError::validation(e.to_string()))?;
    Ok(req)
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// Шоу можно назначить только на будущее время
fn require_future(at: NaiveDateTime) -> Result<(), AppError> {
    if at <= now() {
        return Err(EngineError::validation(format!("{} is not in the future", at)).into());
    }
    Ok(())
}
