use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::ids::BookingId;
use crate::middleware::AuthUser;
use crate::models::Booking;
use crate::services::{CardDetails, Receipt};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(get_user_bookings))
        .route("/bookings/pay", post(pay))
        .route("/bookings/cancel", patch(cancel_booking))
}

/* ---------- BOOKINGS ---------- */

// POST /api/bookings/pay
// Оплата подтверждённого выбора текущего пользователя; карта проверяется в движке
async fn pay(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(card): Json<CardDetails>,
) -> Result<Json<Receipt>, AppError> {
    let mut office = state.lock()?;
    let receipt = office.checkout(user.user_id, &card)?;
    Ok(Json(receipt))
}

// GET /api/bookings
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let office = state.lock()?;
    Ok(Json(office.bookings(user.user_id)?.to_vec()))
}

// PATCH /api/bookings/cancel
#[derive(Debug, Deserialize)]
struct CancelBookingRequest {
    booking_id: BookingId,
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CancelBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let mut office = state.lock()?;
    let booking = office.cancel_booking(user.user_id, req.booking_id)?;
    Ok(Json(booking))
}
