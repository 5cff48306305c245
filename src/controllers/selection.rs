use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::box_office::BoxOffice;
use crate::error::{AppError, EngineError};
use crate::ids::{ShowId, UserId};
use crate::middleware::AuthUser;
use crate::services::{HoldOutcome, PriceRange, Quote, SelectionMode, SelectionState};
use crate::AppState;

use super::validated;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/selection",
            post(start_selection).get(get_selection).delete(abandon_selection),
        )
        .route("/selection/auto", post(auto_select))
        .route("/selection/hold", patch(hold_seat))
        .route("/selection/release", patch(release_seat))
        .route("/selection/accept", patch(accept_selection))
}

/* ---------- helpers ---------- */

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub show_id: ShowId,
    pub wanted: u32,
    pub mode: SelectionMode,
    pub state: SelectionState,
    pub seats: Vec<String>,
    pub quote: Quote,
}

fn selection_response(office: &BoxOffice, user_id: UserId) -> Result<SelectionResponse, EngineError> {
    let selection = office.selection(user_id)?;
    let show = office.venue().show(selection.show_id())?;
    Ok(SelectionResponse {
        show_id: selection.show_id(),
        wanted: selection.wanted(),
        mode: selection.mode(),
        state: selection.state(),
        seats: selection.positions(show)?,
        quote: office.quote(user_id)?,
    })
}

/* ---------- START ---------- */

// POST /api/selection
#[derive(Debug, Deserialize, Validate)]
struct StartRequest {
    show_id: ShowId,
    #[validate(range(min = 1, message = "Количество мест должно быть > 0"))]
    seats: u32,
}

async fn start_selection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<StartRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = validated(req)?;

    let mut office = state.lock()?;
    office.start_interactive(user.user_id, req.show_id, req.seats)?;
    Ok((StatusCode::CREATED, Json(selection_response(&office, user.user_id)?)))
}

// POST /api/selection/auto
#[derive(Debug, Deserialize, Validate)]
struct AutoRequest {
    show_id: ShowId,
    #[validate(range(min = 1, message = "Количество мест должно быть > 0"))]
    seats: u32,
    min_price: Decimal,
    max_price: Decimal,
}

async fn auto_select(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<AutoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = validated(req)?;
    if req.min_price > req.max_price {
        return Err(EngineError::validation("min_price must not exceed max_price").into());
    }

    let mut office = state.lock()?;
    let range = PriceRange::new(req.min_price, req.max_price);
    office.start_automatic(user.user_id, req.show_id, req.seats, range)?;
    Ok((StatusCode::CREATED, Json(selection_response(&office, user.user_id)?)))
}

/* ---------- WORKFLOW ---------- */

// GET /api/selection
async fn get_selection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<SelectionResponse>, AppError> {
    let office = state.lock()?;
    Ok(Json(selection_response(&office, user.user_id)?))
}

#[derive(Debug, Deserialize, Validate)]
struct SeatRequest {
    #[validate(length(min = 2, max = 8, message = "Метка места вида \"B3\""))]
    position: String,
}

#[derive(Debug, Serialize)]
struct HoldResponse {
    #[serde(flatten)]
    outcome: HoldOutcome,
    selection: SelectionResponse,
}

// PATCH /api/selection/hold
async fn hold_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SeatRequest>,
) -> Result<Json<HoldResponse>, AppError> {
    let req = validated(req)?;
    let position = req.position.trim().to_uppercase();

    let mut office = state.lock()?;
    let outcome = office.hold(user.user_id, &position)?;
    Ok(Json(HoldResponse {
        outcome,
        selection: selection_response(&office, user.user_id)?,
    }))
}

// PATCH /api/selection/release
async fn release_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SeatRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let req = validated(req)?;
    let position = req.position.trim().to_uppercase();

    let mut office = state.lock()?;
    office.release(user.user_id, &position)?;
    Ok(Json(selection_response(&office, user.user_id)?))
}

// PATCH /api/selection/accept
async fn accept_selection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<SelectionResponse>, AppError> {
    let mut office = state.lock()?;
    office.accept(user.user_id)?;
    Ok(Json(selection_response(&office, user.user_id)?))
}

// DELETE /api/selection
#[derive(Debug, Serialize)]
struct AbandonResponse {
    released: Vec<String>,
}

async fn abandon_selection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<AbandonResponse>, AppError> {
    let mut office = state.lock()?;
    let released = office.abandon(user.user_id)?;
    Ok(Json(AbandonResponse { released }))
}
