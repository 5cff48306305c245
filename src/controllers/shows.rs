use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Days, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::ids::{PromotionId, ShowId};
use crate::middleware::AuthUser;
use crate::models::{Seat, SeatCounts, Show};
use crate::AppState;

use super::{now, require_future, validated};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows", post(create_show))
        .route("/shows/{id}", get(get_show).delete(cancel_show))
        .route("/shows/{id}/seats", get(get_seats))
        .route("/shows/{id}/stats", get(get_stats))
        .route("/shows/{id}/schedule", patch(reschedule_show))
        .route("/shows/{id}/price", patch(set_price))
        .route(
            "/shows/{id}/promotion",
            patch(apply_promotion).delete(remove_promotion),
        )
}

#[derive(Debug, Serialize)]
pub struct ShowResponse {
    pub id: ShowId,
    pub name: String,
    pub scheduled_at: NaiveDateTime,
    pub min_age: u8,
    pub promotion: Option<PromotionId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl From<&Show> for ShowResponse {
    fn from(show: &Show) -> Self {
        let bounds = show.price_bounds();
        Self {
            id: show.id(),
            name: show.name().to_string(),
            scheduled_at: show.scheduled_at(),
            min_age: show.min_age(),
            promotion: show.promotion(),
            min_price: bounds.map(|(min, _)| min),
            max_price: bounds.map(|(_, max)| max),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShowDetailsResponse {
    #[serde(flatten)]
    pub show: ShowResponse,
    pub promotion_name: Option<String>,
    pub default_seat_price: Decimal,
    pub max_seats_per_user: u32,
    pub rows: u32,
    pub cols: u32,
}

/* ---------- BROWSING ---------- */

// GET /api/shows?from=...&to=...
#[derive(Debug, Deserialize)]
pub struct ShowsQuery {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

async fn list_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ShowsQuery>,
) -> Result<Json<Vec<ShowResponse>>, AppError> {
    let from = params.from.unwrap_or_else(now);
    let to = params
        .to
        .unwrap_or_else(|| from.checked_add_days(Days::new(365)).unwrap_or(NaiveDateTime::MAX));

    let office = state.lock()?;
    let shows = office
        .venue()
        .shows_between(from, to)
        .into_iter()
        .map(ShowResponse::from)
        .collect();
    Ok(Json(shows))
}

// GET /api/shows/{id}
async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShowId>,
) -> Result<Json<ShowDetailsResponse>, AppError> {
    let office = state.lock()?;
    let venue = office.venue();
    let show = venue.show(id)?;
    let promotion_name = show
        .promotion()
        .and_then(|p| venue.promotion(p).ok())
        .map(|p| p.name().to_string());

    Ok(Json(ShowDetailsResponse {
        show: ShowResponse::from(show),
        promotion_name,
        default_seat_price: show.default_seat_price(),
        max_seats_per_user: show.max_seats_per_user(),
        rows: show.rows(),
        cols: show.cols(),
    }))
}

// GET /api/shows/{id}/seats
#[derive(Debug, Serialize)]
struct SeatsResponse {
    seats: Vec<Seat>,
    grid: String,
}

async fn get_seats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShowId>,
) -> Result<Json<SeatsResponse>, AppError> {
    let office = state.lock()?;
    let show = office.venue().show(id)?;
    Ok(Json(SeatsResponse {
        seats: show.seats().to_vec(),
        grid: show.seat_map().to_string(),
    }))
}

// GET /api/shows/{id}/stats
#[derive(Debug, Serialize)]
struct StatsResponse {
    show_id: ShowId,
    #[serde(flatten)]
    counts: SeatCounts,
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<ShowId>,
) -> Result<Json<StatsResponse>, AppError> {
    let office = state.lock()?;
    office.require_staff(user.user_id)?;
    let counts = office.venue().show(id)?.seat_counts();
    Ok(Json(StatsResponse { show_id: id, counts }))
}

/* ---------- MANAGEMENT ---------- */

// POST /api/shows
#[derive(Debug, Deserialize, Validate)]
struct CreateShowRequest {
    #[validate(length(min = 1, max = 200, message = "Название шоу обязательно"))]
    name: String,
    scheduled_at: NaiveDateTime,
    min_age: Option<u8>,
    #[validate(custom(function = "non_negative"))]
    default_seat_price: Option<Decimal>,
    #[validate(range(min = 1, message = "Лимит мест должен быть > 0"))]
    max_seats_per_user: Option<u32>,
}

fn non_negative(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(validator::ValidationError::new("negative_price"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    id: ShowId,
}

async fn create_show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateShowRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = validated(req)?;
    require_future(req.scheduled_at)?;

    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;

    let venue = office.venue_mut();
    let id = venue.add_show(req.name, req.scheduled_at);
    if let Some(price) = req.default_seat_price {
        venue.set_default_seat_price(id, price)?;
    }
    if let Some(max) = req.max_seats_per_user {
        venue.set_max_seats_per_user(id, max)?;
    }
    if let Some(age) = req.min_age {
        venue.show_mut(id)?.set_min_age(age);
    }

    tracing::info!("Show {} created by {}", id, user.username);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

// DELETE /api/shows/{id}
async fn cancel_show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<ShowId>,
) -> Result<StatusCode, AppError> {
    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.cancel_show(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/shows/{id}/schedule
#[derive(Debug, Deserialize)]
struct RescheduleRequest {
    scheduled_at: NaiveDateTime,
}

async fn reschedule_show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<ShowId>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<ShowResponse>, AppError> {
    require_future(req.scheduled_at)?;

    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.venue_mut().reschedule_show(id, req.scheduled_at)?;
    Ok(Json(ShowResponse::from(office.venue().show(id)?)))
}

// PATCH /api/shows/{id}/price
#[derive(Debug, Deserialize)]
struct PriceRequest {
    default_seat_price: Decimal,
}

async fn set_price(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<ShowId>,
    Json(req): Json<PriceRequest>,
) -> Result<Json<ShowResponse>, AppError> {
    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.venue_mut().set_default_seat_price(id, req.default_seat_price)?;
    Ok(Json(ShowResponse::from(office.venue().show(id)?)))
}

// PATCH /api/shows/{id}/promotion
#[derive(Debug, Deserialize)]
struct ApplyPromotionRequest {
    promotion_id: PromotionId,
}

async fn apply_promotion(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<ShowId>,
    Json(req): Json<ApplyPromotionRequest>,
) -> Result<Json<ShowResponse>, AppError> {
    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.venue_mut().apply_promotion(id, req.promotion_id)?;
    Ok(Json(ShowResponse::from(office.venue().show(id)?)))
}

// DELETE /api/shows/{id}/promotion
async fn remove_promotion(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<ShowId>,
) -> Result<Json<ShowResponse>, AppError> {
    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.venue_mut().remove_show_promotion(id)?;
    Ok(Json(ShowResponse::from(office.venue().show(id)?)))
}
