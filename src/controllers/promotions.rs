use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::ids::PromotionId;
use crate::middleware::AuthUser;
use crate::models::Promotion;
use crate::AppState;

use super::validated;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/promotions", get(list_promotions).post(create_promotion))
        .route(
            "/promotions/{id}",
            patch(rename_promotion).delete(remove_promotion),
        )
}

// GET /api/promotions
async fn list_promotions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Promotion>>, AppError> {
    let office = state.lock()?;
    office.require_staff(user.user_id)?;
    Ok(Json(office.venue().promotions().cloned().collect()))
}

// POST /api/promotions
// Диапазоны задаются парами номеров мест [low, high]; проверка пар - в движке
#[derive(Debug, Deserialize, Validate)]
struct CreatePromotionRequest {
    #[validate(length(min = 1, max = 200, message = "Название акции обязательно"))]
    name: String,
    #[validate(length(min = 1, message = "Нужен хотя бы один уровень"))]
    multipliers: Vec<Decimal>,
    ranges: Vec<Vec<u32>>,
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    id: PromotionId,
}

async fn create_promotion(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreatePromotionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = validated(req)?;

    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    let id = office
        .venue_mut()
        .create_promotion(&req.name, &req.multipliers, &req.ranges)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

// PATCH /api/promotions/{id}
#[derive(Debug, Deserialize, Validate)]
struct RenameRequest {
    #[validate(length(min = 1, max = 200, message = "Название акции обязательно"))]
    name: String,
}

async fn rename_promotion(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<PromotionId>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<Promotion>, AppError> {
    let req = validated(req)?;

    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.venue_mut().rename_promotion(id, &req.name)?;
    Ok(Json(office.venue().promotion(id)?.clone()))
}

// DELETE /api/promotions/{id}
async fn remove_promotion(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<PromotionId>,
) -> Result<StatusCode, AppError> {
    let mut office = state.lock()?;
    office.require_staff(user.user_id)?;
    office.venue_mut().remove_promotion(id)?;
    Ok(StatusCode::NO_CONTENT)
}
