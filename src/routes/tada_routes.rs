//! Rutas del workflow TADA

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::tada_dto::{CreateTadaRequest, DecideTadaRequest, TadaResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_tada_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tada_batch))
        .route("/pending", get(list_pending))
        .route("/:id", get(get_tada))
        .route("/:id/decide", post(decide_tada))
        .route("/trip/:trip_id", get(list_by_trip))
}

async fn create_tada_batch(
    State(state): State<AppState>,
    Json(request): Json<CreateTadaRequest>,
) -> Result<Json<ApiResponse<Vec<TadaResponse>>>, AppError> {
    let created = state.tada.create(request).await?;
    let count = created.len();
    Ok(Json(ApiResponse::success_with_message(
        created.into_iter().map(TadaResponse::from).collect(),
        format!("{} reclamos presentados exitosamente", count),
    )))
}

async fn get_tada(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TadaResponse>, AppError> {
    let request = state.tada.get_by_id(id).await?;
    Ok(Json(request.into()))
}

async fn decide_tada(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideTadaRequest>,
) -> Result<Json<ApiResponse<TadaResponse>>, AppError> {
    request.validate()?;
    let updated = state
        .tada
        .decide(id, request.decision, request.rejection_reason)
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

async fn list_by_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<TadaResponse>>, AppError> {
    let requests = state.tada.list_by_trip(trip_id).await?;
    Ok(Json(requests.into_iter().map(TadaResponse::from).collect()))
}

async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<TadaResponse>>, AppError> {
    let requests = state.tada.list_pending().await?;
    Ok(Json(requests.into_iter().map(TadaResponse::from).collect()))
}
