//! Rutas del workflow de viajes

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::trip_dto::{
    AssignTripRequest, CancelTripRequest, CompleteTripRequest, CreateTripRequest,
    DecideTripRequest, StartTripRequest, TripFilters, TripResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip))
        .route("/", get(list_trips))
        .route("/:id", get(get_trip))
        .route("/:id/decide", post(decide_trip))
        .route("/:id/assign", post(assign_trip))
        .route("/:id/cancel", post(cancel_trip))
        .route("/:id/start", post(start_trip))
        .route("/:id/complete", post(complete_trip))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let trip = state.trips.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        trip.into(),
        "Solicitud de viaje creada exitosamente".to_string(),
    )))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.trips.get_by_id(id).await?;
    Ok(Json(trip.into()))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(filters): Query<TripFilters>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = state
        .trips
        .list(filters.requester_id, filters.status)
        .await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

async fn decide_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    request.validate()?;
    let trip = state
        .trips
        .decide(id, request.approver_id, request.decision, request.rejection_reason)
        .await?;
    Ok(Json(ApiResponse::success(trip.into())))
}

async fn assign_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    request.validate()?;
    let trip = state
        .trips
        .assign(
            id,
            request.assigner_id,
            request.driver_id,
            request.vehicle_id,
            request.start_mileage,
        )
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        trip.into(),
        "Transporte asignado exitosamente".to_string(),
    )))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let trip = state
        .trips
        .cancel(id, request.caller_id, request.caller_role)
        .await?;
    Ok(Json(ApiResponse::success(trip.into())))
}

async fn start_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StartTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let trip = state
        .trips
        .start(id, request.caller_id, request.caller_role)
        .await?;
    Ok(Json(ApiResponse::success(trip.into())))
}

async fn complete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    request.validate()?;
    let trip = state
        .trips
        .complete(id, request.caller_id, request.caller_role, request.end_mileage)
        .await?;
    Ok(Json(ApiResponse::success(trip.into())))
}
