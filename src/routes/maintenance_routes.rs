//! Rutas del workflow de mantenimiento

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::maintenance_dto::{
    CompleteMaintenanceRequest, CreateFleetMaintenanceRequest, CreateMaintenanceRequest,
    DecideMaintenanceRequest, MaintenanceResponse, ReportIssueRequest, StartMaintenanceRequest,
};
use crate::models::maintenance::MaintenanceStatus;
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_maintenance))
        .route("/", get(list_maintenance))
        .route("/fleet", post(create_fleet_maintenance))
        .route("/:id", get(get_maintenance))
        .route("/:id/decide", post(decide_maintenance))
        .route("/:id/start", post(start_maintenance))
        .route("/:id/complete", post(complete_maintenance))
        .route("/:id/report-issue", post(report_issue))
        .route("/:id/resolve-issue", post(resolve_issue))
}

#[derive(Debug, Deserialize)]
struct MaintenanceFilters {
    requester_id: Option<Uuid>,
    status: Option<MaintenanceStatus>,
}

#[derive(Debug, Deserialize)]
struct ResolveIssueRequest {
    caller_role: UserRole,
}

async fn create_maintenance(
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    request.validate()?;
    let created = state
        .maintenance
        .create(request.requester_id, request.entitled_vehicle_id, request.description)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        created.into(),
        "Solicitud de mantenimiento creada exitosamente".to_string(),
    )))
}

async fn create_fleet_maintenance(
    State(state): State<AppState>,
    Json(request): Json<CreateFleetMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    request.validate()?;
    let created = state
        .maintenance
        .create_fleet(request.requester_id, request.vehicle_id, request.description)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        created.into(),
        "Solicitud de mantenimiento de flota creada exitosamente".to_string(),
    )))
}

async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let request = state.maintenance.get_by_id(id).await?;
    Ok(Json(request.into()))
}

async fn list_maintenance(
    State(state): State<AppState>,
    Query(filters): Query<MaintenanceFilters>,
) -> Result<Json<Vec<MaintenanceResponse>>, AppError> {
    let requests = match (filters.requester_id, filters.status) {
        (Some(requester_id), _) => state.maintenance.list_for_requester(requester_id).await?,
        (None, Some(status)) => state.maintenance.list_by_status(status).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Provide requester_id or status to list maintenance requests".to_string(),
            ))
        }
    };
    Ok(Json(
        requests.into_iter().map(MaintenanceResponse::from).collect(),
    ))
}

async fn decide_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    request.validate()?;
    let updated = state
        .maintenance
        .decide(id, request.decision, request.rejection_reason)
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

async fn start_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StartMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    let updated = state.maintenance.start(id, request.caller_role).await?;
    tracing::debug!("Mantenimiento {} iniciado por {}", id, request.caller_id);
    Ok(Json(ApiResponse::success(updated.into())))
}

async fn complete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    let updated = state
        .maintenance
        .complete(id, request.caller_role, request.cost)
        .await?;
    tracing::debug!("Mantenimiento {} completado por {}", id, request.caller_id);
    Ok(Json(ApiResponse::success(updated.into())))
}

async fn report_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReportIssueRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    request.validate()?;
    let updated = state
        .maintenance
        .report_issue(id, request.requester_id, request.issue_description)
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

async fn resolve_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveIssueRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    let updated = state.maintenance.resolve_issue(id, request.caller_role).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}
