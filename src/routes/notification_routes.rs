//! Rutas de notificaciones (modelo de lectura)

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::dto::notification_dto::NotificationResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/user/:user_id", get(list_for_user))
        .route("/user/:user_id/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
}

async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = state.notifications.list_for_user(user_id).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, AppError> {
    let notification = state.notifications.mark_read(id).await?;
    Ok(Json(notification.into()))
}

async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = state.notifications.mark_all_read(user_id).await?;
    Ok(Json(json!({
        "success": true,
        "updated": updated
    })))
}
