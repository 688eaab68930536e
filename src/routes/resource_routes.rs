//! Rutas de recursos (listas para la pantalla de asignación)

use axum::{extract::State, routing::get, Json, Router};

use crate::models::resource::{Driver, Vehicle};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_resource_router() -> Router<AppState> {
    Router::new()
        .route("/driver", get(list_drivers))
        .route("/vehicle", get(list_vehicles))
}

async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, AppError> {
    let drivers = state.trips.list_active_drivers().await?;
    Ok(Json(drivers))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, AppError> {
    let vehicles = state.trips.list_active_vehicles().await?;
    Ok(Json(vehicles))
}
