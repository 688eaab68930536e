//! Modelo de MaintenanceRequest
//!
//! Una solicitud referencia o bien un vehículo entitled del empleado o
//! bien un vehículo de flota (mutuamente excluyentes). El reporte de
//! problemas posterior al COMPLETED es un atributo lateral, no un estado.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado de la solicitud - mapea al ENUM maintenance_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "maintenance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Requested,
    Approved,
    Rejected,
    InProgress,
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Requested => "REQUESTED",
            MaintenanceStatus::Approved => "APPROVED",
            MaintenanceStatus::Rejected => "REJECTED",
            MaintenanceStatus::InProgress => "IN_PROGRESS",
            MaintenanceStatus::Completed => "COMPLETED",
        }
    }
}

/// MaintenanceRequest - mapea exactamente a la tabla maintenance_requests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub entitled_vehicle_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub description: String,
    pub status: MaintenanceStatus,
    pub cost: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub issue_reported: bool,
    pub issue_description: Option<String>,
    pub issue_reported_at: Option<DateTime<Utc>>,
    pub issue_resolved: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    /// Una solicitud de flota la origina el propio transporte sobre un
    /// vehículo del pool; las entitled vienen de un empleado.
    pub fn is_fleet(&self) -> bool {
        self.vehicle_id.is_some()
    }
}
