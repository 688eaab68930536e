//! DTOs del workflow de mantenimiento

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Decision;
use crate::models::maintenance::{MaintenanceRequest, MaintenanceStatus};
use crate::models::user::UserRole;

/// Request de mantenimiento sobre un vehículo entitled del empleado
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub requester_id: Uuid,
    pub entitled_vehicle_id: Uuid,

    #[validate(length(min = 5, max = 1000))]
    pub description: String,
}

/// Request de mantenimiento sobre un vehículo de flota
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFleetMaintenanceRequest {
    pub requester_id: Uuid,
    pub vehicle_id: Uuid,

    #[validate(length(min = 5, max = 1000))]
    pub description: String,
}

/// Request para resolver una solicitud REQUESTED
#[derive(Debug, Deserialize, Validate)]
pub struct DecideMaintenanceRequest {
    pub decision: Decision,

    #[validate(length(max = 500))]
    pub rejection_reason: Option<String>,
}

/// Request para iniciar el trabajo aprobado
#[derive(Debug, Deserialize)]
pub struct StartMaintenanceRequest {
    pub caller_id: Uuid,
    pub caller_role: UserRole,
}

/// Request para completar el trabajo en curso
#[derive(Debug, Deserialize)]
pub struct CompleteMaintenanceRequest {
    pub caller_id: Uuid,
    pub caller_role: UserRole,
    pub cost: Option<Decimal>,
}

/// Request para reportar un problema tras la finalización
#[derive(Debug, Deserialize, Validate)]
pub struct ReportIssueRequest {
    pub requester_id: Uuid,

    #[validate(length(min = 5, max = 1000))]
    pub issue_description: String,
}

/// Response de solicitud de mantenimiento para la API
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
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

impl From<MaintenanceRequest> for MaintenanceResponse {
    fn from(request: MaintenanceRequest) -> Self {
        Self {
            id: request.id,
            requester_id: request.requester_id,
            entitled_vehicle_id: request.entitled_vehicle_id,
            vehicle_id: request.vehicle_id,
            description: request.description,
            status: request.status,
            cost: request.cost,
            rejection_reason: request.rejection_reason,
            issue_reported: request.issue_reported,
            issue_description: request.issue_description,
            issue_reported_at: request.issue_reported_at,
            issue_resolved: request.issue_resolved,
            completed_at: request.completed_at,
            created_at: request.created_at,
        }
    }
}
