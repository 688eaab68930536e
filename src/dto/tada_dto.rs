//! DTOs del workflow TADA

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Decision;
use crate::models::tada::{ClaimType, TadaRequest, TadaStatus};

/// Un reclamo individual dentro del lote
#[derive(Debug, Deserialize, Validate)]
pub struct ClaimItem {
    pub claim_type: ClaimType,

    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub amount: Decimal,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request para presentar un lote de reclamos contra un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTadaRequest {
    pub requester_id: Uuid,
    pub trip_id: Uuid,

    // el lote no puede ser vacío; lo valida el servicio
    #[validate]
    pub claims: Vec<ClaimItem>,
}

/// Request para resolver un reclamo pendiente
#[derive(Debug, Deserialize, Validate)]
pub struct DecideTadaRequest {
    pub decision: Decision,

    #[validate(length(max = 500))]
    pub rejection_reason: Option<String>,
}

/// Response de reclamo para la API
#[derive(Debug, Serialize)]
pub struct TadaResponse {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub requester_id: Uuid,
    pub claim_type: ClaimType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub status: TadaStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TadaRequest> for TadaResponse {
    fn from(request: TadaRequest) -> Self {
        Self {
            id: request.id,
            trip_id: request.trip_id,
            requester_id: request.requester_id,
            claim_type: request.claim_type,
            amount: request.amount,
            description: request.description,
            status: request.status,
            rejection_reason: request.rejection_reason,
            created_at: request.created_at,
        }
    }
}
