//! Modelo de TadaRequest (reclamo de viáticos)
//!
//! Varias solicitudes TADA pueden existir por viaje; cada una avanza
//! de forma independiente por el workflow PENDING → APPROVED/REJECTED.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado del reclamo - mapea al ENUM tada_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "tada_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TadaStatus {
    Pending,
    Approved,
    Rejected,
}

impl TadaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TadaStatus::Pending => "PENDING",
            TadaStatus::Approved => "APPROVED",
            TadaStatus::Rejected => "REJECTED",
        }
    }
}

/// Tipo de gasto reclamado - mapea al ENUM claim_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "claim_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimType {
    Fuel,
    Lunch,
    Toll,
    Parking,
    Other,
}

/// TadaRequest - mapea exactamente a la tabla tada_requests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TadaRequest {
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
