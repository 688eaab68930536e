//! Modelo de Trip
//!
//! Este módulo contiene el struct Trip y sus enums asociados.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.
//! Un viaje nunca se borra físicamente: la cancelación es un estado
//! terminal, no un DELETE.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Requested,
    ManagerApproved,
    ManagerRejected,
    TransportAssigned,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Requested => "requested",
            TripStatus::ManagerApproved => "manager_approved",
            TripStatus::ManagerRejected => "manager_rejected",
            TripStatus::TransportAssigned => "transport_assigned",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

/// Categoría del vehículo solicitado - mapea al ENUM vehicle_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleCategory {
    /// Vehículo del pool de la organización, lo asigna transporte
    Fleet,
    /// Vehículo personal del empleado
    Personal,
    /// Vehículo asignado oficialmente al empleado
    Entitled,
}

impl VehicleCategory {
    /// Un viaje "autogestionado" aporta su propio vehículo y no pasa
    /// por la asignación del departamento de transporte.
    pub fn is_self_managed(&self) -> bool {
        matches!(self, VehicleCategory::Personal | VehicleCategory::Entitled)
    }
}

/// Empresa solicitante - enumeración fija, mapea al ENUM company
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "company", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Company {
    HeadOffice,
    Factory,
    RegionalOffice,
    Subsidiary,
}

/// Trip principal - mapea exactamente a la tabla trips
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub purpose: String,
    pub from_location: String,
    pub to_location: String,
    pub stops: Vec<String>,
    pub passenger_names: Vec<String>,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub company: Company,
    pub department: String,
    pub vehicle_category: VehicleCategory,
    pub personal_vehicle_details: Option<String>,
    pub entitled_vehicle_id: Option<Uuid>,
    pub status: TripStatus,
    pub approver_id: Option<Uuid>,
    pub assigner_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    // Snapshots desnormalizados al momento de la asignación; no se
    // recalculan aunque el conductor o el vehículo se editen después.
    pub driver_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub start_mileage: Option<Decimal>,
    pub end_mileage: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compromiso activo de un recurso: ventana semiabierta `[from_time, to_time)`
/// de un viaje en estado `TransportAssigned` o `InProgress`.
#[derive(Debug, Clone, FromRow)]
pub struct Commitment {
    pub trip_id: Uuid,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
}
