//! DTOs del workflow de viajes

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Decision;
use crate::models::trip::{Company, Trip, TripStatus, VehicleCategory};
use crate::models::user::UserRole;

/// Request para crear una solicitud de viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub requester_id: Uuid,

    #[validate(length(min = 3, max = 500))]
    pub purpose: String,

    #[validate(length(min = 2, max = 200))]
    pub from_location: String,

    #[validate(length(min = 2, max = 200))]
    pub to_location: String,

    #[serde(default)]
    pub stops: Vec<String>,

    #[serde(default)]
    pub passenger_names: Vec<String>,

    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,

    pub company: Company,

    /// Si se omite, se toma el departamento del perfil del solicitante
    #[validate(length(min = 2, max = 100))]
    pub department: Option<String>,

    pub vehicle_category: VehicleCategory,

    #[validate(length(max = 200))]
    pub personal_vehicle_details: Option<String>,

    pub entitled_vehicle_id: Option<Uuid>,
}

/// Request para la decisión del manager
#[derive(Debug, Deserialize, Validate)]
pub struct DecideTripRequest {
    pub approver_id: Uuid,
    pub decision: Decision,

    #[validate(length(max = 500))]
    pub rejection_reason: Option<String>,
}

/// Request para asignar conductor y vehículo de flota
#[derive(Debug, Deserialize, Validate)]
pub struct AssignTripRequest {
    pub assigner_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,

    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub start_mileage: Decimal,
}

/// Request para cancelar un viaje
#[derive(Debug, Deserialize)]
pub struct CancelTripRequest {
    pub caller_id: Uuid,
    pub caller_role: UserRole,
}

/// Request para iniciar un viaje asignado
#[derive(Debug, Deserialize)]
pub struct StartTripRequest {
    pub caller_id: Uuid,
    pub caller_role: UserRole,
}

/// Request para completar un viaje en curso
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteTripRequest {
    pub caller_id: Uuid,
    pub caller_role: UserRole,

    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub end_mileage: Option<Decimal>,
}

/// Filtros del listado de viajes
#[derive(Debug, Deserialize)]
pub struct TripFilters {
    pub requester_id: Option<Uuid>,
    pub status: Option<TripStatus>,
}

/// Response de viaje para la API
#[derive(Debug, Serialize)]
pub struct TripResponse {
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
    pub driver_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub start_mileage: Option<Decimal>,
    pub end_mileage: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            requester_id: trip.requester_id,
            purpose: trip.purpose,
            from_location: trip.from_location,
            to_location: trip.to_location,
            stops: trip.stops,
            passenger_names: trip.passenger_names,
            from_time: trip.from_time,
            to_time: trip.to_time,
            company: trip.company,
            department: trip.department,
            vehicle_category: trip.vehicle_category,
            personal_vehicle_details: trip.personal_vehicle_details,
            entitled_vehicle_id: trip.entitled_vehicle_id,
            status: trip.status,
            approver_id: trip.approver_id,
            assigner_id: trip.assigner_id,
            driver_id: trip.driver_id,
            vehicle_id: trip.vehicle_id,
            driver_name: trip.driver_name,
            vehicle_number: trip.vehicle_number,
            start_mileage: trip.start_mileage,
            end_mileage: trip.end_mileage,
            rejection_reason: trip.rejection_reason,
            created_at: trip.created_at,
            updated_at: trip.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_rejects_negative_start_mileage() {
        let request = AssignTripRequest {
            assigner_id: Uuid::nil(),
            driver_id: Uuid::nil(),
            vehicle_id: Uuid::nil(),
            start_mileage: Decimal::from(-10),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_assign_accepts_zero_start_mileage() {
        let request = AssignTripRequest {
            assigner_id: Uuid::nil(),
            driver_id: Uuid::nil(),
            vehicle_id: Uuid::nil(),
            start_mileage: Decimal::ZERO,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_complete_rejects_negative_end_mileage() {
        let request = CompleteTripRequest {
            caller_id: Uuid::nil(),
            caller_role: UserRole::Transport,
            end_mileage: Some(Decimal::from(-1)),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_complete_accepts_missing_or_valid_end_mileage() {
        let without = CompleteTripRequest {
            caller_id: Uuid::nil(),
            caller_role: UserRole::Transport,
            end_mileage: None,
        };
        assert!(without.validate().is_ok());

        let with = CompleteTripRequest {
            caller_id: Uuid::nil(),
            caller_role: UserRole::Transport,
            end_mileage: Some(Decimal::from(120)),
        };
        assert!(with.validate().is_ok());
    }
}
