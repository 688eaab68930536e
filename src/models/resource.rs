//! Modelos de recursos: Driver, Vehicle y EntitledVehicle
//!
//! El estado "ocupado" de un recurso nunca se almacena como campo: se
//! recalcula siempre a partir de los viajes activos que lo referencian.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Driver - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub license_number: String,
    pub active: bool,
}

/// Vehicle de flota - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub capacity: i32,
    pub active: bool,
}

/// Vehículo asignado oficialmente a un empleado, distinto de la flota
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntitledVehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub registration_number: String,
    pub description: Option<String>,
}
