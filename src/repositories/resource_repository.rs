//! Repositorio de recursos: conductores, vehículos de flota y
//! vehículos entitled.
//!
//! Las cargas `FOR UPDATE` serializan a dos asignaciones concurrentes
//! del mismo recurso: la segunda transacción espera el commit de la
//! primera y ve sus compromisos ya confirmados.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::resource::{Driver, EntitledVehicle, Vehicle};
use crate::utils::errors::AppError;

pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let drivers =
            sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE active ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(drivers)
    }

    pub async fn list_active_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE active ORDER BY vehicle_number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Cargar un conductor bloqueando su fila dentro de la transacción
    /// de asignación.
    pub async fn lock_driver(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(driver)
    }

    /// Cargar un vehículo de flota bloqueando su fila
    pub async fn lock_vehicle(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(vehicle)
    }

    /// Carga de vehículo entitled dentro de una transacción
    pub async fn find_entitled_vehicle_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<EntitledVehicle>, AppError> {
        let vehicle =
            sqlx::query_as::<_, EntitledVehicle>("SELECT * FROM entitled_vehicles WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(vehicle)
    }
}
