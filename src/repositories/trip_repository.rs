//! Repositorio de viajes
//!
//! Las lecturas simples usan el pool; las operaciones que participan en
//! una transacción de workflow son funciones asociadas que reciben la
//! conexión, para que el servicio componga validación y escritura en una
//! sola transacción.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::trip::{Commitment, Company, Trip, TripStatus, VehicleCategory};
use crate::utils::errors::AppError;

/// Datos de inserción de un viaje nuevo
pub struct NewTrip {
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
}

/// Campos que escribe la decisión del manager
pub struct DecisionUpdate {
    pub status: TripStatus,
    pub approver_id: Uuid,
    pub rejection_reason: Option<String>,
    // Snapshots para el atajo autogestionado (PERSONAL/ENTITLED)
    pub driver_name: Option<String>,
    pub vehicle_number: Option<String>,
}

/// Campos que escribe la asignación de transporte
pub struct AssignmentUpdate {
    pub assigner_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_name: String,
    pub vehicle_number: String,
    pub start_mileage: Decimal,
}

pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    pub async fn list_for_requester(&self, requester_id: Uuid) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    pub async fn list_by_status(&self, status: TripStatus) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips WHERE status = $1 ORDER BY from_time ASC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    /// Insertar un viaje nuevo en estado `Requested`
    pub async fn insert(conn: &mut PgConnection, new_trip: NewTrip) -> Result<Trip, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (
                id, requester_id, purpose, from_location, to_location, stops,
                passenger_names, from_time, to_time, company, department,
                vehicle_category, personal_vehicle_details, entitled_vehicle_id,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_trip.requester_id)
        .bind(new_trip.purpose)
        .bind(new_trip.from_location)
        .bind(new_trip.to_location)
        .bind(new_trip.stops)
        .bind(new_trip.passenger_names)
        .bind(new_trip.from_time)
        .bind(new_trip.to_time)
        .bind(new_trip.company)
        .bind(new_trip.department)
        .bind(new_trip.vehicle_category)
        .bind(new_trip.personal_vehicle_details)
        .bind(new_trip.entitled_vehicle_id)
        .bind(TripStatus::Requested)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(trip)
    }

    /// Cargar un viaje bloqueando su fila hasta el fin de la transacción
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(trip)
    }

    /// Aplicar la decisión del manager. La escritura está protegida por
    /// el estado esperado: si otra petición ya movió el viaje, devuelve
    /// `None` y el servicio responde con conflicto de estado.
    pub async fn apply_decision(
        conn: &mut PgConnection,
        id: Uuid,
        expected: TripStatus,
        update: DecisionUpdate,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = $3, approver_id = $4, rejection_reason = $5,
                driver_name = $6, vehicle_number = $7, updated_at = $8
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(update.status)
        .bind(update.approver_id)
        .bind(update.rejection_reason)
        .bind(update.driver_name)
        .bind(update.vehicle_number)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(trip)
    }

    /// Escribir la asignación de conductor y vehículo junto con los
    /// snapshots desnormalizados, en la misma escritura que el estado.
    /// Limpia un rejection_reason viejo para que no quede colgando.
    pub async fn apply_assignment(
        conn: &mut PgConnection,
        id: Uuid,
        update: AssignmentUpdate,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = $2, assigner_id = $3, driver_id = $4, vehicle_id = $5,
                driver_name = $6, vehicle_number = $7, start_mileage = $8,
                rejection_reason = NULL, updated_at = $9
            WHERE id = $1 AND status = $10
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TripStatus::TransportAssigned)
        .bind(update.assigner_id)
        .bind(update.driver_id)
        .bind(update.vehicle_id)
        .bind(update.driver_name)
        .bind(update.vehicle_number)
        .bind(update.start_mileage)
        .bind(Utc::now())
        .bind(TripStatus::ManagerApproved)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(trip)
    }

    /// Cancelación con escritura protegida. Cancelar no es rechazar,
    /// así que el motivo de rechazo se reescribe en la misma escritura
    /// (el servicio decide si sobrevive).
    pub async fn apply_cancellation(
        conn: &mut PgConnection,
        id: Uuid,
        expected: TripStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = $3, rejection_reason = $4, updated_at = $5
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(TripStatus::Cancelled)
        .bind(rejection_reason)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(trip)
    }

    /// Transición simple de estado con escritura protegida
    pub async fn update_status_guarded(
        conn: &mut PgConnection,
        id: Uuid,
        expected: TripStatus,
        next: TripStatus,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(trip)
    }

    /// Completar el viaje registrando el kilometraje final
    pub async fn apply_completion(
        conn: &mut PgConnection,
        id: Uuid,
        end_mileage: Option<Decimal>,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = $3, end_mileage = $4, updated_at = $5
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TripStatus::InProgress)
        .bind(TripStatus::Completed)
        .bind(end_mileage)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(trip)
    }

    /// Compromisos activos de un conductor: viajes asignados o en curso
    /// que lo referencian. Se consulta dentro de la transacción de
    /// asignación, con la fila del conductor ya bloqueada.
    pub async fn active_commitments_for_driver(
        conn: &mut PgConnection,
        driver_id: Uuid,
    ) -> Result<Vec<Commitment>, AppError> {
        let commitments = sqlx::query_as::<_, Commitment>(
            r#"
            SELECT id AS trip_id, from_time, to_time
            FROM trips
            WHERE driver_id = $1 AND status IN ('transport_assigned', 'in_progress')
            "#,
        )
        .bind(driver_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(commitments)
    }

    /// Compromisos activos de un vehículo de flota
    pub async fn active_commitments_for_vehicle(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
    ) -> Result<Vec<Commitment>, AppError> {
        let commitments = sqlx::query_as::<_, Commitment>(
            r#"
            SELECT id AS trip_id, from_time, to_time
            FROM trips
            WHERE vehicle_id = $1 AND status IN ('transport_assigned', 'in_progress')
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(commitments)
    }
}
