//! Repositorio de solicitudes de mantenimiento

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::maintenance::{MaintenanceRequest, MaintenanceStatus};
use crate::utils::errors::AppError;

pub struct MaintenanceRepository {
    pool: PgPool,
}

impl MaintenanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn list_for_requester(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<MaintenanceRequest>, AppError> {
        let requests = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    pub async fn list_by_status(
        &self,
        status: MaintenanceStatus,
    ) -> Result<Vec<MaintenanceRequest>, AppError> {
        let requests = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE status = $1 ORDER BY created_at ASC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Insertar una solicitud nueva; exactamente una de las referencias
    /// de vehículo viene informada (lo valida el servicio).
    pub async fn insert(
        conn: &mut PgConnection,
        requester_id: Uuid,
        entitled_vehicle_id: Option<Uuid>,
        vehicle_id: Option<Uuid>,
        description: String,
    ) -> Result<MaintenanceRequest, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (
                id, requester_id, entitled_vehicle_id, vehicle_id, description,
                status, issue_reported, issue_resolved, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, FALSE, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(requester_id)
        .bind(entitled_vehicle_id)
        .bind(vehicle_id)
        .bind(description)
        .bind(MaintenanceStatus::Requested)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(request)
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(request)
    }

    /// Transición de estado con escritura protegida
    pub async fn update_status_guarded(
        conn: &mut PgConnection,
        id: Uuid,
        expected: MaintenanceStatus,
        next: MaintenanceStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET status = $3, rejection_reason = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(rejection_reason)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(request)
    }

    /// Completar el trabajo registrando fecha y costo opcional
    pub async fn apply_completion(
        conn: &mut PgConnection,
        id: Uuid,
        cost: Option<Decimal>,
    ) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET status = $3, cost = $4, completed_at = $5
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(MaintenanceStatus::InProgress)
        .bind(MaintenanceStatus::Completed)
        .bind(cost)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(request)
    }

    /// Marcar el reporte de problema sobre un trabajo COMPLETED.
    /// No cambia el estado; el guard de "ya reportado" va en el WHERE.
    pub async fn mark_issue_reported(
        conn: &mut PgConnection,
        id: Uuid,
        issue_description: String,
    ) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET issue_reported = TRUE, issue_description = $2, issue_reported_at = $3,
                issue_resolved = FALSE
            WHERE id = $1 AND status = $4 AND issue_reported = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(issue_description)
        .bind(Utc::now())
        .bind(MaintenanceStatus::Completed)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(request)
    }

    /// Resolver un problema reportado previamente
    pub async fn mark_issue_resolved(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET issue_resolved = TRUE
            WHERE id = $1 AND issue_reported = TRUE AND issue_resolved = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(request)
    }
}
