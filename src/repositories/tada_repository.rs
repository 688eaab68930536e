//! Repositorio de solicitudes TADA

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::tada::{ClaimType, TadaRequest, TadaStatus};
use crate::utils::errors::AppError;

/// Datos de inserción de un reclamo
pub struct NewClaim {
    pub claim_type: ClaimType,
    pub amount: Decimal,
    pub description: Option<String>,
}

pub struct TadaRepository {
    pool: PgPool,
}

impl TadaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TadaRequest>, AppError> {
        let request = sqlx::query_as::<_, TadaRequest>("SELECT * FROM tada_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    pub async fn list_by_trip(&self, trip_id: Uuid) -> Result<Vec<TadaRequest>, AppError> {
        let requests = sqlx::query_as::<_, TadaRequest>(
            "SELECT * FROM tada_requests WHERE trip_id = $1 ORDER BY created_at ASC",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    pub async fn list_pending(&self) -> Result<Vec<TadaRequest>, AppError> {
        let requests = sqlx::query_as::<_, TadaRequest>(
            "SELECT * FROM tada_requests WHERE status = $1 ORDER BY created_at ASC",
        )
        .bind(TadaStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Insertar un reclamo del lote en estado PENDING
    pub async fn insert(
        conn: &mut PgConnection,
        trip_id: Uuid,
        requester_id: Uuid,
        claim: NewClaim,
    ) -> Result<TadaRequest, AppError> {
        let request = sqlx::query_as::<_, TadaRequest>(
            r#"
            INSERT INTO tada_requests (
                id, trip_id, requester_id, claim_type, amount, description,
                status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(trip_id)
        .bind(requester_id)
        .bind(claim.claim_type)
        .bind(claim.amount)
        .bind(claim.description)
        .bind(TadaStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(request)
    }

    /// Cargar una solicitud bloqueando su fila
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<TadaRequest>, AppError> {
        let request =
            sqlx::query_as::<_, TadaRequest>("SELECT * FROM tada_requests WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(request)
    }

    /// Resolver el reclamo: escritura protegida por el estado PENDING
    pub async fn apply_decision(
        conn: &mut PgConnection,
        id: Uuid,
        next: TadaStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<TadaRequest>, AppError> {
        let request = sqlx::query_as::<_, TadaRequest>(
            r#"
            UPDATE tada_requests
            SET status = $3, rejection_reason = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TadaStatus::Pending)
        .bind(next)
        .bind(rejection_reason)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(request)
    }
}
