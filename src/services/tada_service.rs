//! Servicio de workflow TADA
//!
//! Variante estructural liviana del pipeline de aprobación: un lote de
//! reclamos se presenta contra un viaje ya aprobado y cada reclamo
//! avanza de forma independiente PENDING → APPROVED/REJECTED.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Decision;
use crate::dto::tada_dto::CreateTadaRequest;
use crate::models::tada::{TadaRequest, TadaStatus};
use crate::models::trip::TripStatus;
use crate::models::user::UserRole;
use crate::repositories::tada_repository::{NewClaim, TadaRepository};
use crate::repositories::trip_repository::TripRepository;
use crate::services::notification_service::{NotificationDraft, NotificationSink};
use crate::utils::errors::{AppError, AppResult};
use crate::workflow::transitions::ensure_transition;

/// Los reclamos se pueden presentar desde que el viaje está aprobado,
/// no solo después de completarlo.
pub fn tada_filing_allowed(status: TripStatus) -> bool {
    matches!(
        status,
        TripStatus::ManagerApproved
            | TripStatus::TransportAssigned
            | TripStatus::InProgress
            | TripStatus::Completed
    )
}

pub struct TadaService {
    pool: PgPool,
    requests: TadaRepository,
    notifier: Arc<dyn NotificationSink>,
}

impl TadaService {
    pub fn new(pool: PgPool, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            requests: TadaRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Presentar un lote de reclamos contra un viaje del solicitante.
    /// El lote es atómico: o entran todos los reclamos o ninguno.
    /// Notifica a los managers una sola vez, resumiendo el lote.
    pub async fn create(&self, request: CreateTadaRequest) -> AppResult<Vec<TadaRequest>> {
        request.validate()?;

        if request.claims.is_empty() {
            return Err(AppError::BadRequest(
                "A TADA batch must contain at least one claim".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let trip = TripRepository::find_for_update(&mut tx, request.trip_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Trip with id '{}' not found", request.trip_id))
            })?;

        if trip.requester_id != request.requester_id {
            return Err(AppError::Forbidden(
                "Claims can only be filed against your own trips".to_string(),
            ));
        }

        if !tada_filing_allowed(trip.status) {
            return Err(AppError::StateConflict(format!(
                "Trip is in status '{}'; claims require an approved trip",
                trip.status.as_str()
            )));
        }

        let mut created = Vec::with_capacity(request.claims.len());
        let mut total = Decimal::ZERO;

        for claim in request.claims {
            total += claim.amount;
            let row = TadaRepository::insert(
                &mut tx,
                trip.id,
                trip.requester_id,
                NewClaim {
                    claim_type: claim.claim_type,
                    amount: claim.amount,
                    description: claim.description,
                },
            )
            .await?;
            created.push(row);
        }

        tx.commit().await?;

        self.notifier
            .dispatch(vec![NotificationDraft::for_role(
                UserRole::Manager,
                "tada_submitted",
                "Nuevos reclamos TADA",
                format!(
                    "{} reclamos por un total de {} contra el viaje {} -> {}",
                    created.len(),
                    total,
                    trip.from_location,
                    trip.to_location
                ),
                Some(format!("/trips/{}/tada", trip.id)),
            )])
            .await;

        Ok(created)
    }

    /// Resolver un reclamo pendiente
    pub async fn decide(
        &self,
        request_id: Uuid,
        decision: Decision,
        rejection_reason: Option<String>,
    ) -> AppResult<TadaRequest> {
        let mut tx = self.pool.begin().await?;

        let current = TadaRepository::find_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("TADA request with id '{}' not found", request_id))
            })?;

        if current.status != TadaStatus::Pending {
            return Err(AppError::StateConflict(format!(
                "TADA request is already '{}'",
                current.status.as_str()
            )));
        }

        let (next, reason) = match decision {
            Decision::Approve => (TadaStatus::Approved, None),
            Decision::Reject => (TadaStatus::Rejected, rejection_reason),
        };

        ensure_transition(current.status, next)?;

        let updated = TadaRepository::apply_decision(&mut tx, request_id, next, reason)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(
                    "TADA request was modified by a concurrent request".to_string(),
                )
            })?;

        tx.commit().await?;

        let message = match updated.status {
            TadaStatus::Approved => {
                format!("Tu reclamo de {} fue aprobado", updated.amount)
            }
            _ => format!("Tu reclamo de {} fue rechazado", updated.amount),
        };

        self.notifier
            .dispatch(vec![NotificationDraft::for_user(
                updated.requester_id,
                "tada_decided",
                "Decisión sobre tu reclamo TADA",
                message,
                Some(format!("/trips/{}/tada", updated.trip_id)),
            )])
            .await;

        Ok(updated)
    }

    pub async fn list_by_trip(&self, trip_id: Uuid) -> AppResult<Vec<TadaRequest>> {
        self.requests.list_by_trip(trip_id).await
    }

    pub async fn list_pending(&self) -> AppResult<Vec<TadaRequest>> {
        self.requests.list_pending().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<TadaRequest> {
        self.requests.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("TADA request with id '{}' not found", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_allowed_once_approved() {
        assert!(tada_filing_allowed(TripStatus::ManagerApproved));
        assert!(tada_filing_allowed(TripStatus::TransportAssigned));
        assert!(tada_filing_allowed(TripStatus::InProgress));
        assert!(tada_filing_allowed(TripStatus::Completed));
    }

    #[test]
    fn test_filing_blocked_before_approval() {
        assert!(!tada_filing_allowed(TripStatus::Requested));
        assert!(!tada_filing_allowed(TripStatus::ManagerRejected));
        assert!(!tada_filing_allowed(TripStatus::Cancelled));
    }
}
