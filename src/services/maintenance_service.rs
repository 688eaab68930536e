//! Servicio de workflow de mantenimiento
//!
//! Mismo patrón de pipeline que los viajes, con pasos extra de taller:
//! REQUESTED → APPROVED → IN_PROGRESS → COMPLETED, más el reporte de
//! problemas posterior a la finalización (atributo lateral, no estado).

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::Decision;
use crate::models::maintenance::{MaintenanceRequest, MaintenanceStatus};
use crate::models::user::UserRole;
use crate::repositories::maintenance_repository::MaintenanceRepository;
use crate::repositories::resource_repository::ResourceRepository;
use crate::services::notification_service::{NotificationDraft, NotificationSink};
use crate::utils::errors::{AppError, AppResult};
use crate::workflow::transitions::ensure_transition;

/// Un problema solo se puede reportar sobre un trabajo completado que
/// todavía no tiene un reporte previo: el reporte no se acumula ni se
/// duplica.
pub fn issue_report_allowed(status: MaintenanceStatus, issue_reported: bool) -> bool {
    status == MaintenanceStatus::Completed && !issue_reported
}

pub struct MaintenanceService {
    pool: PgPool,
    requests: MaintenanceRepository,
    notifier: Arc<dyn NotificationSink>,
}

impl MaintenanceService {
    pub fn new(pool: PgPool, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            requests: MaintenanceRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Solicitud de mantenimiento sobre un vehículo entitled del
    /// empleado. Notifica a managers y también a transporte (el taller
    /// se entera de trabajo entrante que no originó él mismo).
    pub async fn create(
        &self,
        requester_id: Uuid,
        entitled_vehicle_id: Uuid,
        description: String,
    ) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let entitled = ResourceRepository::find_entitled_vehicle_tx(&mut tx, entitled_vehicle_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Entitled vehicle with id '{}' not found",
                    entitled_vehicle_id
                ))
            })?;

        if entitled.owner_id != requester_id {
            return Err(AppError::Forbidden(
                "The entitled vehicle does not belong to the requester".to_string(),
            ));
        }

        let request = MaintenanceRepository::insert(
            &mut tx,
            requester_id,
            Some(entitled_vehicle_id),
            None,
            description,
        )
        .await?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![
                NotificationDraft::for_role(
                    UserRole::Manager,
                    "maintenance_requested",
                    "Nueva solicitud de mantenimiento",
                    format!("Mantenimiento solicitado para el vehículo {}", entitled.registration_number),
                    Some(format!("/maintenance/{}", request.id)),
                ),
                NotificationDraft::for_role(
                    UserRole::Transport,
                    "maintenance_requested",
                    "Nueva solicitud de mantenimiento",
                    format!("Mantenimiento solicitado para el vehículo {}", entitled.registration_number),
                    Some(format!("/maintenance/{}", request.id)),
                ),
            ])
            .await;

        Ok(request)
    }

    /// Solicitud de mantenimiento sobre un vehículo de flota. La origina
    /// el propio transporte, así que solo se notifica a los managers.
    pub async fn create_fleet(
        &self,
        requester_id: Uuid,
        vehicle_id: Uuid,
        description: String,
    ) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let vehicle = ResourceRepository::lock_vehicle(&mut tx, vehicle_id)
            .await?
            .filter(|v| v.active)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Vehicle with id '{}' not found or inactive",
                    vehicle_id
                ))
            })?;

        let request = MaintenanceRepository::insert(
            &mut tx,
            requester_id,
            None,
            Some(vehicle_id),
            description,
        )
        .await?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![NotificationDraft::for_role(
                UserRole::Manager,
                "maintenance_requested",
                "Nueva solicitud de mantenimiento de flota",
                format!("Mantenimiento solicitado para el vehículo {}", vehicle.vehicle_number),
                Some(format!("/maintenance/{}", request.id)),
            )])
            .await;

        Ok(request)
    }

    /// Decisión del manager sobre una solicitud REQUESTED. Si se aprueba
    /// un vehículo entitled, transporte recibe aviso de trabajo listo.
    pub async fn decide(
        &self,
        request_id: Uuid,
        decision: Decision,
        rejection_reason: Option<String>,
    ) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let current = MaintenanceRepository::find_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Maintenance request with id '{}' not found",
                    request_id
                ))
            })?;

        if current.status != MaintenanceStatus::Requested {
            return Err(AppError::StateConflict(format!(
                "Maintenance request is in status '{}', only 'REQUESTED' can be decided",
                current.status.as_str()
            )));
        }

        let (next, reason) = match decision {
            Decision::Approve => (MaintenanceStatus::Approved, None),
            Decision::Reject => (MaintenanceStatus::Rejected, rejection_reason),
        };

        ensure_transition(current.status, next)?;

        let updated = MaintenanceRepository::update_status_guarded(
            &mut tx,
            request_id,
            MaintenanceStatus::Requested,
            next,
            reason,
        )
        .await?
        .ok_or_else(|| {
            AppError::StateConflict(
                "Maintenance request was modified by a concurrent request".to_string(),
            )
        })?;

        tx.commit().await?;

        let mut drafts = vec![NotificationDraft::for_user(
            updated.requester_id,
            "maintenance_decided",
            "Decisión sobre tu solicitud de mantenimiento",
            match updated.status {
                MaintenanceStatus::Approved => "Tu solicitud de mantenimiento fue aprobada",
                _ => "Tu solicitud de mantenimiento fue rechazada",
            }
            .to_string(),
            Some(format!("/maintenance/{}", updated.id)),
        )];

        if updated.status == MaintenanceStatus::Approved && !updated.is_fleet() {
            drafts.push(NotificationDraft::for_role(
                UserRole::Transport,
                "maintenance_approved",
                "Trabajo de mantenimiento listo",
                "Una solicitud de mantenimiento aprobada espera al taller".to_string(),
                Some(format!("/maintenance/{}", updated.id)),
            ));
        }

        self.notifier.dispatch(drafts).await;

        Ok(updated)
    }

    /// Iniciar el trabajo aprobado (personal de transporte)
    pub async fn start(&self, request_id: Uuid, caller_role: UserRole) -> AppResult<MaintenanceRequest> {
        if !caller_role.is_transport_staff() {
            return Err(AppError::Forbidden(
                "Only TRANSPORT/ADMIN can start maintenance work".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = MaintenanceRepository::find_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Maintenance request with id '{}' not found",
                    request_id
                ))
            })?;

        ensure_transition(current.status, MaintenanceStatus::InProgress)?;

        let updated = MaintenanceRepository::update_status_guarded(
            &mut tx,
            request_id,
            MaintenanceStatus::Approved,
            MaintenanceStatus::InProgress,
            None,
        )
        .await?
        .ok_or_else(|| {
            AppError::StateConflict(
                "Maintenance request was modified by a concurrent request".to_string(),
            )
        })?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Completar el trabajo en curso registrando fecha y costo opcional
    pub async fn complete(
        &self,
        request_id: Uuid,
        caller_role: UserRole,
        cost: Option<Decimal>,
    ) -> AppResult<MaintenanceRequest> {
        if !caller_role.is_transport_staff() {
            return Err(AppError::Forbidden(
                "Only TRANSPORT/ADMIN can complete maintenance work".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = MaintenanceRepository::find_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Maintenance request with id '{}' not found",
                    request_id
                ))
            })?;

        ensure_transition(current.status, MaintenanceStatus::Completed)?;

        let updated = MaintenanceRepository::apply_completion(&mut tx, request_id, cost)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(
                    "Maintenance request was modified by a concurrent request".to_string(),
                )
            })?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![NotificationDraft::for_user(
                updated.requester_id,
                "maintenance_completed",
                "Mantenimiento completado",
                "El trabajo sobre tu vehículo fue completado".to_string(),
                Some(format!("/maintenance/{}", updated.id)),
            )])
            .await;

        Ok(updated)
    }

    /// Reportar un problema sobre un trabajo COMPLETED. No cambia el
    /// estado; falla si la solicitud no está completada o ya tiene un
    /// reporte sin resolver.
    pub async fn report_issue(
        &self,
        request_id: Uuid,
        requester_id: Uuid,
        issue_description: String,
    ) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let current = MaintenanceRepository::find_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Maintenance request with id '{}' not found",
                    request_id
                ))
            })?;

        if current.requester_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the requester can report an issue on their maintenance work".to_string(),
            ));
        }

        if !issue_report_allowed(current.status, current.issue_reported) {
            let message = if current.status != MaintenanceStatus::Completed {
                "Issues can only be reported on completed maintenance work"
            } else {
                "An issue was already reported for this maintenance work"
            };
            return Err(AppError::StateConflict(message.to_string()));
        }

        let updated =
            MaintenanceRepository::mark_issue_reported(&mut tx, request_id, issue_description)
                .await?
                .ok_or_else(|| {
                    AppError::StateConflict(
                        "An issue was already reported for this maintenance work".to_string(),
                    )
                })?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![NotificationDraft::for_role(
                UserRole::Transport,
                "maintenance_issue",
                "Problema reportado en mantenimiento",
                "Un empleado reportó un problema sobre un trabajo completado".to_string(),
                Some(format!("/maintenance/{}", updated.id)),
            )])
            .await;

        Ok(updated)
    }

    /// Marcar como resuelto un problema reportado (personal de transporte)
    pub async fn resolve_issue(
        &self,
        request_id: Uuid,
        caller_role: UserRole,
    ) -> AppResult<MaintenanceRequest> {
        if !caller_role.is_transport_staff() {
            return Err(AppError::Forbidden(
                "Only TRANSPORT/ADMIN can resolve a reported issue".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let updated = MaintenanceRepository::mark_issue_resolved(&mut tx, request_id)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(
                    "The maintenance request has no unresolved issue to resolve".to_string(),
                )
            })?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![NotificationDraft::for_user(
                updated.requester_id,
                "maintenance_issue_resolved",
                "Problema de mantenimiento resuelto",
                "El problema que reportaste fue atendido por el taller".to_string(),
                Some(format!("/maintenance/{}", updated.id)),
            )])
            .await;

        Ok(updated)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<MaintenanceRequest> {
        self.requests.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Maintenance request with id '{}' not found", id))
        })
    }

    pub async fn list_for_requester(&self, requester_id: Uuid) -> AppResult<Vec<MaintenanceRequest>> {
        self.requests.list_for_requester(requester_id).await
    }

    pub async fn list_by_status(&self, status: MaintenanceStatus) -> AppResult<Vec<MaintenanceRequest>> {
        self.requests.list_by_status(status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_report_requires_completed_work() {
        assert!(issue_report_allowed(MaintenanceStatus::Completed, false));
        assert!(!issue_report_allowed(MaintenanceStatus::Requested, false));
        assert!(!issue_report_allowed(MaintenanceStatus::Approved, false));
        assert!(!issue_report_allowed(MaintenanceStatus::Rejected, false));
        assert!(!issue_report_allowed(MaintenanceStatus::InProgress, false));
    }

    #[test]
    fn test_issue_report_rejected_when_already_flagged() {
        assert!(!issue_report_allowed(MaintenanceStatus::Completed, true));
    }
}
