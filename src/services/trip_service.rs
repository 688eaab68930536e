//! Servicio de workflow de viajes
//!
//! Orquesta el ciclo de vida completo del viaje: creación, decisión del
//! manager, asignación de transporte, inicio, finalización y
//! cancelación. Cada operación ejecuta su secuencia
//! leer-validar-escribir dentro de una sola transacción; las
//! notificaciones se despachan recién después del commit.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Decision;
use crate::dto::trip_dto::CreateTripRequest;
use crate::models::trip::{Trip, TripStatus, VehicleCategory};
use crate::models::user::UserRole;
use crate::repositories::resource_repository::ResourceRepository;
use crate::repositories::trip_repository::{
    AssignmentUpdate, DecisionUpdate, NewTrip, TripRepository,
};
use crate::repositories::user_repository::UserRepository;
use crate::services::availability::{find_conflict, ResourceType};
use crate::services::notification_service::{NotificationDraft, NotificationSink};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation;
use crate::workflow::transitions::ensure_transition;

/// Resultado de aprobar un viaje según la categoría de vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub target_status: TripStatus,
    pub auto_assign: bool,
}

/// Regla de negocio del atajo autogestionado: un viaje PERSONAL o
/// ENTITLED aporta su propio vehículo, así que la aprobación salta
/// directo a `TransportAssigned` con el solicitante como conductor.
/// Un viaje FLEET queda en `ManagerApproved` esperando a transporte.
pub fn resolve_approval_outcome(category: VehicleCategory) -> ApprovalOutcome {
    if category.is_self_managed() {
        ApprovalOutcome {
            target_status: TripStatus::TransportAssigned,
            auto_assign: true,
        }
    } else {
        ApprovalOutcome {
            target_status: TripStatus::ManagerApproved,
            auto_assign: false,
        }
    }
}

/// Un viaje se puede cancelar mientras no haya recursos comprometidos:
/// desde la asignación en adelante la cancelación requiere coordinación
/// operativa fuera del motor.
pub fn trip_cancel_allowed(status: TripStatus) -> bool {
    matches!(
        status,
        TripStatus::Requested | TripStatus::ManagerApproved | TripStatus::ManagerRejected
    )
}

/// El motivo de rechazo solo sobrevive a la transición que rechaza;
/// cualquier transición posterior que no sea rechazo lo limpia.
pub fn retained_rejection_reason(
    next: TripStatus,
    reason: Option<String>,
) -> Option<String> {
    if next == TripStatus::ManagerRejected {
        reason
    } else {
        None
    }
}

pub struct TripService {
    pool: PgPool,
    trips: TripRepository,
    resources: ResourceRepository,
    notifier: Arc<dyn NotificationSink>,
}

impl TripService {
    pub fn new(pool: PgPool, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            trips: TripRepository::new(pool.clone()),
            resources: ResourceRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Crear una solicitud de viaje en estado `Requested`.
    /// Notifica a todos los managers.
    pub async fn create(&self, request: CreateTripRequest) -> AppResult<Trip> {
        request.validate()?;
        validation::validate_time_window(request.from_time, request.to_time)
            .map_err(|e| AppError::Validation(validation::single_error("to_time", e)))?;

        if request.vehicle_category == VehicleCategory::Entitled
            && request.entitled_vehicle_id.is_none()
        {
            return Err(AppError::BadRequest(
                "entitled_vehicle_id is required for ENTITLED trips".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let requester = UserRepository::find_by_id_tx(&mut tx, request.requester_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "User with id '{}' not found",
                    request.requester_id
                ))
            })?;

        // Un viaje ENTITLED solo puede usar un vehículo del propio solicitante
        if let Some(entitled_id) = request.entitled_vehicle_id {
            let entitled = ResourceRepository::find_entitled_vehicle_tx(&mut tx, entitled_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Entitled vehicle with id '{}' not found",
                        entitled_id
                    ))
                })?;

            if entitled.owner_id != requester.id {
                return Err(AppError::Forbidden(
                    "The entitled vehicle does not belong to the requester".to_string(),
                ));
            }
        }

        let department = request
            .department
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| requester.department.clone());

        let trip = TripRepository::insert(
            &mut tx,
            NewTrip {
                requester_id: requester.id,
                purpose: request.purpose,
                from_location: request.from_location,
                to_location: request.to_location,
                stops: request.stops,
                passenger_names: request.passenger_names,
                from_time: request.from_time,
                to_time: request.to_time,
                company: request.company,
                department,
                vehicle_category: request.vehicle_category,
                personal_vehicle_details: request.personal_vehicle_details,
                entitled_vehicle_id: request.entitled_vehicle_id,
            },
        )
        .await?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![NotificationDraft::for_role(
                UserRole::Manager,
                "trip_requested",
                "Nueva solicitud de viaje",
                format!(
                    "{} solicitó un viaje de {} a {}",
                    requester.name, trip.from_location, trip.to_location
                ),
                Some(format!("/trips/{}", trip.id)),
            )])
            .await;

        Ok(trip)
    }

    /// Decisión del manager sobre un viaje en `Requested`. Aprobación de
    /// un viaje autogestionado salta directo a `TransportAssigned` con
    /// los snapshots del solicitante y su vehículo.
    pub async fn decide(
        &self,
        trip_id: Uuid,
        approver_id: Uuid,
        decision: Decision,
        rejection_reason: Option<String>,
    ) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = TripRepository::find_for_update(&mut tx, trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip with id '{}' not found", trip_id)))?;

        if approver_id == trip.requester_id {
            return Err(AppError::Forbidden(
                "A requester cannot approve their own trip".to_string(),
            ));
        }

        if trip.status != TripStatus::Requested {
            return Err(AppError::StateConflict(format!(
                "Trip is in status '{}', only 'requested' trips can be decided",
                trip.status.as_str()
            )));
        }

        let update = match decision {
            Decision::Reject => DecisionUpdate {
                status: TripStatus::ManagerRejected,
                approver_id,
                rejection_reason: retained_rejection_reason(
                    TripStatus::ManagerRejected,
                    rejection_reason,
                ),
                driver_name: None,
                vehicle_number: None,
            },
            Decision::Approve => {
                let outcome = resolve_approval_outcome(trip.vehicle_category);

                let (driver_name, vehicle_number) = if outcome.auto_assign {
                    self.self_managed_snapshots(&mut tx, &trip).await?
                } else {
                    (None, None)
                };

                DecisionUpdate {
                    status: outcome.target_status,
                    approver_id,
                    rejection_reason: retained_rejection_reason(
                        outcome.target_status,
                        rejection_reason,
                    ),
                    driver_name,
                    vehicle_number,
                }
            }
        };

        ensure_transition(trip.status, update.status)?;

        let decided_status = update.status;
        let updated = TripRepository::apply_decision(&mut tx, trip_id, TripStatus::Requested, update)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(
                    "Trip was modified by a concurrent request".to_string(),
                )
            })?;

        tx.commit().await?;

        let message = match decided_status {
            TripStatus::ManagerRejected => "Tu solicitud de viaje fue rechazada".to_string(),
            TripStatus::TransportAssigned => {
                "Tu viaje fue aprobado; usás tu propio vehículo".to_string()
            }
            _ => "Tu viaje fue aprobado y espera asignación de transporte".to_string(),
        };

        self.notifier
            .dispatch(vec![NotificationDraft::for_user(
                updated.requester_id,
                "trip_decided",
                "Decisión sobre tu viaje",
                message,
                Some(format!("/trips/{}", updated.id)),
            )])
            .await;

        Ok(updated)
    }

    /// Snapshots de conductor/vehículo para el atajo autogestionado:
    /// el solicitante figura como conductor y su vehículo personal o
    /// entitled como vehículo.
    async fn self_managed_snapshots(
        &self,
        tx: &mut sqlx::PgConnection,
        trip: &Trip,
    ) -> AppResult<(Option<String>, Option<String>)> {
        let requester = UserRepository::find_by_id_tx(tx, trip.requester_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "User with id '{}' not found",
                    trip.requester_id
                ))
            })?;

        let vehicle_number = match trip.vehicle_category {
            VehicleCategory::Entitled => {
                let entitled_id = trip.entitled_vehicle_id.ok_or_else(|| {
                    AppError::Internal(
                        "ENTITLED trip without entitled_vehicle_id".to_string(),
                    )
                })?;
                let entitled = ResourceRepository::find_entitled_vehicle_tx(tx, entitled_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "Entitled vehicle with id '{}' not found",
                            entitled_id
                        ))
                    })?;
                entitled.registration_number
            }
            _ => trip
                .personal_vehicle_details
                .clone()
                .unwrap_or_else(|| "Vehículo personal".to_string()),
        };

        Ok((Some(requester.name), Some(vehicle_number)))
    }

    /// Asignar conductor y vehículo de flota a un viaje aprobado.
    /// La verificación de disponibilidad y la escritura corren en la
    /// misma transacción, con las filas de los recursos bloqueadas, para
    /// que de dos asignaciones concurrentes del mismo recurso solo una
    /// pueda confirmar.
    pub async fn assign(
        &self,
        trip_id: Uuid,
        assigner_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Uuid,
        start_mileage: Decimal,
    ) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = TripRepository::find_for_update(&mut tx, trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip with id '{}' not found", trip_id)))?;

        if trip.status != TripStatus::ManagerApproved {
            return Err(AppError::StateConflict(format!(
                "Trip is in status '{}', only 'manager_approved' trips can be assigned",
                trip.status.as_str()
            )));
        }

        ensure_transition(trip.status, TripStatus::TransportAssigned)?;

        let driver = ResourceRepository::lock_driver(&mut tx, driver_id)
            .await?
            .filter(|d| d.active)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Driver with id '{}' not found or inactive",
                    driver_id
                ))
            })?;

        let vehicle = ResourceRepository::lock_vehicle(&mut tx, vehicle_id)
            .await?
            .filter(|v| v.active)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Vehicle with id '{}' not found or inactive",
                    vehicle_id
                ))
            })?;

        self.check_availability(
            &mut tx,
            ResourceType::Driver,
            driver_id,
            &trip,
        )
        .await?;
        self.check_availability(
            &mut tx,
            ResourceType::Vehicle,
            vehicle_id,
            &trip,
        )
        .await?;

        let updated = TripRepository::apply_assignment(
            &mut tx,
            trip_id,
            AssignmentUpdate {
                assigner_id,
                driver_id,
                vehicle_id,
                driver_name: driver.name.clone(),
                vehicle_number: vehicle.vehicle_number.clone(),
                start_mileage,
            },
        )
        .await?
        .ok_or_else(|| {
            AppError::StateConflict("Trip was modified by a concurrent request".to_string())
        })?;

        tx.commit().await?;

        self.notifier
            .dispatch(vec![
                NotificationDraft::for_role(
                    UserRole::Transport,
                    "trip_assigned",
                    "Viaje asignado",
                    format!(
                        "Conductor {} y vehículo {} asignados al viaje {} -> {}",
                        driver.name, vehicle.vehicle_number, updated.from_location,
                        updated.to_location
                    ),
                    Some(format!("/trips/{}", updated.id)),
                ),
                NotificationDraft::for_user(
                    updated.requester_id,
                    "trip_assigned",
                    "Transporte asignado",
                    format!(
                        "Tu viaje tiene asignado al conductor {} con el vehículo {}",
                        driver.name, vehicle.vehicle_number
                    ),
                    Some(format!("/trips/{}", updated.id)),
                ),
            ])
            .await;

        Ok(updated)
    }

    /// Escanea los compromisos activos del recurso dentro de la
    /// transacción de asignación y falla con `ResourceConflict` si
    /// alguno se superpone con la ventana del viaje.
    async fn check_availability(
        &self,
        tx: &mut sqlx::PgConnection,
        resource_type: ResourceType,
        resource_id: Uuid,
        trip: &Trip,
    ) -> AppResult<()> {
        let commitments = match resource_type {
            ResourceType::Driver => {
                TripRepository::active_commitments_for_driver(tx, resource_id).await?
            }
            ResourceType::Vehicle => {
                TripRepository::active_commitments_for_vehicle(tx, resource_id).await?
            }
        };

        if let Some(conflict) = find_conflict(
            &commitments,
            trip.from_time,
            trip.to_time,
            Some(trip.id),
        ) {
            return Err(AppError::ResourceConflict(format!(
                "The {} is already committed to trip '{}' in an overlapping window",
                resource_type.as_str(),
                conflict.trip_id
            )));
        }

        Ok(())
    }

    /// Cancelar un viaje. Permitido para el solicitante dueño o los
    /// roles ADMIN/TRANSPORT/MANAGER; bloqueado una vez que hay recursos
    /// comprometidos (asignado, en curso o completado).
    pub async fn cancel(
        &self,
        trip_id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = TripRepository::find_for_update(&mut tx, trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip with id '{}' not found", trip_id)))?;

        if caller_id != trip.requester_id && !caller_role.can_cancel_any_trip() {
            return Err(AppError::Forbidden(
                "Only the requester or ADMIN/TRANSPORT/MANAGER roles can cancel a trip"
                    .to_string(),
            ));
        }

        if !trip_cancel_allowed(trip.status) {
            return Err(AppError::StateConflict(format!(
                "Trip in status '{}' cannot be cancelled: committed resources require operational coordination",
                trip.status.as_str()
            )));
        }

        ensure_transition(trip.status, TripStatus::Cancelled)?;

        let updated = TripRepository::apply_cancellation(
            &mut tx,
            trip_id,
            trip.status,
            retained_rejection_reason(TripStatus::Cancelled, trip.rejection_reason.clone()),
        )
        .await?
        .ok_or_else(|| {
            AppError::StateConflict("Trip was modified by a concurrent request".to_string())
        })?;

        tx.commit().await?;

        if caller_id != updated.requester_id {
            self.notifier
                .dispatch(vec![NotificationDraft::for_user(
                    updated.requester_id,
                    "trip_cancelled",
                    "Viaje cancelado",
                    "Tu solicitud de viaje fue cancelada".to_string(),
                    Some(format!("/trips/{}", updated.id)),
                )])
                .await;
        }

        Ok(updated)
    }

    /// Iniciar un viaje asignado (personal de transporte)
    pub async fn start(
        &self,
        trip_id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> AppResult<Trip> {
        if !caller_role.is_transport_staff() {
            return Err(AppError::Forbidden(
                "Only TRANSPORT/ADMIN can start a trip".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let trip = TripRepository::find_for_update(&mut tx, trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip with id '{}' not found", trip_id)))?;

        ensure_transition(trip.status, TripStatus::InProgress)?;

        let updated = TripRepository::update_status_guarded(
            &mut tx,
            trip_id,
            TripStatus::TransportAssigned,
            TripStatus::InProgress,
        )
        .await?
        .ok_or_else(|| {
            AppError::StateConflict("Trip was modified by a concurrent request".to_string())
        })?;

        tx.commit().await?;

        tracing::info!("Viaje {} iniciado por {}", trip_id, caller_id);

        Ok(updated)
    }

    /// Completar un viaje en curso registrando el kilometraje final
    pub async fn complete(
        &self,
        trip_id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
        end_mileage: Option<Decimal>,
    ) -> AppResult<Trip> {
        if !caller_role.is_transport_staff() {
            return Err(AppError::Forbidden(
                "Only TRANSPORT/ADMIN can complete a trip".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let trip = TripRepository::find_for_update(&mut tx, trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip with id '{}' not found", trip_id)))?;

        ensure_transition(trip.status, TripStatus::Completed)?;

        let updated = TripRepository::apply_completion(&mut tx, trip_id, end_mileage)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(
                    "Trip was modified by a concurrent request".to_string(),
                )
            })?;

        tx.commit().await?;

        tracing::info!("Viaje {} completado por {}", trip_id, caller_id);

        self.notifier
            .dispatch(vec![NotificationDraft::for_user(
                updated.requester_id,
                "trip_completed",
                "Viaje completado",
                "Tu viaje fue completado; ya podés cargar reclamos TADA".to_string(),
                Some(format!("/trips/{}", updated.id)),
            )])
            .await;

        Ok(updated)
    }

    pub async fn get_by_id(&self, trip_id: Uuid) -> AppResult<Trip> {
        self.trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip with id '{}' not found", trip_id)))
    }

    pub async fn list(
        &self,
        requester_id: Option<Uuid>,
        status: Option<TripStatus>,
    ) -> AppResult<Vec<Trip>> {
        match (requester_id, status) {
            (Some(requester), _) => self.trips.list_for_requester(requester).await,
            (None, Some(status)) => self.trips.list_by_status(status).await,
            (None, None) => Err(AppError::BadRequest(
                "Provide requester_id or status to list trips".to_string(),
            )),
        }
    }

    pub async fn list_active_drivers(&self) -> AppResult<Vec<crate::models::resource::Driver>> {
        self.resources.list_active_drivers().await
    }

    pub async fn list_active_vehicles(&self) -> AppResult<Vec<crate::models::resource::Vehicle>> {
        self.resources.list_active_vehicles().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_approval_waits_for_transport() {
        let outcome = resolve_approval_outcome(VehicleCategory::Fleet);
        assert_eq!(outcome.target_status, TripStatus::ManagerApproved);
        assert!(!outcome.auto_assign);
    }

    #[test]
    fn test_personal_approval_is_self_managed() {
        let outcome = resolve_approval_outcome(VehicleCategory::Personal);
        assert_eq!(outcome.target_status, TripStatus::TransportAssigned);
        assert!(outcome.auto_assign);
    }

    #[test]
    fn test_entitled_approval_is_self_managed() {
        let outcome = resolve_approval_outcome(VehicleCategory::Entitled);
        assert_eq!(outcome.target_status, TripStatus::TransportAssigned);
        assert!(outcome.auto_assign);
    }

    #[test]
    fn test_cancel_allowed_before_resources_committed() {
        assert!(trip_cancel_allowed(TripStatus::Requested));
        assert!(trip_cancel_allowed(TripStatus::ManagerApproved));
        assert!(trip_cancel_allowed(TripStatus::ManagerRejected));
    }

    #[test]
    fn test_cancel_blocked_once_resources_committed() {
        assert!(!trip_cancel_allowed(TripStatus::TransportAssigned));
        assert!(!trip_cancel_allowed(TripStatus::InProgress));
        assert!(!trip_cancel_allowed(TripStatus::Completed));
        assert!(!trip_cancel_allowed(TripStatus::Cancelled));
    }

    #[test]
    fn test_rejection_reason_survives_only_rejection() {
        let reason = Some("presupuesto agotado".to_string());
        assert_eq!(
            retained_rejection_reason(TripStatus::ManagerRejected, reason.clone()),
            reason
        );
        assert_eq!(
            retained_rejection_reason(TripStatus::ManagerApproved, reason.clone()),
            None
        );
        assert_eq!(
            retained_rejection_reason(TripStatus::Cancelled, reason),
            None
        );
    }
}
