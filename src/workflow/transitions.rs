//! Tablas de transición de estados
//!
//! Una tabla estática por workflow (Trip, TADA, Maintenance): de cada
//! estado, el conjunto de estados alcanzables en un paso. Los estados
//! terminales mapean al conjunto vacío. Esta tabla es la única fuente de
//! verdad sobre legalidad: los servicios deben consultarla antes de
//! persistir cualquier cambio de estado y rechazar (no ajustar en
//! silencio) las transiciones ilegales.

use crate::models::maintenance::MaintenanceStatus;
use crate::models::tada::TadaStatus;
use crate::models::trip::TripStatus;
use crate::utils::errors::AppError;

/// Estado de un workflow con su tabla de transiciones como dato
pub trait WorkflowStatus: Copy + PartialEq + Sized + 'static {
    /// Nombre del workflow, para mensajes de error
    const WORKFLOW: &'static str;

    /// Estados alcanzables en un paso desde `self`
    fn allowed_next(&self) -> &'static [Self];

    /// Etiqueta estable del estado
    fn label(&self) -> &'static str;

    fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    fn is_valid_transition(&self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }
}

/// Valida una transición contra la tabla del workflow correspondiente.
/// Devuelve `StateConflict` si no es legal; los servicios la invocan
/// antes de cada escritura de estado.
pub fn ensure_transition<S: WorkflowStatus>(current: S, next: S) -> Result<(), AppError> {
    if current.is_valid_transition(next) {
        Ok(())
    } else {
        Err(AppError::StateConflict(format!(
            "{} workflow: illegal transition {} -> {}",
            S::WORKFLOW,
            current.label(),
            next.label()
        )))
    }
}

impl WorkflowStatus for TripStatus {
    const WORKFLOW: &'static str = "trip";

    fn allowed_next(&self) -> &'static [TripStatus] {
        match self {
            TripStatus::Requested => &[
                TripStatus::ManagerApproved,
                TripStatus::ManagerRejected,
                TripStatus::Cancelled,
            ],
            TripStatus::ManagerApproved => {
                &[TripStatus::TransportAssigned, TripStatus::Cancelled]
            }
            TripStatus::ManagerRejected => &[TripStatus::Cancelled],
            TripStatus::TransportAssigned => &[TripStatus::InProgress, TripStatus::Cancelled],
            TripStatus::InProgress => &[TripStatus::Completed, TripStatus::Cancelled],
            TripStatus::Completed => &[],
            TripStatus::Cancelled => &[],
        }
    }

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl WorkflowStatus for TadaStatus {
    const WORKFLOW: &'static str = "tada";

    fn allowed_next(&self) -> &'static [TadaStatus] {
        match self {
            TadaStatus::Pending => &[TadaStatus::Approved, TadaStatus::Rejected],
            TadaStatus::Approved => &[],
            TadaStatus::Rejected => &[],
        }
    }

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl WorkflowStatus for MaintenanceStatus {
    const WORKFLOW: &'static str = "maintenance";

    fn allowed_next(&self) -> &'static [MaintenanceStatus] {
        match self {
            MaintenanceStatus::Requested => {
                &[MaintenanceStatus::Approved, MaintenanceStatus::Rejected]
            }
            MaintenanceStatus::Approved => {
                &[MaintenanceStatus::InProgress, MaintenanceStatus::Rejected]
            }
            MaintenanceStatus::InProgress => &[MaintenanceStatus::Completed],
            MaintenanceStatus::Rejected => &[],
            MaintenanceStatus::Completed => &[],
        }
    }

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TRIP: [TripStatus; 7] = [
        TripStatus::Requested,
        TripStatus::ManagerApproved,
        TripStatus::ManagerRejected,
        TripStatus::TransportAssigned,
        TripStatus::InProgress,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    #[test]
    fn test_no_self_transitions() {
        for s in ALL_TRIP {
            assert!(!s.is_valid_transition(s), "self transition on {}", s.as_str());
        }
        assert!(!TadaStatus::Pending.is_valid_transition(TadaStatus::Pending));
        assert!(!MaintenanceStatus::Requested.is_valid_transition(MaintenanceStatus::Requested));
    }

    #[test]
    fn test_trip_terminal_states_empty() {
        assert!(TripStatus::Completed.is_terminal());
        assert!(TripStatus::Cancelled.is_terminal());
        for s in ALL_TRIP {
            if !matches!(s, TripStatus::Completed | TripStatus::Cancelled) {
                assert!(!s.is_terminal(), "{} should not be terminal", s.as_str());
            }
        }
    }

    #[test]
    fn test_trip_happy_path() {
        assert!(TripStatus::Requested.is_valid_transition(TripStatus::ManagerApproved));
        assert!(TripStatus::ManagerApproved.is_valid_transition(TripStatus::TransportAssigned));
        assert!(TripStatus::TransportAssigned.is_valid_transition(TripStatus::InProgress));
        assert!(TripStatus::InProgress.is_valid_transition(TripStatus::Completed));
    }

    #[test]
    fn test_trip_illegal_jumps() {
        assert!(!TripStatus::Requested.is_valid_transition(TripStatus::InProgress));
        assert!(!TripStatus::Requested.is_valid_transition(TripStatus::TransportAssigned));
        assert!(!TripStatus::ManagerRejected.is_valid_transition(TripStatus::ManagerApproved));
        assert!(!TripStatus::Completed.is_valid_transition(TripStatus::Cancelled));
    }

    #[test]
    fn test_rejected_trip_still_cancellable() {
        assert!(TripStatus::ManagerRejected.is_valid_transition(TripStatus::Cancelled));
    }

    #[test]
    fn test_tada_table() {
        assert!(TadaStatus::Pending.is_valid_transition(TadaStatus::Approved));
        assert!(TadaStatus::Pending.is_valid_transition(TadaStatus::Rejected));
        assert!(TadaStatus::Approved.is_terminal());
        assert!(TadaStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_maintenance_table() {
        assert!(MaintenanceStatus::Requested.is_valid_transition(MaintenanceStatus::Approved));
        assert!(MaintenanceStatus::Approved.is_valid_transition(MaintenanceStatus::InProgress));
        assert!(MaintenanceStatus::Approved.is_valid_transition(MaintenanceStatus::Rejected));
        assert!(MaintenanceStatus::InProgress.is_valid_transition(MaintenanceStatus::Completed));
        assert!(MaintenanceStatus::Rejected.is_terminal());
        assert!(MaintenanceStatus::Completed.is_terminal());
        assert!(!MaintenanceStatus::Completed.is_valid_transition(MaintenanceStatus::InProgress));
    }

    #[test]
    fn test_ensure_transition_error_kind() {
        let err = ensure_transition(TripStatus::Completed, TripStatus::Cancelled).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
        assert!(ensure_transition(TripStatus::Requested, TripStatus::ManagerApproved).is_ok());
    }
}
