//! Modelo de User
//!
//! Usuarios del sistema con su rol. El motor de workflows recibe la
//! identidad ya verificada por la capa de autenticación externa; aquí
//! solo se consulta el perfil (departamento, nombre) y los destinatarios
//! de notificaciones por rol.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Employee,
    Manager,
    Transport,
    Admin,
}

impl UserRole {
    /// Roles que pueden cancelar viajes de otros usuarios
    pub fn can_cancel_any_trip(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Transport | UserRole::Manager)
    }

    /// Roles del personal de transporte (operan la flota: iniciar y
    /// completar viajes y trabajos de mantenimiento)
    pub fn is_transport_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Transport)
    }
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_roles() {
        assert!(UserRole::Admin.can_cancel_any_trip());
        assert!(UserRole::Transport.can_cancel_any_trip());
        assert!(UserRole::Manager.can_cancel_any_trip());
        assert!(!UserRole::Employee.can_cancel_any_trip());
    }

    #[test]
    fn test_transport_staff_roles() {
        assert!(UserRole::Transport.is_transport_staff());
        assert!(UserRole::Admin.is_transport_staff());
        assert!(!UserRole::Manager.is_transport_staff());
        assert!(!UserRole::Employee.is_transport_staff());
    }
}
