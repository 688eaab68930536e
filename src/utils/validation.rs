//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! compartidas por los DTOs y los servicios de workflow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::ValidationError;

/// Envolver un ValidationError suelto en el contenedor de errores que
/// espera `AppError::Validation`
pub fn single_error(field: &'static str, error: ValidationError) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);
    errors
}

/// Validar que una ventana de tiempo esté bien formada:
/// el fin debe ser estrictamente posterior al inicio.
pub fn validate_time_window(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), ValidationError> {
    if to <= from {
        let mut error = ValidationError::new("time_window");
        error.add_param("from_time".into(), &from.to_rfc3339());
        error.add_param("to_time".into(), &to.to_rfc3339());
        return Err(error);
    }
    Ok(())
}

/// Validar que un monto monetario no sea negativo
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("amount".into(), &amount.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_window_rejects_zero_length() {
        let t = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert!(validate_time_window(t, t).is_err());
    }

    #[test]
    fn test_time_window_rejects_inverted() {
        let from = Utc.with_ymd_and_hms(2024, 1, 10, 11, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert!(validate_time_window(from, to).is_err());
    }

    #[test]
    fn test_time_window_accepts_valid() {
        let from = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 10, 11, 0, 0).unwrap();
        assert!(validate_time_window(from, to).is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(validate_non_negative_amount(&Decimal::from(-1)).is_err());
        assert!(validate_non_negative_amount(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(&Decimal::from(500)).is_ok());
    }
}
