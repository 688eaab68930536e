//! Verificador de disponibilidad
//!
//! Detección de conflictos por superposición de ventanas de tiempo.
//! Las ventanas son semiabiertas `[from, to)`: dos reservas espalda con
//! espalda (una termina exactamente cuando empieza la otra) NO chocan.
//!
//! La parte pura vive aquí; el escaneo de compromisos activos lo hace el
//! repositorio de viajes dentro de la misma transacción que la escritura
//! de asignación, para cerrar la carrera entre dos asignaciones
//! simultáneas del mismo recurso.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::trip::Commitment;

/// Tipo de recurso asignable a un viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Driver,
    Vehicle,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Driver => "driver",
            ResourceType::Vehicle => "vehicle",
        }
    }
}

/// Dos intervalos semiabiertos `[a_start, a_end)` y `[b_start, b_end)`
/// se superponen sii `a_start < b_end && a_end > b_start`.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Busca el primer compromiso existente que choque con la ventana
/// candidata, excluyendo el viaje que se está (re)asignando si aplica.
pub fn find_conflict<'a>(
    commitments: &'a [Commitment],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    exclude_trip_id: Option<Uuid>,
) -> Option<&'a Commitment> {
    commitments.iter().find(|c| {
        exclude_trip_id != Some(c.trip_id)
            && windows_overlap(c.from_time, c.to_time, window_start, window_end)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, h, m, 0).unwrap()
    }

    fn commitment(id: u128, from: DateTime<Utc>, to: DateTime<Utc>) -> Commitment {
        Commitment {
            trip_id: Uuid::from_u128(id),
            from_time: from,
            to_time: to,
        }
    }

    #[test]
    fn test_overlapping_windows_conflict() {
        // [10:00,12:00) vs [11:00,13:00)
        assert!(windows_overlap(at(10, 0), at(12, 0), at(11, 0), at(13, 0)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        assert!(windows_overlap(at(11, 0), at(13, 0), at(10, 0), at(12, 0)));
        assert_eq!(
            windows_overlap(at(9, 0), at(10, 0), at(10, 0), at(11, 0)),
            windows_overlap(at(10, 0), at(11, 0), at(9, 0), at(10, 0)),
        );
    }

    #[test]
    fn test_back_to_back_does_not_conflict() {
        // una termina a las 11:00 y la otra empieza a las 11:00
        assert!(!windows_overlap(at(9, 0), at(11, 0), at(11, 0), at(13, 0)));
        assert!(!windows_overlap(at(11, 0), at(13, 0), at(9, 0), at(11, 0)));
    }

    #[test]
    fn test_contained_window_conflicts() {
        assert!(windows_overlap(at(9, 0), at(17, 0), at(10, 0), at(11, 0)));
        assert!(windows_overlap(at(10, 0), at(11, 0), at(9, 0), at(17, 0)));
    }

    #[test]
    fn test_find_conflict_scans_commitments() {
        let commitments = vec![
            commitment(1, at(6, 0), at(8, 0)),
            commitment(2, at(10, 0), at(12, 0)),
        ];
        let hit = find_conflict(&commitments, at(11, 0), at(13, 0), None);
        assert_eq!(hit.map(|c| c.trip_id), Some(Uuid::from_u128(2)));
        assert!(find_conflict(&commitments, at(8, 0), at(10, 0), None).is_none());
    }

    #[test]
    fn test_find_conflict_excludes_own_trip() {
        let commitments = vec![commitment(7, at(10, 0), at(12, 0))];
        // reasignación: el viaje no choca consigo mismo
        assert!(find_conflict(&commitments, at(10, 0), at(12, 0), Some(Uuid::from_u128(7))).is_none());
        assert!(find_conflict(&commitments, at(10, 0), at(12, 0), None).is_some());
    }
}
