//! Detector de transiciones de daño
//!
//! Recorre el historial de inspecciones de un VIN campo por campo y emite un
//! `DamageEvent` por cada racha de reportes dañados que sigue a un estado ok
//! (o al inicio del historial).

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::checklist::{self, FieldKey};
use crate::models::damage::DamageEvent;
use crate::models::inspection::InspectionReport;

/// Estado del escaneo de un campo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldScan {
    /// Aún no hay reportes para el campo
    Unobserved,
    /// Último reporte ok, con su timestamp
    Ok(DateTime<Utc>),
    /// Dentro de una racha dañada cuyo evento ya fue emitido
    Damaged,
}

impl FieldScan {
    /// Avanza la máquina de estados. Devuelve `Some(last_ok)` al abrir una racha dañada.
    fn observe(self, ok: bool, at: DateTime<Utc>) -> (FieldScan, Option<Option<DateTime<Utc>>>) {
        match (self, ok) {
            (_, true) => (FieldScan::Ok(at), None),
            (FieldScan::Unobserved, false) => (FieldScan::Damaged, Some(None)),
            (FieldScan::Ok(last_ok), false) => (FieldScan::Damaged, Some(Some(last_ok))),
            (FieldScan::Damaged, false) => (FieldScan::Damaged, None),
        }
    }
}

/// Detecta los eventos de daño de un campo sobre reportes ya ordenados
fn detect_field(vin: &str, field: &FieldKey, reports: &[&InspectionReport]) -> Vec<DamageEvent> {
    let mut state = FieldScan::Unobserved;
    let mut events = Vec::new();

    for report in reports {
        let Some(ok) = report.state_of(field) else {
            debug!("Reporte {} sin estado para '{}', se ignora", report.id, field);
            continue;
        };

        let (next, opened) = state.observe(ok, report.created_time);
        if let Some(last_ok_time) = opened {
            events.push(DamageEvent {
                vin: vin.to_string(),
                field: field.clone(),
                last_ok_time,
                damage_time: report.created_time,
            });
        }
        state = next;
    }

    events
}

/// Detecta todas las transiciones ok → dañado del historial de un VIN.
///
/// Los reportes se ordenan por timestamp de forma estable, así que los empates
/// conservan el orden de ingesta recibido del store. Los eventos resultantes
/// quedan ordenados por momento de detección y luego por orden del checklist.
pub fn detect_damage_events(vin: &str, reports: &[InspectionReport]) -> Vec<DamageEvent> {
    if reports.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&InspectionReport> = reports.iter().collect();
    ordered.sort_by_key(|report| report.created_time);

    let mut events: Vec<DamageEvent> = checklist::field_keys()
        .flat_map(|field| detect_field(vin, &field, &ordered))
        .collect();

    events.sort_by_key(|event| {
        (
            event.damage_time,
            checklist::position(&event.field).unwrap_or(usize::MAX),
        )
    });

    debug!("🔍 {} eventos de daño detectados para VIN {}", events.len(), vin);
    events
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    /// Reporte con todos los campos ok excepto los indicados
    pub(crate) fn report(id: i64, hour: u32, damaged: &[(&str, &str)]) -> InspectionReport {
        let field_states = checklist::field_keys()
            .map(|key| {
                let ok = !damaged
                    .iter()
                    .any(|(section, field)| key.section == *section && key.field == *field);
                (key, ok)
            })
            .collect();
        InspectionReport {
            id,
            vin: "T100".to_string(),
            created_time: at(hour),
            field_states,
        }
    }

    const TAIL: (&str, &str) = ("Rear Lights", "Tail");
    const KING_PIN: (&str, &str) = ("Front of Trailer", "King pin");

    #[test]
    fn test_no_reports_no_events() {
        assert!(detect_damage_events("T100", &[]).is_empty());
    }

    #[test]
    fn test_fields_that_stay_ok_emit_nothing() {
        let reports = vec![report(1, 1, &[]), report(2, 2, &[]), report(3, 3, &[])];
        assert!(detect_damage_events("T100", &reports).is_empty());
    }

    #[test]
    fn test_consecutive_damaged_reports_emit_once() {
        let reports = vec![
            report(1, 1, &[]),
            report(2, 2, &[TAIL]),
            report(3, 3, &[TAIL]),
            report(4, 4, &[TAIL]),
        ];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field, FieldKey::new("Rear Lights", "Tail"));
        assert_eq!(events[0].last_ok_time, Some(at(1)));
        assert_eq!(events[0].damage_time, at(2));
        assert!(!events[0].origin_unknown());
    }

    #[test]
    fn test_damage_in_first_report_has_unknown_origin() {
        let reports = vec![report(1, 1, &[TAIL]), report(2, 2, &[TAIL])];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].last_ok_time, None);
        assert_eq!(events[0].damage_time, at(1));
        assert!(events[0].origin_unknown());
    }

    #[test]
    fn test_repair_then_new_damage_opens_second_run() {
        let reports = vec![
            report(1, 1, &[]),
            report(2, 2, &[TAIL]),
            report(3, 3, &[]),
            report(4, 4, &[]),
            report(5, 5, &[TAIL]),
        ];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].last_ok_time, events[0].damage_time), (Some(at(1)), at(2)));
        assert_eq!((events[1].last_ok_time, events[1].damage_time), (Some(at(4)), at(5)));
    }

    #[test]
    fn test_fields_are_independent() {
        let reports = vec![
            report(1, 1, &[]),
            report(2, 2, &[TAIL]),
            report(3, 3, &[TAIL, KING_PIN]),
        ];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].field, FieldKey::new("Rear Lights", "Tail"));
        assert_eq!(events[0].last_ok_time, Some(at(1)));
        assert_eq!(events[1].field, FieldKey::new("Front of Trailer", "King pin"));
        assert_eq!(events[1].last_ok_time, Some(at(2)));
        assert_eq!(events[1].damage_time, at(3));
    }

    #[test]
    fn test_simultaneous_damage_ordered_by_checklist() {
        let reports = vec![report(1, 1, &[]), report(2, 2, &[TAIL, KING_PIN])];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].field, FieldKey::new("Front of Trailer", "King pin"));
        assert_eq!(events[1].field, FieldKey::new("Rear Lights", "Tail"));
    }

    #[test]
    fn test_unordered_input_is_sorted_by_time() {
        let reports = vec![report(2, 3, &[TAIL]), report(1, 1, &[])];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].last_ok_time, Some(at(1)));
        assert_eq!(events[0].damage_time, at(3));
    }

    #[test]
    fn test_equal_timestamps_follow_ingestion_order() {
        let reports = vec![report(1, 2, &[]), report(2, 2, &[TAIL])];

        let events = detect_damage_events("T100", &reports);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].last_ok_time, Some(at(2)));
        assert_eq!(events[0].damage_time, at(2));
    }

    #[test]
    fn test_interval_never_inverted() {
        let reports = vec![
            report(1, 1, &[TAIL]),
            report(2, 2, &[]),
            report(3, 3, &[TAIL, KING_PIN]),
            report(4, 4, &[]),
            report(5, 6, &[KING_PIN]),
        ];

        for event in detect_damage_events("T100", &reports) {
            if let Some(last_ok) = event.last_ok_time {
                assert!(last_ok <= event.damage_time);
            }
        }
    }
}
