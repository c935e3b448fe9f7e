//! Ensamblado del análisis por VIN
//!
//! Combina los eventos del detector con la resolución de custodia de cada uno.

use tracing::info;

use crate::models::custody::CustodyWindow;
use crate::models::damage::AttributionResult;
use crate::models::inspection::InspectionReport;
use crate::services::custody_resolver::{resolve, status_for};
use crate::services::damage_detector::detect_damage_events;

/// Análisis completo de un VIN. Los campos sin daño detectado no aparecen.
pub fn assemble(
    vin: &str,
    reports: &[InspectionReport],
    windows: &[CustodyWindow],
) -> Vec<AttributionResult> {
    let events = detect_damage_events(vin, reports);
    if events.is_empty() {
        return Vec::new();
    }

    let mut movements = windows.to_vec();
    movements.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

    let results: Vec<AttributionResult> = events
        .into_iter()
        .map(|event| {
            let candidates = resolve(&event, windows);
            let status = status_for(&candidates);
            AttributionResult {
                event,
                status,
                candidates,
                movements: movements.clone(),
            }
        })
        .collect();

    info!(
        "📊 VIN {}: {} eventos de daño, {} ventanas de custodia",
        vin,
        results.len(),
        movements.len()
    );
    results
}
