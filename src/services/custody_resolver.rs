//! Resolución de custodia
//!
//! Dado el intervalo de detección de un evento de daño, encuentra las ventanas
//! de custodia que lo intersectan y las ordena por responsabilidad probable.

use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::custody::CustodyWindow;
use crate::models::damage::{AttributionStatus, CustodyCandidate, DamageEvent};

/// `[start, end]` intersecta `[last_ok, damage]` si `start <= damage` y `end >= last_ok`.
/// Sin `last_ok` (menos infinito) basta con `start <= damage`.
pub fn intersects(
    window: &CustodyWindow,
    last_ok_time: Option<DateTime<Utc>>,
    damage_time: DateTime<Utc>,
) -> bool {
    window.start_time <= damage_time
        && last_ok_time.map_or(true, |last_ok| window.end_time >= last_ok)
}

/// Duración de la intersección, nunca negativa
pub fn overlap_duration(
    window: &CustodyWindow,
    last_ok_time: Option<DateTime<Utc>>,
    damage_time: DateTime<Utc>,
) -> Duration {
    let from = match last_ok_time {
        Some(last_ok) => window.start_time.max(last_ok),
        None => window.start_time,
    };
    let to = window.end_time.min(damage_time);
    (to - from).max(Duration::zero())
}

/// Comparador del ranking: solape desc, luego inicio de custodia asc, luego cliente asc
pub fn rank(a: &CustodyCandidate, b: &CustodyCandidate) -> Ordering {
    b.overlap
        .cmp(&a.overlap)
        .then_with(|| a.window.start_time.cmp(&b.window.start_time))
        .then_with(|| a.window.customer.cmp(&b.window.customer))
        .then_with(|| a.window.id.cmp(&b.window.id))
}

/// Candidatos de custodia para un evento, ya ordenados
pub fn resolve(event: &DamageEvent, windows: &[CustodyWindow]) -> Vec<CustodyCandidate> {
    let mut candidates: Vec<CustodyCandidate> = windows
        .iter()
        .filter(|window| intersects(window, event.last_ok_time, event.damage_time))
        .map(|window| {
            let overlap = overlap_duration(window, event.last_ok_time, event.damage_time);
            CustodyCandidate {
                window: window.clone(),
                overlap,
                boundary_only: overlap.is_zero(),
            }
        })
        .collect();

    candidates.sort_by(rank);
    candidates
}

/// Estado según el número de clientes distintos.
///
/// Las ventanas que sólo tocan el intervalo en un instante no cuentan mientras
/// haya alguna con solape positivo.
pub fn status_for(candidates: &[CustodyCandidate]) -> AttributionStatus {
    let with_overlap: BTreeSet<&str> = candidates
        .iter()
        .filter(|candidate| !candidate.boundary_only)
        .map(|candidate| candidate.window.customer.as_str())
        .collect();

    let customers = if with_overlap.is_empty() {
        candidates
            .iter()
            .map(|candidate| candidate.window.customer.as_str())
            .collect()
    } else {
        with_overlap
    };

    match customers.len() {
        0 => AttributionStatus::Unattributed,
        1 => AttributionStatus::Attributed,
        _ => AttributionStatus::Ambiguous,
    }
}
