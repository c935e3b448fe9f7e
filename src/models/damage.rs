//! Modelos derivados del análisis de daños
//!
//! Nada de este módulo se persiste: se recalcula en cada análisis a partir
//! de los historiales de inspecciones y custodia.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::checklist::FieldKey;
use super::custody::CustodyWindow;

/// Transición ok → dañado de un campo del checklist.
///
/// El intervalo de detección es `[last_ok_time, damage_time]`. `last_ok_time == None`
/// representa menos infinito: el campo ya aparecía dañado en el primer reporte
/// conocido y el daño es anterior al historial registrado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageEvent {
    pub vin: String,
    pub field: FieldKey,
    pub last_ok_time: Option<DateTime<Utc>>,
    pub damage_time: DateTime<Utc>,
}

impl DamageEvent {
    pub fn origin_unknown(&self) -> bool {
        self.last_ok_time.is_none()
    }
}

/// Estado de atribución de un evento de daño
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionStatus {
    /// Ninguna ventana de custodia solapa el intervalo
    Unattributed,
    /// Exactamente un cliente solapa el intervalo
    Attributed,
    /// Varios clientes solapan el intervalo, ordenados por solape
    Ambiguous,
}

/// Ventana de custodia candidata para un evento, con su duración de solape
#[derive(Debug, Clone, PartialEq)]
pub struct CustodyCandidate {
    pub window: CustodyWindow,
    pub overlap: Duration,
    /// El solape es de duración cero (la ventana sólo toca el intervalo en un instante)
    pub boundary_only: bool,
}

/// Resultado de atribución de un evento de daño
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionResult {
    pub event: DamageEvent,
    pub status: AttributionStatus,
    /// Candidatos ordenados por solape desc, inicio asc, cliente asc
    pub candidates: Vec<CustodyCandidate>,
    /// Todas las ventanas de custodia del VIN, para contexto
    pub movements: Vec<CustodyWindow>,
}

impl AttributionResult {
    pub fn origin_unknown(&self) -> bool {
        self.event.origin_unknown()
    }

    /// Cliente asignado cuando la atribución es única
    pub fn attributed_customer(&self) -> Option<&str> {
        match self.status {
            AttributionStatus::Attributed => self
                .candidates
                .iter()
                .find(|candidate| !candidate.boundary_only)
                .or_else(|| self.candidates.first())
                .map(|candidate| candidate.window.customer.as_str()),
            _ => None,
        }
    }
}
