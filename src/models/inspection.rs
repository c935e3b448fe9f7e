//! Modelo de InspectionReport
//!
//! Snapshot inmutable del estado de cada campo del checklist para un trailer
//! en un instante dado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::checklist::{self, FieldKey, FieldStates};

/// Estados agrupados sección → campo → ok, forma persistida en JSONB
pub type NestedFieldStates = BTreeMap<String, BTreeMap<String, bool>>;

/// Inspección validada, lista para anexar al historial
#[derive(Debug, Clone, PartialEq)]
pub struct NewInspection {
    pub vin: String,
    pub created_time: DateTime<Utc>,
    pub field_states: FieldStates,
}

/// Inspección almacenada. `id` refleja el orden de ingesta y desempata timestamps iguales.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionReport {
    pub id: i64,
    pub vin: String,
    pub created_time: DateTime<Utc>,
    pub field_states: FieldStates,
}

impl NewInspection {
    pub fn has_damage(&self) -> bool {
        self.field_states.values().any(|ok| !ok)
    }

    /// Campos reportados con daño, en orden del checklist
    pub fn damaged_parts(&self) -> Vec<FieldKey> {
        damaged_parts(&self.field_states)
    }

    pub fn into_report(self, id: i64) -> InspectionReport {
        InspectionReport {
            id,
            vin: self.vin,
            created_time: self.created_time,
            field_states: self.field_states,
        }
    }
}

impl InspectionReport {
    /// Estado del campo en este reporte; `None` si no fue observado
    pub fn state_of(&self, key: &FieldKey) -> Option<bool> {
        self.field_states.get(key).copied()
    }
}

fn damaged_parts(states: &FieldStates) -> Vec<FieldKey> {
    let mut damaged: Vec<FieldKey> = states
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(key, _)| key.clone())
        .collect();
    damaged.sort_by_key(|key| checklist::position(key).unwrap_or(usize::MAX));
    damaged
}

pub fn to_nested(states: &FieldStates) -> NestedFieldStates {
    let mut nested = NestedFieldStates::new();
    for (key, ok) in states {
        nested
            .entry(key.section.clone())
            .or_default()
            .insert(key.field.clone(), *ok);
    }
    nested
}

pub fn from_nested(nested: NestedFieldStates) -> FieldStates {
    nested
        .into_iter()
        .flat_map(|(section, fields)| {
            fields
                .into_iter()
                .map(move |(field, ok)| (FieldKey::new(section.clone(), field), ok))
        })
        .collect()
}

/// Resumen de una inspección recién aceptada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionReceipt {
    pub has_damage: bool,
    pub damaged_parts: Vec<String>,
}

impl From<&NewInspection> for InspectionReceipt {
    fn from(inspection: &NewInspection) -> Self {
        Self {
            has_damage: inspection.has_damage(),
            damaged_parts: inspection
                .damaged_parts()
                .iter()
                .map(FieldKey::label)
                .collect(),
        }
    }
}
