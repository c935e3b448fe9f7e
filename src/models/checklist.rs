//! Checklist de inspección
//!
//! Definición estática de secciones y campos que todo reporte de inspección
//! debe cubrir. Un campo se identifica por `(sección, campo)`: varios nombres
//! ("Damage", "Reflective tape"...) se repiten entre secciones.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::utils::errors::{bad_request_error, AppError, AppResult};

/// Sección del checklist con sus campos en orden de presentación
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChecklistSection {
    pub section: &'static str,
    pub fields: &'static [&'static str],
}

/// Checklist completo del trailer, en el orden del formulario de inspección
pub const CHECKLIST: &[ChecklistSection] = &[
    ChecklistSection {
        section: "Front of Trailer",
        fields: &["Damage", "King pin", "Gladhands", "7-way connector", "Registration holder"],
    },
    ChecklistSection {
        section: "Rear Lights",
        fields: &["Tail", "Brake", "Marker", "Left turn", "Right turn"],
    },
    ChecklistSection {
        section: "Trailer Rear",
        fields: &[
            "Damage",
            "Mud flaps",
            "Door latch",
            "Door hinges",
            "License plate",
            "Reflective tape",
            "Rear Impact Guard",
        ],
    },
    ChecklistSection {
        section: "Left Side of Trailer",
        fields: &["Damage", "Reflective tape", "Marker / turn light"],
    },
    ChecklistSection {
        section: "Right Side of Trailer",
        fields: &["Damage", "Reflective tape", "Marker / turn light"],
    },
    ChecklistSection {
        section: "Trailer Interior",
        fields: &["Walls", "Damage", "Flooring", "Interior roof", "Tie down & Tracks"],
    },
    ChecklistSection {
        section: "Under Carriage",
        fields: &["Damage", "Landing gear", "Air lines and Wiring", "Crossmembers and Substructures"],
    },
    ChecklistSection {
        section: "Left Side Wheels and Tires",
        fields: &[
            "Wheel / Rims",
            "Tread Condition",
            "Hub caps / Seals",
            "Condition of tires",
            "Tires are Goodyear G316",
        ],
    },
    ChecklistSection {
        section: "Right Side Wheels and Tires",
        fields: &[
            "Hub odometer",
            "Wheel / Rims",
            "Tread Condition",
            "Hub caps / Seals",
            "Condition of tires",
            "Tires are Goodyear G316",
        ],
    },
];

/// Identidad de un campo del checklist
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    pub section: String,
    pub field: String,
}

impl FieldKey {
    pub fn new(section: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            field: field.into(),
        }
    }

    /// Etiqueta legible, p. ej. "Rear Lights → Tail"
    pub fn label(&self) -> String {
        format!("{} → {}", self.section, self.field)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.section, self.field)
    }
}

/// Estado observado de cada campo: `true` = sin daño
pub type FieldStates = BTreeMap<FieldKey, bool>;

/// Campo tal como llega en una submission, antes de normalizar.
/// `value == None` significa que el valor no era un booleano (estado desconocido).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedField {
    pub key: FieldKey,
    pub value: Option<bool>,
}

impl ReportedField {
    pub fn new(section: &str, field: &str, value: Option<bool>) -> Self {
        Self {
            key: FieldKey::new(section.trim(), field.trim()),
            value,
        }
    }
}

lazy_static! {
    /// Posición de cada campo en el orden del checklist
    static ref FIELD_POSITIONS: HashMap<FieldKey, usize> = CHECKLIST
        .iter()
        .flat_map(|section| {
            section
                .fields
                .iter()
                .map(move |field| FieldKey::new(section.section, *field))
        })
        .enumerate()
        .map(|(position, key)| (key, position))
        .collect();
}

/// Mapeo ordenado sección → campos
pub fn fields() -> &'static [ChecklistSection] {
    CHECKLIST
}

/// Todas las claves del checklist en orden
pub fn field_keys() -> impl Iterator<Item = FieldKey> {
    CHECKLIST.iter().flat_map(|section| {
        section
            .fields
            .iter()
            .map(move |field| FieldKey::new(section.section, *field))
    })
}

pub fn field_count() -> usize {
    FIELD_POSITIONS.len()
}

/// Posición del campo en el checklist, `None` si no pertenece al schema
pub fn position(key: &FieldKey) -> Option<usize> {
    FIELD_POSITIONS.get(key).copied()
}

/// Valida que el reporte cubra exactamente los campos del checklist, cada uno
/// con un booleano definido, y devuelve los estados normalizados.
pub fn validate(reported: &[ReportedField]) -> AppResult<FieldStates> {
    let mut states = FieldStates::new();
    let mut undefined = BTreeSet::new();
    let mut seen = BTreeSet::new();

    for entry in reported {
        if !seen.insert(entry.key.clone()) {
            let previous = states.get(&entry.key).copied();
            if previous.is_some() && previous != entry.value {
                return Err(bad_request_error(&format!(
                    "Field '{}' reported twice with conflicting values",
                    entry.key
                )));
            }
            continue;
        }
        match entry.value {
            Some(ok) => {
                states.insert(entry.key.clone(), ok);
            }
            None => {
                undefined.insert(entry.key.clone());
            }
        }
    }

    let missing: Vec<String> = field_keys()
        .filter(|key| !seen.contains(key))
        .map(|key| key.label())
        .collect();
    let unexpected: Vec<String> = seen
        .iter()
        .filter(|key| position(key).is_none())
        .map(|key| key.label())
        .collect();
    let undefined: Vec<String> = undefined
        .iter()
        .filter(|key| position(key).is_some())
        .map(|key| key.label())
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() || !undefined.is_empty() {
        return Err(AppError::SchemaViolation {
            missing,
            unexpected,
            undefined,
        });
    }

    Ok(states)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Reporte completo con todos los campos OK excepto los indicados
    pub(crate) fn reported_with_damage(damaged: &[(&str, &str)]) -> Vec<ReportedField> {
        field_keys()
            .map(|key| {
                let ok = !damaged
                    .iter()
                    .any(|(section, field)| key.section == *section && key.field == *field);
                ReportedField {
                    key,
                    value: Some(ok),
                }
            })
            .collect()
    }

    #[test]
    fn test_schema_shape() {
        let declared: usize = CHECKLIST.iter().map(|section| section.fields.len()).sum();
        assert_eq!(fields().len(), 9);
        assert_eq!(declared, 43);
        assert_eq!(field_count(), declared);
        assert_eq!(field_keys().count(), declared);
        assert_eq!(position(&FieldKey::new("Front of Trailer", "Damage")), Some(0));
        assert_eq!(position(&FieldKey::new("Rear Lights", "Tail")), Some(5));
        assert_eq!(position(&FieldKey::new("Rear Lights", "Damage")), None);
    }

    #[test]
    fn test_validate_complete_report() {
        let states = validate(&reported_with_damage(&[("Rear Lights", "Tail")])).unwrap();
        assert_eq!(states.len(), field_count());
        assert_eq!(states.get(&FieldKey::new("Rear Lights", "Tail")), Some(&false));
        assert_eq!(states.get(&FieldKey::new("Rear Lights", "Brake")), Some(&true));
    }

    #[test]
    fn test_validate_missing_field() {
        let mut reported = reported_with_damage(&[]);
        reported.retain(|entry| entry.key != FieldKey::new("Trailer Rear", "Mud flaps"));

        match validate(&reported) {
            Err(AppError::SchemaViolation { missing, unexpected, .. }) => {
                assert_eq!(missing, vec!["Trailer Rear → Mud flaps".to_string()]);
                assert!(unexpected.is_empty());
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_extra_field() {
        let mut reported = reported_with_damage(&[]);
        reported.push(ReportedField::new("Rear Lights", "Fog lamp", Some(true)));

        match validate(&reported) {
            Err(AppError::SchemaViolation { missing, unexpected, .. }) => {
                assert!(missing.is_empty());
                assert_eq!(unexpected, vec!["Rear Lights → Fog lamp".to_string()]);
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_undefined_value_is_not_assumed_ok() {
        let mut reported = reported_with_damage(&[]);
        reported[3].value = None;

        match validate(&reported) {
            Err(AppError::SchemaViolation { undefined, .. }) => {
                assert_eq!(undefined, vec![reported[3].key.label()]);
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_conflicting_duplicate() {
        let mut reported = reported_with_damage(&[]);
        reported.push(ReportedField::new("Rear Lights", "Tail", Some(false)));
        assert!(matches!(validate(&reported), Err(AppError::BadRequest(_))));

        let mut reported = reported_with_damage(&[]);
        reported.push(ReportedField::new(" Rear Lights ", "Tail", Some(true)));
        assert!(validate(&reported).is_ok());
    }
}
