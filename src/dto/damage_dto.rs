use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::checklist::ReportedField;
use crate::models::custody::CustodyWindow;
use crate::models::damage::{AttributionResult, AttributionStatus, CustodyCandidate};
use crate::models::inspection::InspectionReceipt;
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::validation::validate_not_empty;

// Request para registrar una inspección
#[derive(Debug, Deserialize, Validate)]
pub struct AddInspectionRequest {
    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub vin: String,
    #[serde(default)]
    pub created_time: String,
    /// `{ "formData": [ { "<sección>": { "fields": { "<campo>": { "value": bool } } } } ] }`
    /// o la forma plana `{ "<sección>": { "<campo>": bool } }`
    #[serde(default)]
    pub data: Value,
}

// Request para registrar un movimiento (ventana de custodia)
#[derive(Debug, Deserialize, Validate)]
pub struct AddLocationRequest {
    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub vin: String,
    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub customer: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub end_location: String,
}

// Query de análisis: `detected_at` limita el resultado a eventos detectados en ese instante
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub detected_at: Option<String>,
}

// Request de análisis para varios VIN
#[derive(Debug, Deserialize, Validate)]
pub struct BatchAnalyzeRequest {
    #[validate(length(min = 1, max = 100))]
    pub vins: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InspectionSubmittedResponse {
    pub status: &'static str,
    pub has_damage: bool,
    pub damaged_parts: Vec<String>,
}

impl From<InspectionReceipt> for InspectionSubmittedResponse {
    fn from(receipt: InspectionReceipt) -> Self {
        Self {
            status: "success",
            has_damage: receipt.has_damage,
            damaged_parts: receipt.damaged_parts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationSubmittedResponse {
    pub status: &'static str,
}

// Movimiento tal como se muestra en el análisis
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MovementResponse {
    pub customer: String,
    pub start_time: String,
    pub end_time: String,
    pub start_location: String,
    pub end_location: String,
}

impl From<&CustodyWindow> for MovementResponse {
    fn from(window: &CustodyWindow) -> Self {
        Self {
            customer: window.customer.clone(),
            start_time: window.start_time.to_rfc3339(),
            end_time: window.end_time.to_rfc3339(),
            start_location: window.start_location.clone(),
            end_location: window.end_location.clone(),
        }
    }
}

// Cliente candidato con su solape
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomerAttributionResponse {
    pub customer: String,
    pub overlap_seconds: i64,
    pub start_time: String,
    pub end_time: String,
    pub start_location: String,
    pub end_location: String,
    pub boundary_only: bool,
}

impl From<&CustodyCandidate> for CustomerAttributionResponse {
    fn from(candidate: &CustodyCandidate) -> Self {
        Self {
            customer: candidate.window.customer.clone(),
            overlap_seconds: candidate.overlap.num_seconds(),
            start_time: candidate.window.start_time.to_rfc3339(),
            end_time: candidate.window.end_time.to_rfc3339(),
            start_location: candidate.window.start_location.clone(),
            end_location: candidate.window.end_location.clone(),
            boundary_only: candidate.boundary_only,
        }
    }
}

// Response de análisis, uno por evento de daño
#[derive(Debug, Serialize, Deserialize)]
pub struct AttributionResponse {
    pub section: String,
    pub field: String,
    pub damaged_part: String,
    pub damage_time: String,
    /// `null` cuando el daño es anterior al historial
    pub last_ok_time: Option<String>,
    pub origin_unknown: bool,
    pub status: AttributionStatus,
    pub attributed_customer: Option<String>,
    pub customers: Vec<CustomerAttributionResponse>,
    pub movements: Vec<MovementResponse>,
}

impl From<&AttributionResult> for AttributionResponse {
    fn from(result: &AttributionResult) -> Self {
        Self {
            section: result.event.field.section.clone(),
            field: result.event.field.field.clone(),
            damaged_part: result.event.field.label(),
            damage_time: result.event.damage_time.to_rfc3339(),
            last_ok_time: result.event.last_ok_time.map(|t| t.to_rfc3339()),
            origin_unknown: result.origin_unknown(),
            status: result.status,
            attributed_customer: result.attributed_customer().map(str::to_string),
            customers: result.candidates.iter().map(Into::into).collect(),
            movements: result.movements.iter().map(Into::into).collect(),
        }
    }
}

/// Extrae los campos reportados del payload de inspección
pub fn reported_fields(data: &Value) -> AppResult<Vec<ReportedField>> {
    let mut reported = Vec::new();

    match data {
        Value::Object(map) if map.contains_key("formData") => {
            let sections = map
                .get("formData")
                .and_then(Value::as_array)
                .ok_or_else(|| bad_request_error("'formData' must be an array of sections"))?;

            for entry in sections {
                let entry = entry
                    .as_object()
                    .ok_or_else(|| bad_request_error("Each 'formData' entry must be an object"))?;
                for (section, section_data) in entry {
                    collect_section(section, section_data, &mut reported)?;
                }
            }
        }
        Value::Object(map) => {
            for (section, section_data) in map {
                collect_section(section, section_data, &mut reported)?;
            }
        }
        _ => return Err(bad_request_error("'data' must be an object with the inspection checklist")),
    }

    Ok(reported)
}

fn collect_section(section: &str, section_data: &Value, reported: &mut Vec<ReportedField>) -> AppResult<()> {
    let fields = section_data
        .get("fields")
        .unwrap_or(section_data)
        .as_object()
        .ok_or_else(|| bad_request_error(&format!("Section '{}' must contain an object of fields", section)))?;

    for (field, value) in fields {
        let state = match value {
            Value::Bool(ok) => Some(*ok),
            Value::Object(inner) => inner.get("value").and_then(Value::as_bool),
            _ => None,
        };
        reported.push(ReportedField::new(section, field, state));
    }
    Ok(())
}
