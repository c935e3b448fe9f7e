//! Validación de submissions
//!
//! Normaliza y valida inspecciones y movimientos antes de que lleguen a los
//! stores. Una submission rechazada nunca se anexa parcialmente.

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::dto::damage_dto::{reported_fields, AddInspectionRequest, AddLocationRequest};
use crate::models::checklist;
use crate::models::custody::NewCustodyWindow;
use crate::models::inspection::NewInspection;
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::validate_datetime;

fn parse_timestamp(field: &'static str, value: &str) -> AppResult<DateTime<Utc>> {
    validate_datetime(value).map_err(|mut error| {
        error.message = Some(format!("'{}' is not a valid timestamp", value).into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::Validation(errors)
    })
}

/// Falla con error de validación si el VIN está vacío, el timestamp no se puede
/// interpretar o el reporte no cubre exactamente el checklist.
pub fn validate_inspection_submission(request: &AddInspectionRequest) -> AppResult<NewInspection> {
    request.validate()?;

    let created_time = parse_timestamp("created_time", &request.created_time)?;
    let reported = reported_fields(&request.data)?;
    let field_states = checklist::validate(&reported)?;

    Ok(NewInspection {
        vin: request.vin.trim().to_string(),
        created_time,
        field_states,
    })
}

/// Falla con error de validación si VIN o cliente están vacíos, algún timestamp
/// no se puede interpretar o `end_time < start_time`.
pub fn validate_movement_submission(request: &AddLocationRequest) -> AppResult<NewCustodyWindow> {
    request.validate()?;

    let start_time = parse_timestamp("start_time", &request.start_time)?;
    let end_time = parse_timestamp("end_time", &request.end_time)?;

    if end_time < start_time {
        return Err(validation_error("end_time", "end_time must not be before start_time"));
    }

    Ok(NewCustodyWindow {
        vin: request.vin.trim().to_string(),
        customer: request.customer.trim().to_string(),
        start_time,
        end_time,
        start_location: request.start_location.trim().to_string(),
        end_location: request.end_location.trim().to_string(),
    })
}
