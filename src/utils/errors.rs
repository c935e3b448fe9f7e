//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::borrow::Cow;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// El conjunto de campos del reporte no coincide con el checklist
    #[error("Schema violation: missing {missing:?}, unexpected {unexpected:?}, undefined {undefined:?}")]
    SchemaViolation {
        missing: Vec<String>,
        unexpected: Vec<String>,
        undefined: Vec<String>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Body que no es JSON o no encaja con los tipos del request
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] JsonRejection),
}

impl AppError {
    /// `SchemaViolation` es un subtipo de error de validación
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::SchemaViolation { .. }
                | AppError::BadRequest(_)
                | AppError::InvalidPayload(_)
        )
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::SchemaViolation { missing, unexpected, undefined } => {
                tracing::warn!(
                    "Schema violation: {} missing, {} unexpected, {} undefined",
                    missing.len(),
                    unexpected.len(),
                    undefined.len()
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Schema Violation".to_string(),
                        message: "The inspection does not cover exactly the checklist fields".to_string(),
                        details: Some(json!({
                            "missing": missing,
                            "unexpected": unexpected,
                            "undefined": undefined,
                        })),
                        code: Some("SCHEMA_VIOLATION".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Bad Request".to_string(),
                        message: msg,
                        details: None,
                        code: Some("BAD_REQUEST".to_string()),
                    },
                )
            }

            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse {
                        error: "Store Unavailable".to_string(),
                        message: "The history store could not be reached".to_string(),
                        details: Some(json!({ "store_error": msg })),
                        code: Some("STORE_UNAVAILABLE".to_string()),
                    },
                )
            }

            AppError::InvalidPayload(rejection) => {
                tracing::warn!("Invalid payload: {}", rejection);
                let status = match &rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (
                    status,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The request body is not valid JSON for this endpoint".to_string(),
                        details: Some(json!({ "body": rejection.body_text() })),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: impl Into<Cow<'static, str>>) -> AppError {
    use validator::ValidationError;

    let message = message.into();
    let mut error = ValidationError::new("custom");
    error.add_param("field".into(), &field);
    error.message = Some(message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Función helper para errores del store externo
pub fn store_error(operation: &str, error: impl std::fmt::Display) -> AppError {
    AppError::StoreUnavailable(format!("Error {}: {}", operation, error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_carries_field() {
        let error = validation_error("vin", "VIN is required");
        match &error {
            AppError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("vin"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(error.is_validation());
    }

    #[test]
    fn test_schema_violation_is_validation() {
        let error = AppError::SchemaViolation {
            missing: vec!["Rear Lights → Tail".to_string()],
            unexpected: vec![],
            undefined: vec![],
        };
        assert!(error.is_validation());
        assert!(!store_error("loading inspections", "connection refused").is_validation());
    }

    #[test]
    fn test_status_codes() {
        let response = validation_error("vin", "VIN is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = store_error("loading inspections", "timeout").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
