use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::models::checklist::{self, ChecklistSection};
use crate::state::AppState;

pub fn create_system_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/checklist", get(get_checklist))
}

/// Health check simple
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "trailer-damage-attribution",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Checklist de inspección en orden, para que el formulario lo renderice
async fn get_checklist() -> Json<&'static [ChecklistSection]> {
    Json(checklist::fields())
}
