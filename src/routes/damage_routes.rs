use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use std::collections::BTreeMap;
use validator::Validate;

use crate::controllers::damage_controller::DamageController;
use crate::dto::damage_dto::{
    AddInspectionRequest, AddLocationRequest, AnalyzeQuery, AttributionResponse,
    BatchAnalyzeRequest, InspectionSubmittedResponse, LocationSubmittedResponse,
};
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::validate_datetime;

pub fn create_damage_router() -> Router<AppState> {
    Router::new()
        .route("/add_inspection", post(add_inspection))
        .route("/add_location", post(add_location))
        .route("/analyze", post(analyze_batch))
        .route("/analyze/:vin", get(analyze))
}

async fn add_inspection(
    State(state): State<AppState>,
    payload: Result<Json<AddInspectionRequest>, JsonRejection>,
) -> Result<Json<InspectionSubmittedResponse>, AppError> {
    let Json(request) = payload?;
    let controller = DamageController::from_state(&state);
    let receipt = controller.submit_inspection(request).await?;
    Ok(Json(receipt.into()))
}

async fn add_location(
    State(state): State<AppState>,
    payload: Result<Json<AddLocationRequest>, JsonRejection>,
) -> Result<Json<LocationSubmittedResponse>, AppError> {
    let Json(request) = payload?;
    let controller = DamageController::from_state(&state);
    controller.submit_movement(request).await?;
    Ok(Json(LocationSubmittedResponse { status: "success" }))
}

async fn analyze(
    State(state): State<AppState>,
    Path(vin): Path<String>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<Vec<AttributionResponse>>, AppError> {
    let detected_at = query
        .detected_at
        .as_deref()
        .map(|raw| {
            validate_datetime(raw)
                .map_err(|_| validation_error("detected_at", "detected_at is not a valid timestamp"))
        })
        .transpose()?;

    let controller = DamageController::from_state(&state);
    let results = controller.analyze(&vin, detected_at).await?;
    Ok(Json(results.iter().map(AttributionResponse::from).collect()))
}

async fn analyze_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<Json<BTreeMap<String, Vec<AttributionResponse>>>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let controller = DamageController::from_state(&state);
    let results = controller.analyze_many(&request.vins).await?;
    let response = results
        .iter()
        .map(|(vin, results)| {
            let attributions = results.iter().map(AttributionResponse::from).collect::<Vec<_>>();
            (vin.clone(), attributions)
        })
        .collect();
    Ok(Json(response))
}
