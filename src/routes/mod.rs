pub mod damage_routes;
pub mod system_routes;

use axum::Router;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::cors::cors_for;
use crate::state::AppState;

/// Crear el router principal de la API con sus capas
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(system_routes::create_system_router())
        .merge(damage_routes::create_damage_router())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests.max(1)))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_for(&config))
        .with_state(state)
}
