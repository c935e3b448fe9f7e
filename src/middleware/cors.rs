//! Middleware de CORS
//!
//! Este módulo maneja la configuración de CORS para permitir
//! requests desde el formulario de inspección y el dashboard de análisis.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::EnvironmentConfig;

/// Crear middleware de CORS configurado para desarrollo
/// NOTA: Permite cualquier origen - solo para desarrollo
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Crear middleware de CORS con orígenes específicos
pub fn cors_middleware_with_origins(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// CORS según el entorno: lista explícita en producción, permisivo en el resto.
/// En producción sin `CORS_ORIGINS` no se admite ningún origen cruzado.
pub fn cors_for(config: &EnvironmentConfig) -> CorsLayer {
    if !config.is_production() {
        return cors_middleware();
    }

    if config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción: se rechazan todos los orígenes cruzados");
    }
    cors_middleware_with_origins(&config.cors_origins)
}
