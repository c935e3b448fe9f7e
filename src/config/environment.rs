//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

/// Backend de los historiales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("STORE_BACKEND desconocido: '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
            max_concurrent_requests: 256,
            store_backend: StoreBackend::Memory,
            database_url: None,
        }
    }
}

/// Interpreta el valor crudo de una variable; ausente usa el default
pub(crate) fn parse_value<T>(name: &str, raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} debe ser un valor válido: {}", name, e)),
        None => Ok(default),
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(name, env::var(name).ok().as_deref(), default)
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse().context("STORE_BACKEND inválido")?,
            Err(_) if database_url.is_some() => StoreBackend::Postgres,
            Err(_) => StoreBackend::Memory,
        };

        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORE_BACKEND=postgres"));
        }

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            max_concurrent_requests: parse_var("MAX_CONCURRENT_REQUESTS", defaults.max_concurrent_requests)?,
            store_backend,
            database_url,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!(" Memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "0.0.0.0:8000");
        assert_eq!(config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("PORT", None, 8000u16).unwrap(), 8000);
        assert_eq!(parse_value("PORT", Some(" 9000 "), 8000u16).unwrap(), 9000);
        assert!(parse_value("PORT", Some("eighty"), 8000u16).is_err());
        assert!(parse_value("PORT", Some("70000"), 8000u16).is_err());
    }
}
