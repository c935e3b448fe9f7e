//! Configuración de base de datos
//!
//! Este módulo maneja la conexión y configuración de PostgreSQL con SQLx.

use anyhow::{anyhow, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::environment::{parse_value, EnvironmentConfig};

/// Tamaño del pool a partir de `DB_MAX_CONNECTIONS` / `DB_MIN_CONNECTIONS`
fn pool_bounds(max: Option<&str>, min: Option<&str>) -> Result<(u32, u32)> {
    let max_connections: u32 = parse_value("DB_MAX_CONNECTIONS", max, 20)?;
    let min_connections: u32 = parse_value("DB_MIN_CONNECTIONS", min, 1)?;

    if max_connections == 0 {
        return Err(anyhow!("DB_MAX_CONNECTIONS debe ser mayor que 0"));
    }
    if min_connections > max_connections {
        return Err(anyhow!(
            "DB_MIN_CONNECTIONS ({}) no puede superar DB_MAX_CONNECTIONS ({})",
            min_connections,
            max_connections
        ));
    }

    Ok((max_connections, min_connections))
}

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn from_environment(config: &EnvironmentConfig) -> Result<Self> {
        let url = config
            .database_url
            .clone()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set in environment variables"))?;

        let max_raw = std::env::var("DB_MAX_CONNECTIONS").ok();
        let min_raw = std::env::var("DB_MIN_CONNECTIONS").ok();
        let (max_connections, min_connections) = pool_bounds(max_raw.as_deref(), min_raw.as_deref())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        })
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}
