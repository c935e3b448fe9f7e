//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    CustodyRepository, CustodyStore, InMemoryCustodyStore, InMemoryInspectionStore,
    InspectionRepository, InspectionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub inspections: Arc<dyn InspectionStore>,
    pub custody: Arc<dyn CustodyStore>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        inspections: Arc<dyn InspectionStore>,
        custody: Arc<dyn CustodyStore>,
    ) -> Self {
        Self {
            config,
            inspections,
            custody,
        }
    }

    /// Historiales respaldados por PostgreSQL
    pub fn with_postgres(config: EnvironmentConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(InspectionRepository::new(pool.clone())),
            Arc::new(CustodyRepository::new(pool)),
        )
    }

    /// Historiales en memoria del proceso
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryInspectionStore::new()),
            Arc::new(InMemoryCustodyStore::new()),
        )
    }
}
