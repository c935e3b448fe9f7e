//! Adaptadores de los historiales
//!
//! Los historiales de inspecciones y de custodia son logs append-only por VIN.
//! Cada `append` es atómico: una submission se anexa completa o no se anexa.

pub mod custody_repository;
pub mod inspection_repository;
pub mod memory_repository;

use async_trait::async_trait;

use crate::models::custody::{CustodyWindow, NewCustodyWindow};
use crate::models::inspection::{InspectionReport, NewInspection};
use crate::utils::errors::AppResult;

pub use custody_repository::CustodyRepository;
pub use inspection_repository::InspectionRepository;
pub use memory_repository::{InMemoryCustodyStore, InMemoryInspectionStore};

#[async_trait]
pub trait InspectionStore: Send + Sync {
    async fn append(&self, inspection: NewInspection) -> AppResult<InspectionReport>;

    /// Historial del VIN ordenado por timestamp y luego por orden de ingesta
    async fn history(&self, vin: &str) -> AppResult<Vec<InspectionReport>>;
}

#[async_trait]
pub trait CustodyStore: Send + Sync {
    async fn append(&self, window: NewCustodyWindow) -> AppResult<CustodyWindow>;

    /// Ventanas de custodia del VIN ordenadas por inicio y luego por orden de ingesta
    async fn history(&self, vin: &str) -> AppResult<Vec<CustodyWindow>>;
}
