//! Stores en memoria
//!
//! Se usan cuando no hay base de datos configurada y en los tests. Cada append
//! ocurre bajo un único write lock, así que nunca se observa una escritura parcial.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CustodyStore, InspectionStore};
use crate::models::custody::{CustodyWindow, NewCustodyWindow};
use crate::models::inspection::{InspectionReport, NewInspection};
use crate::utils::errors::AppResult;

struct Log<T> {
    next_id: i64,
    by_vin: HashMap<String, Vec<T>>,
}

impl<T> Default for Log<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            by_vin: HashMap::new(),
        }
    }
}

impl<T> Log<T> {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct InMemoryInspectionStore {
    log: Arc<RwLock<Log<InspectionReport>>>,
}

impl InMemoryInspectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InspectionStore for InMemoryInspectionStore {
    async fn append(&self, inspection: NewInspection) -> AppResult<InspectionReport> {
        let mut log = self.log.write().await;
        let report = inspection.into_report(log.next_id());
        log::debug!("💾 Inspección {} anexada en memoria para VIN {}", report.id, report.vin);
        log.by_vin
            .entry(report.vin.clone())
            .or_default()
            .push(report.clone());
        Ok(report)
    }

    async fn history(&self, vin: &str) -> AppResult<Vec<InspectionReport>> {
        let log = self.log.read().await;
        let mut reports = log.by_vin.get(vin).cloned().unwrap_or_default();
        reports.sort_by_key(|report| (report.created_time, report.id));
        Ok(reports)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCustodyStore {
    log: Arc<RwLock<Log<CustodyWindow>>>,
}

impl InMemoryCustodyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustodyStore for InMemoryCustodyStore {
    async fn append(&self, window: NewCustodyWindow) -> AppResult<CustodyWindow> {
        let mut log = self.log.write().await;
        let stored = window.into_window(log.next_id());
        log::debug!("💾 Movimiento {} anexado en memoria para VIN {}", stored.id, stored.vin);
        log.by_vin
            .entry(stored.vin.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn history(&self, vin: &str) -> AppResult<Vec<CustodyWindow>> {
        let log = self.log.read().await;
        let mut windows = log.by_vin.get(vin).cloned().unwrap_or_default();
        windows.sort_by_key(|window| (window.start_time, window.id));
        Ok(windows)
    }
}
