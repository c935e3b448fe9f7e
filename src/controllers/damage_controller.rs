use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::damage_dto::{AddInspectionRequest, AddLocationRequest};
use crate::models::damage::AttributionResult;
use crate::models::inspection::InspectionReceipt;
use crate::repositories::{CustodyStore, InspectionStore};
use crate::services::attribution_assembler::assemble;
use crate::services::ingestion_validator::{validate_inspection_submission, validate_movement_submission};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct DamageController {
    inspections: Arc<dyn InspectionStore>,
    custody: Arc<dyn CustodyStore>,
}

impl DamageController {
    pub fn new(inspections: Arc<dyn InspectionStore>, custody: Arc<dyn CustodyStore>) -> Self {
        Self { inspections, custody }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.inspections.clone(), state.custody.clone())
    }

    /// Valida y anexa una inspección
    pub async fn submit_inspection(&self, request: AddInspectionRequest) -> AppResult<InspectionReceipt> {
        let inspection = validate_inspection_submission(&request).map_err(|e| {
            warn!("❌ Inspección rechazada para VIN '{}': {}", request.vin, e);
            e
        })?;

        let receipt = InspectionReceipt::from(&inspection);
        let stored = self.inspections.append(inspection).await?;

        info!(
            "✅ Inspección {} registrada para VIN {} ({} campos dañados)",
            stored.id,
            stored.vin,
            receipt.damaged_parts.len()
        );
        Ok(receipt)
    }

    /// Valida y anexa un movimiento
    pub async fn submit_movement(&self, request: AddLocationRequest) -> AppResult<()> {
        let window = validate_movement_submission(&request).map_err(|e| {
            warn!("❌ Movimiento rechazado para VIN '{}': {}", request.vin, e);
            e
        })?;

        let stored = self.custody.append(window).await?;
        info!(
            "✅ Movimiento {} registrado para VIN {}: {} ({} → {})",
            stored.id, stored.vin, stored.customer, stored.start_time, stored.end_time
        );
        Ok(())
    }

    /// Análisis de atribución de un VIN.
    ///
    /// Un VIN sin historial devuelve una lista vacía. Si algún store falla, el
    /// análisis entero falla.
    pub async fn analyze(
        &self,
        vin: &str,
        detected_at: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<AttributionResult>> {
        let vin = vin.trim();
        info!("🔍 Analizando daños para VIN {}", vin);

        let (reports, windows) =
            tokio::try_join!(self.inspections.history(vin), self.custody.history(vin))?;

        let mut results = assemble(vin, &reports, &windows);
        if let Some(detected_at) = detected_at {
            results.retain(|result| result.event.damage_time == detected_at);
        }

        Ok(results)
    }

    /// Analiza varios VIN en paralelo; un fallo de store hace fallar el lote completo
    pub async fn analyze_many(&self, vins: &[String]) -> AppResult<BTreeMap<String, Vec<AttributionResult>>> {
        let unique: BTreeSet<&str> = vins
            .iter()
            .map(|vin| vin.trim())
            .filter(|vin| !vin.is_empty())
            .collect();

        let analyses = unique.iter().map(|vin| async move {
            let results = self.analyze(vin, None).await?;
            Ok::<_, crate::utils::errors::AppError>((vin.to_string(), results))
        });

        let results = try_join_all(analyses).await?;
        info!("📊 Análisis en lote completado para {} VINs", results.len());
        Ok(results.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::custody::{CustodyWindow, NewCustodyWindow};
    use crate::models::damage::AttributionStatus;
    use crate::models::inspection::{InspectionReport, NewInspection};
    use crate::repositories::{InMemoryCustodyStore, InMemoryInspectionStore};
    use crate::utils::errors::{store_error, AppError};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct UnavailableCustody;

    #[async_trait]
    impl CustodyStore for UnavailableCustody {
        async fn append(&self, _window: NewCustodyWindow) -> AppResult<CustodyWindow> {
            Err(store_error("creating custody window", "connection refused"))
        }

        async fn history(&self, _vin: &str) -> AppResult<Vec<CustodyWindow>> {
            Err(store_error("listing custody windows", "connection refused"))
        }
    }

    struct CountingInspections {
        inner: InMemoryInspectionStore,
        appended: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl InspectionStore for CountingInspections {
        async fn append(&self, inspection: NewInspection) -> AppResult<InspectionReport> {
            self.appended.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.append(inspection).await
        }

        async fn history(&self, vin: &str) -> AppResult<Vec<InspectionReport>> {
            self.inner.history(vin).await
        }
    }

    fn controller() -> DamageController {
        DamageController::new(
            Arc::new(InMemoryInspectionStore::new()),
            Arc::new(InMemoryCustodyStore::new()),
        )
    }

    fn flat_data(tail_ok: bool) -> Value {
        let mut data = serde_json::Map::new();
        for section in crate::models::checklist::fields() {
            let fields: serde_json::Map<String, Value> = section
                .fields
                .iter()
                .map(|field| {
                    let ok = !(section.section == "Rear Lights" && *field == "Tail") || tail_ok;
                    (field.to_string(), Value::Bool(ok))
                })
                .collect();
            data.insert(section.section.to_string(), Value::Object(fields));
        }
        Value::Object(data)
    }

    fn inspection(vin: &str, time: &str, tail_ok: bool) -> AddInspectionRequest {
        AddInspectionRequest {
            vin: vin.to_string(),
            created_time: time.to_string(),
            data: flat_data(tail_ok),
        }
    }

    fn movement(vin: &str, customer: &str, start: &str, end: &str) -> AddLocationRequest {
        serde_json::from_value(json!({
            "vin": vin,
            "customer": customer,
            "start_time": start,
            "end_time": end,
            "start_location": "Lafayette, IN",
            "end_location": "Chicago, IL"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_tail_scenario_end_to_end() {
        let controller = controller();
        controller
            .submit_inspection(inspection("T100", "2024-05-01T10:00:00Z", true))
            .await
            .unwrap();
        let receipt = controller
            .submit_inspection(inspection("T100", "2024-05-02T10:00:00Z", false))
            .await
            .unwrap();
        assert!(receipt.has_damage);
        assert_eq!(receipt.damaged_parts, vec!["Rear Lights → Tail".to_string()]);

        controller
            .submit_movement(movement("T100", "CustA", "2024-04-30T10:00:00Z", "2024-05-01T10:00:00Z"))
            .await
            .unwrap();
        controller
            .submit_movement(movement("T100", "CustB", "2024-05-01T10:00:00Z", "2024-05-02T10:00:00Z"))
            .await
            .unwrap();

        let results = controller.analyze("T100", None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, AttributionStatus::Attributed);
        assert_eq!(results[0].attributed_customer(), Some("CustB"));
        assert_eq!(results[0].movements.len(), 2);
    }

    #[tokio::test]
    async fn test_analyze_unknown_vin_is_empty() {
        assert!(controller().analyze("NOPE", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detected_at_filter() {
        let controller = controller();
        for (time, ok) in [
            ("2024-05-01T10:00:00Z", true),
            ("2024-05-02T10:00:00Z", false),
            ("2024-05-03T10:00:00Z", true),
            ("2024-05-04T10:00:00Z", false),
        ] {
            controller.submit_inspection(inspection("T100", time, ok)).await.unwrap();
        }

        assert_eq!(controller.analyze("T100", None).await.unwrap().len(), 2);

        let at = crate::utils::validation::validate_datetime("2024-05-04T10:00:00Z").unwrap();
        let filtered = controller.analyze("T100", Some(at)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].event.damage_time, at);
    }

    #[tokio::test]
    async fn test_rejected_submission_never_reaches_store() {
        let inspections = Arc::new(CountingInspections {
            inner: InMemoryInspectionStore::new(),
            appended: std::sync::atomic::AtomicUsize::new(0),
        });
        let custody = Arc::new(InMemoryCustodyStore::new());
        let controller = DamageController::new(inspections.clone(), custody.clone());

        let error = controller
            .submit_inspection(inspection("T100", "not a time", true))
            .await
            .unwrap_err();
        assert!(error.is_validation());
        assert_eq!(inspections.appended.load(std::sync::atomic::Ordering::SeqCst), 0);

        let error = controller
            .submit_movement(movement("T100", "CustA", "2024-05-02T10:00:00Z", "2024-05-01T10:00:00Z"))
            .await
            .unwrap_err();
        assert!(error.is_validation());
        assert!(custody.history("T100").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_fails_whole_analysis() {
        let controller = DamageController::new(
            Arc::new(InMemoryInspectionStore::new()),
            Arc::new(UnavailableCustody),
        );
        controller
            .submit_inspection(inspection("T100", "2024-05-01T10:00:00Z", false))
            .await
            .unwrap();

        let error = controller.analyze("T100", None).await.unwrap_err();
        assert!(matches!(error, AppError::StoreUnavailable(_)));

        let error = controller.analyze_many(&["T100".to_string()]).await.unwrap_err();
        assert!(matches!(error, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_analyze_many_deduplicates_vins() {
        let controller = controller();
        controller
            .submit_inspection(inspection("T100", "2024-05-01T10:00:00Z", false))
            .await
            .unwrap();

        let vins = vec!["T100".to_string(), " T100 ".to_string(), "T200".to_string(), "".to_string()];
        let results = controller.analyze_many(&vins).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results["T100"].len(), 1);
        assert!(results["T100"][0].origin_unknown());
        assert!(results["T200"].is_empty());
    }
}
