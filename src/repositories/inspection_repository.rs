use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use super::InspectionStore;
use crate::models::inspection::{from_nested, to_nested, InspectionReport, NestedFieldStates, NewInspection};
use crate::utils::errors::{store_error, AppResult};

// Fila de la tabla inspections
#[derive(Debug, sqlx::FromRow)]
struct InspectionRow {
    id: i64,
    vin: String,
    created_time: DateTime<Utc>,
    field_states: Json<NestedFieldStates>,
}

impl From<InspectionRow> for InspectionReport {
    fn from(row: InspectionRow) -> Self {
        InspectionReport {
            id: row.id,
            vin: row.vin,
            created_time: row.created_time,
            field_states: from_nested(row.field_states.0),
        }
    }
}

pub struct InspectionRepository {
    pool: PgPool,
}

impl InspectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InspectionStore for InspectionRepository {
    async fn append(&self, inspection: NewInspection) -> AppResult<InspectionReport> {
        let has_damage = inspection.has_damage();

        let row = sqlx::query_as::<_, InspectionRow>(
            r#"
            INSERT INTO inspections (vin, created_time, field_states, has_damage)
            VALUES ($1, $2, $3, $4)
            RETURNING id, vin, created_time, field_states
            "#
        )
        .bind(&inspection.vin)
        .bind(inspection.created_time)
        .bind(Json(to_nested(&inspection.field_states)))
        .bind(has_damage)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("creating inspection", e))?;

        Ok(row.into())
    }

    async fn history(&self, vin: &str) -> AppResult<Vec<InspectionReport>> {
        let rows = sqlx::query_as::<_, InspectionRow>(
            "SELECT id, vin, created_time, field_states FROM inspections WHERE vin = $1 ORDER BY created_time, id"
        )
        .bind(vin)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("listing inspections", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
