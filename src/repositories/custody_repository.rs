use async_trait::async_trait;
use sqlx::PgPool;

use super::CustodyStore;
use crate::models::custody::{CustodyWindow, NewCustodyWindow};
use crate::utils::errors::{store_error, AppResult};

pub struct CustodyRepository {
    pool: PgPool,
}

impl CustodyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustodyStore for CustodyRepository {
    async fn append(&self, window: NewCustodyWindow) -> AppResult<CustodyWindow> {
        let stored = sqlx::query_as::<_, CustodyWindow>(
            r#"
            INSERT INTO asset_locations (vin, customer, start_time, end_time, start_location, end_location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, vin, customer, start_time, end_time, start_location, end_location
            "#
        )
        .bind(window.vin)
        .bind(window.customer)
        .bind(window.start_time)
        .bind(window.end_time)
        .bind(window.start_location)
        .bind(window.end_location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("creating custody window", e))?;

        Ok(stored)
    }

    async fn history(&self, vin: &str) -> AppResult<Vec<CustodyWindow>> {
        let windows = sqlx::query_as::<_, CustodyWindow>(
            r#"
            SELECT id, vin, customer, start_time, end_time, start_location, end_location
            FROM asset_locations
            WHERE vin = $1
            ORDER BY start_time, id
            "#
        )
        .bind(vin)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("listing custody windows", e))?;

        Ok(windows)
    }
}
