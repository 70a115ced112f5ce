use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    crops::repo_types::{PriceRecord, PriceUpsert},
    error::AppResult,
};

const PRICE_COLUMNS: &str = "id, state, city, crop_name, price, vendor_id, created_at, updated_at";

#[async_trait]
pub trait PriceRepo: Send + Sync {
    /// Insert, or replace the price of the record with the same
    /// (city, crop_name, vendor_id), in one atomic statement.
    async fn upsert(&self, entry: PriceUpsert) -> AppResult<PriceRecord>;
    async fn list_for_vendor(&self, vendor_id: Uuid, city: &str, state: &str) -> AppResult<Vec<PriceRecord>>;
    async fn list_for_location(&self, city: &str, state: &str) -> AppResult<Vec<PriceRecord>>;
    async fn list_for_crop(&self, crop_name: &str, city: &str, state: &str) -> AppResult<Vec<PriceRecord>>;
}

#[derive(Clone)]
pub struct PgPriceRepo {
    db: PgPool,
}

impl PgPriceRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PriceRepo for PgPriceRepo {
    async fn upsert(&self, entry: PriceUpsert) -> AppResult<PriceRecord> {
        let row = sqlx::query_as::<_, PriceRecord>(&format!(
            r#"
            INSERT INTO crop_prices (state, city, crop_name, price, vendor_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (city, crop_name, vendor_id)
            DO UPDATE SET price = EXCLUDED.price, updated_at = now()
            RETURNING {PRICE_COLUMNS}
            "#
        ))
        .bind(&entry.state)
        .bind(&entry.city)
        .bind(&entry.crop_name)
        .bind(entry.price)
        .bind(entry.vendor_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_for_vendor(&self, vendor_id: Uuid, city: &str, state: &str) -> AppResult<Vec<PriceRecord>> {
        let rows = sqlx::query_as::<_, PriceRecord>(&format!(
            r#"
            SELECT {PRICE_COLUMNS}
              FROM crop_prices
             WHERE vendor_id = $1 AND city = $2 AND state = $3
             ORDER BY crop_name
            "#
        ))
        .bind(vendor_id)
        .bind(city)
        .bind(state)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_for_location(&self, city: &str, state: &str) -> AppResult<Vec<PriceRecord>> {
        let rows = sqlx::query_as::<_, PriceRecord>(&format!(
            r#"
            SELECT {PRICE_COLUMNS}
              FROM crop_prices
             WHERE city = $1 AND state = $2
             ORDER BY crop_name, updated_at DESC
            "#
        ))
        .bind(city)
        .bind(state)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_for_crop(&self, crop_name: &str, city: &str, state: &str) -> AppResult<Vec<PriceRecord>> {
        let rows = sqlx::query_as::<_, PriceRecord>(&format!(
            r#"
            SELECT {PRICE_COLUMNS}
              FROM crop_prices
             WHERE crop_name = $1 AND city = $2 AND state = $3
            "#
        ))
        .bind(crop_name)
        .bind(city)
        .bind(state)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
