use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One vendor's quoted price for one crop in one city.
/// Unique on (city, crop_name, vendor_id); state is carried but not keyed.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub id: Uuid,
    pub state: String,
    pub city: String,
    pub crop_name: String,
    pub price: Option<f64>,
    pub vendor_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct PriceUpsert {
    pub vendor_id: Uuid,
    pub city: String,
    pub state: String,
    pub crop_name: String,
    pub price: Option<f64>,
}
