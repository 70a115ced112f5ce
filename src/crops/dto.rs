use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceUpdateRequest {
    pub crop_name: Option<String>,
    pub price: Option<f64>,
}

/// One row of the per-crop comparison. `price` is 0 for vendors that never
/// quoted the crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropStat {
    pub username: String,
    pub price: f64,
}
