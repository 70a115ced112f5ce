use std::collections::HashMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::repo_types::{Role, User},
    crops::{
        dto::{CropStat, PriceUpdateRequest},
        repo_types::{PriceRecord, PriceUpsert},
    },
    error::{AppError, AppResult},
    state::AppState,
};

/// Record `vendor`'s price for a crop in the vendor's own city.
pub async fn upsert_price(st: &AppState, vendor: &User, req: PriceUpdateRequest) -> AppResult<PriceRecord> {
    if vendor.role != Role::Vendor {
        warn!(user_id = %vendor.id, role = %vendor.role, "price update by non-vendor");
        return Err(AppError::Forbidden("Only vendors can update crop prices".into()));
    }

    let crop_name = req
        .crop_name
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("cropName is required"))?;

    if let Some(price) = req.price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::validation("price must be a non-negative number"));
        }
    }

    let record = st
        .prices
        .upsert(PriceUpsert {
            vendor_id: vendor.id,
            city: vendor.city.clone(),
            state: vendor.state.clone(),
            crop_name,
            price: req.price,
        })
        .await?;

    info!(
        vendor_id = %vendor.id,
        crop = %record.crop_name,
        city = %record.city,
        price = ?record.price,
        "crop price updated"
    );
    Ok(record)
}

/// The price sheet of one vendor, scoped to that vendor's own location.
pub async fn prices_for_vendor(st: &AppState, username: &str) -> AppResult<Vec<PriceRecord>> {
    let username = username.trim().to_lowercase();
    let vendor = st
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor not found"))?;
    st.prices.list_for_vendor(vendor.id, &vendor.city, &vendor.state).await
}

pub async fn prices_in_location(st: &AppState, city: &str, state: &str) -> AppResult<Vec<PriceRecord>> {
    st.prices.list_for_location(city, state).await
}

pub async fn list_vendors(st: &AppState) -> AppResult<Vec<User>> {
    st.users.list_by_role(Role::Vendor).await
}

/// Every vendor in (city, state) with their price for `crop_name`.
///
/// The vendor list and the price list are read separately; a price written
/// between the two reads may or may not show up.
pub async fn stats_for_crop(st: &AppState, crop_name: &str, city: &str, state: &str) -> AppResult<Vec<CropStat>> {
    let crop_name = crop_name.trim();
    let vendors = st.users.list_by_role_in(Role::Vendor, city, state).await?;
    let prices = st.prices.list_for_crop(crop_name, city, state).await?;
    debug!(crop = %crop_name, vendors = vendors.len(), prices = prices.len(), "crop stats snapshot");
    Ok(merge_stats(&vendors, &prices))
}

/// Left join of vendors against price records, keyed by vendor id.
pub(crate) fn merge_stats(vendors: &[User], prices: &[PriceRecord]) -> Vec<CropStat> {
    let by_vendor: HashMap<Uuid, f64> = prices
        .iter()
        .map(|p| (p.vendor_id, p.price.unwrap_or(0.0)))
        .collect();

    vendors
        .iter()
        .map(|v| CropStat {
            username: v.username.clone(),
            price: by_vendor.get(&v.id).copied().unwrap_or(0.0),
        })
        .collect()
}
