use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{dto::PublicUser, extractors::CurrentUser},
    crops::{
        dto::{CropStat, PriceUpdateRequest},
        repo_types::PriceRecord,
        services,
    },
    error::AppResult,
    extract::Json,
    state::AppState,
};

pub fn crop_routes() -> Router<AppState> {
    Router::new()
        .route("/crop/priceupdate", patch(update_price))
        .route("/crop/prices", get(local_prices))
        .route("/crop/prices/:username", get(vendor_prices))
        .route("/crop/vendors", get(vendors))
        .route("/crop/stats/:crop_name", get(crop_stats))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_price(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<PriceUpdateRequest>,
) -> AppResult<Json<PriceRecord>> {
    let record = services::upsert_price(&state, &user, payload).await?;
    Ok(Json(record))
}

/// Everything quoted in the caller's own city and state.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn local_prices(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<PriceRecord>>> {
    let records = services::prices_in_location(&state, &user.city, &user.state).await?;
    Ok(Json(records))
}

#[instrument(skip(state, _caller))]
pub async fn vendor_prices(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<PriceRecord>>> {
    let records = services::prices_for_vendor(&state, &username).await?;
    Ok(Json(records))
}

#[instrument(skip_all)]
pub async fn vendors(State(state): State<AppState>, _caller: CurrentUser) -> AppResult<Json<Vec<PublicUser>>> {
    let vendors = services::list_vendors(&state).await?;
    Ok(Json(vendors.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn crop_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(crop_name): Path<String>,
) -> AppResult<Json<Vec<CropStat>>> {
    let stats = services::stats_for_crop(&state, &crop_name, &user.city, &user.state).await?;
    Ok(Json(stats))
}
