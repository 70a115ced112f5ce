use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{auth::extractors::CurrentUser, error::AppResult, state::AppState};

pub mod openweather;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str, state: &str) -> AppResult<WeatherReport>;
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub state: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/weather", get(current_weather))
}

/// Location from the query when both parts are given, else the caller's own.
fn resolve_location(query: WeatherQuery, city: &str, state: &str) -> (String, String) {
    let given = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    match (given(query.city), given(query.state)) {
        (Some(c), Some(s)) => (c, s),
        _ => (city.to_string(), state.to_string()),
    }
}

#[instrument(skip_all)]
async fn current_weather(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<WeatherReport>> {
    let (city, region) = resolve_location(query, &user.city, &user.state);
    let report = state.weather.current(&city, &region).await?;
    Ok(Json(report))
}
