use async_trait::async_trait;
use serde::Deserialize;
use tracing::error;

use crate::{
    error::{AppError, AppResult},
    weather::{WeatherProvider, WeatherReport},
};

const OWM_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    weather: Vec<OwmCondition>,
    main: OwmMain,
    wind: OwmWind,
}

pub(crate) fn parse_report(raw: &str) -> AppResult<WeatherReport> {
    let body: OwmResponse = serde_json::from_str(raw)
        .map_err(|e| AppError::Upstream(format!("Unexpected weather response: {e}")))?;
    let condition = body
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Upstream("Weather response has no conditions".into()))?;

    Ok(WeatherReport {
        city: body.name,
        description: condition.description,
        icon: condition.icon,
        temperature: body.main.temp,
        feels_like: body.main.feels_like,
        humidity: body.main.humidity,
        wind_speed: body.wind.speed,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str, state: &str) -> AppResult<WeatherReport> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            error!("WEATHER_API_KEY is not set");
            AppError::internal("Weather API key is missing")
        })?;

        let q = format!("{city},{state},IN");
        let res = self
            .http
            .get(OWM_URL)
            .query(&[("q", q.as_str()), ("units", "metric"), ("appid", key)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Weather request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Weather response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(AppError::Upstream(format!("Weather provider returned {status}")));
        }
        parse_report(&text)
    }
}
