use std::{sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    advisor::{gemini::GeminiClient, CropAdvisor},
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepo, UserRepo},
    },
    config::AppConfig,
    crops::repo::{PgPriceRepo, PriceRepo},
    db,
    weather::{openweather::OpenWeatherClient, WeatherProvider},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Signing keys, built once from `config.jwt`.
    pub jwt: Arc<JwtKeys>,
    pub users: Arc<dyn UserRepo>,
    pub prices: Arc<dyn PriceRepo>,
    pub advisor: Arc<dyn CropAdvisor>,
    pub weather: Arc<dyn WeatherProvider>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self::from_parts(
            config.clone(),
            Arc::new(PgUserRepo::new(pool.clone())),
            Arc::new(PgPriceRepo::new(pool)),
            Arc::new(GeminiClient::new(http.clone(), config.external.gemini_api_key.clone())),
            Arc::new(OpenWeatherClient::new(http, config.external.weather_api_key.clone())),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        prices: Arc<dyn PriceRepo>,
        advisor: Arc<dyn CropAdvisor>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            jwt: Arc::new(JwtKeys::from_config(&config.jwt)),
            config,
            users,
            prices,
            advisor,
            weather,
        }
    }

    /// State backed entirely by in-memory fakes.
    #[cfg(test)]
    pub fn fake() -> Self {
        crate::testing::fake_state().0
    }
}
