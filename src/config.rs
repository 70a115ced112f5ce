#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_secret: String,
    pub refresh_ttl_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

/// Keys for the third-party APIs. Either may be absent; the matching
/// endpoint then fails per request instead of at startup.
#[derive(Debug, Clone, Default)]
pub struct ExternalApiConfig {
    pub gemini_api_key: Option<String>,
    pub weather_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub external: ExternalApiConfig,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            access_secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            access_ttl_minutes: env_i64("ACCESS_TOKEN_TTL_MINUTES").unwrap_or(60),
            refresh_secret: std::env::var("REFRESH_TOKEN_SECRET")?,
            refresh_ttl_minutes: env_i64("REFRESH_TOKEN_TTL_MINUTES").unwrap_or(60 * 24 * 14),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "agriconnect".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "agriconnect-users".into()),
        };
        if jwt.access_secret == jwt.refresh_secret {
            tracing::warn!("access and refresh tokens share one secret");
        }
        let external = ExternalApiConfig {
            gemini_api_key: env_non_empty("GEMINI_API_KEY"),
            weather_api_key: env_non_empty("WEATHER_API_KEY"),
        };
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        Ok(Self {
            database_url,
            jwt,
            external,
            cookie_secure,
        })
    }
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse::<i64>().ok())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
