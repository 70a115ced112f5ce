use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::{
    advisor::CropAdvisor,
    error::{AppError, AppResult},
};

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Google Gemini `generateContent`, asked for a JSON array of
/// `{cropName, description}` objects.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            url: GEMINI_URL.to_string(),
        }
    }
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "cropName": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "propertyOrdering": ["cropName", "description"]
                }
            }
        }
    })
}

/// `candidates[0].content.parts[0].text`, if the response has that shape.
pub(crate) fn extract_text(body: &Value) -> Option<&str> {
    body.pointer("/candidates/0/content/parts/0/text")?.as_str()
}

#[async_trait]
impl CropAdvisor for GeminiClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            error!("GEMINI_API_KEY is not set");
            AppError::internal("Gemini API key is missing")
        })?;

        let res = self
            .http
            .post(&self.url)
            .query(&[("key", key)])
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "Unknown API error".to_string());
            return Err(AppError::Upstream(format!(
                "Failed to get crop recommendations from Gemini API ({status}): {detail}"
            )));
        }

        let body: Value = res
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Gemini API returned invalid JSON: {e}")))?;
        debug!("gemini response received");

        extract_text(&body)
            .map(str::to_string)
            .ok_or_else(|| AppError::internal("Unexpected Gemini response structure"))
    }
}
