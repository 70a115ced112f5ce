use serde_json::Value;
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, warn};

use crate::{
    advisor::{
        dto::{AskRequest, CropRecommendation},
        CropAdvisor,
    },
    error::{AppError, AppResult},
    reference::{is_approved_crop, APPROVED_CROPS},
};

/// "October 18, 2026"
pub fn today_label() -> AppResult<String> {
    let fmt = format_description!("[month repr:long] [day padding:none], [year]");
    OffsetDateTime::now_utc()
        .format(&fmt)
        .map_err(|e| AppError::internal(e.to_string()))
}

pub fn build_prompt(city: &str, state: &str, date: &str) -> String {
    format!(
        "Given the location {city}, {state} and the current date {date}, recommend the best crops to grow.\n\
         The crops MUST be selected ONLY from the following list: {crops}.\n\
         For each recommended crop, provide a brief description explaining why it is suitable for the given location and time.\n\
         Provide the response as a JSON array of objects. Each object should have two properties: \"cropName\" (string) and \"description\" (string).\n\
         Example: [{{\"cropName\": \"Rice\", \"description\": \"Suitable for the climate and soil type, good water availability during monsoon season.\"}}, \
         {{\"cropName\": \"Wheat\", \"description\": \"Ideal for winter cultivation due to cooler temperatures and sufficient irrigation.\"}}]",
        crops = APPROVED_CROPS.join(", "),
    )
}

/// Parse the model's text as a JSON array, tolerating a Markdown code fence.
/// Elements are left loose; `clamp_to_approved` decides which ones count.
pub fn parse_recommendations(text: &str) -> AppResult<Vec<Value>> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim())
        .map_err(|e| AppError::internal(format!("Gemini API returned invalid JSON format: {e}")))
}

/// Keep the elements whose `cropName` is an approved crop; anything else,
/// malformed or made up, is dropped.
pub fn clamp_to_approved(items: Vec<Value>) -> Vec<CropRecommendation> {
    items
        .into_iter()
        .filter_map(|item| {
            let crop_name = item.get("cropName").and_then(Value::as_str);
            match crop_name {
                Some(name) if is_approved_crop(name) => Some(CropRecommendation {
                    crop_name: name.to_string(),
                    description: item
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                }),
                _ => {
                    warn!(item = %item, "dropping unapproved crop from recommendation");
                    None
                }
            }
        })
        .collect()
}

pub async fn recommend_crops(advisor: &dyn CropAdvisor, req: AskRequest) -> AppResult<Vec<CropRecommendation>> {
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(city), Some(state)) = (non_blank(req.city), non_blank(req.state)) else {
        return Err(AppError::validation("City and state are required in the request body."));
    };
    let date = match non_blank(req.date) {
        Some(d) => d,
        None => today_label()?,
    };

    let text = advisor.complete(&build_prompt(&city, &state, &date)).await?;
    let crops = clamp_to_approved(parse_recommendations(&text)?);
    info!(%city, %state, count = crops.len(), "crop recommendations served");
    Ok(crops)
}
