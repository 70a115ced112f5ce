use async_trait::async_trait;
use axum::{extract::State, routing::post, Router};
use tracing::instrument;

use crate::{error::AppResult, extract::Json, state::AppState};

pub mod dto;
pub mod gemini;
pub mod services;

use dto::{AskRequest, AskResponse};

/// A generative model that answers a prompt with text.
#[async_trait]
pub trait CropAdvisor: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

pub fn router() -> Router<AppState> {
    Router::new().route("/gpt/ask", post(ask))
}

#[instrument(skip(state))]
async fn ask(State(state): State<AppState>, Json(payload): Json<AskRequest>) -> AppResult<Json<AskResponse>> {
    let crops = services::recommend_crops(state.advisor.as_ref(), payload).await?;
    Ok(Json(AskResponse { success: true, crops }))
}
