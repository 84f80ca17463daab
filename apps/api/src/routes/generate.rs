use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

const MAX_PROMPT_CHARS: usize = 20_000;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// POST /api/generate
///
/// Sends a raw prompt to the LLM and returns its text answer.
pub async fn handle_generate(
    State(state): State<AppState>,
    req: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(req) = req?;
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "prompt is too long (max {MAX_PROMPT_CHARS} characters)"
        )));
    }

    let llm = state.llm()?;
    let response = llm.call_text(prompt, None).await?;
    Ok(Json(GenerateResponse { response }))
}

/// GET /api/generate
pub async fn handle_generate_info() -> Json<Value> {
    Json(json!({
        "message": "Generate endpoint is up. POST {\"prompt\": \"...\"} to use it."
    }))
}
