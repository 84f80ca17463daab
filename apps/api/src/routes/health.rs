use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and which backend serves each capability.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm = state.llm.as_ref().map(|llm| llm.model().to_string());
    let transcription = state.transcriber.as_ref().map(|t| t.backend());

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "nova-api",
        "llm": llm,
        "transcription": transcription,
        "records": state.records.backend(),
        "demo_data": state.config.demo_data
    }))
}
