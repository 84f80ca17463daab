pub mod generate;
pub mod health;
pub mod samples;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::dashboard::handlers::handle_dashboard;
use crate::errors::AppError;
use crate::extraction::handlers::{handle_extract_email, handle_extract_voice};
use crate::records::handlers::handle_get_records;
use crate::search::handlers::handle_search;
use crate::state::AppState;
use crate::transcription::handlers::handle_transcribe_audio;
use crate::transcription::upload::MAX_UPLOAD_BYTES;

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Nova CRM API is running" }))
}

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health::health_handler))
        // Extraction
        .route("/api/extract-email", post(handle_extract_email))
        .route(
            "/api/extract-voice",
            post(handle_extract_voice).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/transcribe-audio/",
            post(handle_transcribe_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Records, search, analytics
        .route("/get-crm-records", get(handle_get_records))
        .route("/api/search", post(handle_search))
        .route("/api/dashboard", get(handle_dashboard))
        // Raw prompt and demo samples
        .route(
            "/api/generate",
            post(generate::handle_generate).get(generate::handle_generate_info),
        )
        .route("/api/samples/email", get(samples::sample_email))
        .route("/api/samples/voice", get(samples::sample_voice))
        .fallback(not_found)
        .with_state(state)
}
