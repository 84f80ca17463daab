use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::records::store::RecordStore;
use crate::transcription::Transcriber;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no `GOOGLE_API_KEY` is configured; AI endpoints answer 503.
    pub llm: Option<LlmClient>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    /// Postgres-backed in production, fixtures in demo mode.
    pub records: Arc<dyn RecordStore>,
    pub config: Config,
}

impl AppState {
    pub fn llm(&self) -> Result<&LlmClient, AppError> {
        self.llm.as_ref().ok_or_else(|| {
            AppError::Unavailable("GOOGLE_API_KEY is not configured".to_string())
        })
    }

    pub fn transcriber(&self) -> Result<&dyn Transcriber, AppError> {
        self.transcriber.as_deref().ok_or_else(|| {
            AppError::Unavailable(
                "No transcription backend is configured".to_string(),
            )
        })
    }
}
