use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::search::ai::{ai_search, MAX_CONTEXT_RECORDS};
use crate::search::keyword::keyword_search;
use crate::search::SearchResult;
use crate::state::AppState;

const MAX_QUERY_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchResult>,
    pub insights: String,
    /// "ai" or "keyword".
    pub backend: &'static str,
}

/// POST /api/search
///
/// Asks the LLM when one is configured, otherwise runs the keyword search.
pub async fn handle_search(
    State(state): State<AppState>,
    req: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(req) = req?;
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "query is too long (max {MAX_QUERY_CHARS} characters)"
        )));
    }

    let today = Utc::now().date_naive();

    // The LLM only ever sees the most recent slice of the pipeline.
    let (outcome, backend, scanned) = match state.llm.as_ref() {
        Some(llm) => {
            let records = state.records.recent(MAX_CONTEXT_RECORDS as i64).await?;
            let outcome = ai_search(llm, &records, query, today).await?;
            (outcome, "ai", records.len())
        }
        None => {
            let records = state.records.contacted_since(None).await?;
            (keyword_search(&records, query, today), "keyword", records.len())
        }
    };

    info!(
        "Search '{}' via {} matched {} of {} records",
        query,
        backend,
        outcome.results.len(),
        scanned
    );

    Ok(Json(SearchResponse {
        success: true,
        results: outcome.results,
        insights: outcome.insights,
        backend,
    }))
}
