//! Extraction: email text or voice transcript in, normalized CRM record out.
//!
//! Stateless: the record is returned to the caller and never stored.

pub mod handlers;
pub mod prompts;

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::prompts::{build_extraction_prompt, SourceKind, EXTRACTION_SYSTEM};
use crate::llm_client::prompts::NO_INVENTION_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::crm::CrmRecord;

/// Longest source text accepted for extraction, in characters.
pub const MAX_SOURCE_CHARS: usize = 50_000;

/// Rejects blank or oversized input before any LLM call.
pub fn validate_source(field: &str, text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    let chars = text.chars().count();
    if chars > MAX_SOURCE_CHARS {
        return Err(AppError::Validation(format!(
            "{field} is too long ({chars} characters, max {MAX_SOURCE_CHARS})"
        )));
    }
    Ok(())
}

pub async fn extract_record(
    llm: &LlmClient,
    kind: SourceKind,
    source_text: &str,
) -> Result<CrmRecord, AppError> {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let prompt = format!(
        "{}\n\n{}",
        build_extraction_prompt(kind, source_text.trim(), &today),
        NO_INVENTION_INSTRUCTION
    );

    let record: CrmRecord = llm.call_json(&prompt, EXTRACTION_SYSTEM).await?;
    let record = record.normalize();

    info!(
        "Extracted {:?} record: company={:?}, stage={:?}, value={:?}",
        kind, record.contact.company, record.deal.stage, record.deal.value
    );
    Ok(record)
}
