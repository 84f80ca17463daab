//! LLM-backed search.
//!
//! The model sees a compact listing of stored records and answers with record
//! ids. Results are rebuilt from the stored records, so an id the model made up
//! is dropped instead of becoming a contact.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crm::risk::RiskLevel;
use crate::errors::AppError;
use crate::llm_client::prompts::NO_INVENTION_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::record::StoredRecord;
use crate::search::prompts::{build_search_prompt, SEARCH_SYSTEM};
use crate::search::{SearchOutcome, SearchResult};

/// Most recent records sent to the model per query.
pub const MAX_CONTEXT_RECORDS: usize = 200;

#[derive(Debug, Deserialize)]
struct AiSearchAnswer {
    #[serde(default)]
    insights: String,
    #[serde(default)]
    matches: Vec<AiMatch>,
}

#[derive(Debug, Deserialize)]
struct AiMatch {
    id: String,
    #[serde(default)]
    risk_level: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

fn parse_risk(level: &str) -> Option<RiskLevel> {
    match level.trim().to_lowercase().as_str() {
        "high" => Some(RiskLevel::High),
        "medium" => Some(RiskLevel::Medium),
        "low" => Some(RiskLevel::Low),
        _ => None,
    }
}

/// One JSON object per line, only the fields a search needs.
fn record_listing(records: &[StoredRecord], today: NaiveDate) -> String {
    records
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "name": r.contact_name,
                "company": r.company,
                "role": r.role,
                "stage": r.deal_stage,
                "value": r.deal_value,
                "days_since_contact": r.days_since_contact(today),
                "follow_up_date": r.follow_up_date,
                "sentiment": r.sentiment,
                "summary": r.summary,
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn ai_search(
    llm: &LlmClient,
    records: &[StoredRecord],
    query: &str,
    today: NaiveDate,
) -> Result<SearchOutcome, AppError> {
    let context = &records[..records.len().min(MAX_CONTEXT_RECORDS)];
    let prompt = format!(
        "{}\n\n{}",
        build_search_prompt(
            query.trim(),
            &record_listing(context, today),
            &today.format("%Y-%m-%d").to_string()
        ),
        NO_INVENTION_INSTRUCTION
    );

    let answer: AiSearchAnswer = llm.call_json(&prompt, SEARCH_SYSTEM).await?;

    let by_id: HashMap<Uuid, &StoredRecord> = context.iter().map(|r| (r.id, r)).collect();
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for m in answer.matches {
        let Some(record) = Uuid::parse_str(m.id.trim())
            .ok()
            .and_then(|id| by_id.get(&id).copied())
        else {
            warn!("AI search returned unknown record id '{}', dropping it", m.id);
            continue;
        };
        if !seen.insert(record.id) {
            continue;
        }

        let mut result = SearchResult::from_record(record, today);
        if let Some(level) = m.risk_level.as_deref().and_then(parse_risk) {
            result.risk_level = Some(level);
        }
        if let Some(suggestion) = m.suggestion.map(|s| s.trim().to_string()) {
            if !suggestion.is_empty() {
                result.suggestion = Some(suggestion);
            }
        }
        results.push(result);
    }

    info!(
        "AI search over {} records returned {} matches",
        context.len(),
        results.len()
    );

    Ok(SearchOutcome {
        results,
        insights: answer.insights.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::demo_records;
    use chrono::Utc;
    use mockito::Matcher;

    fn gemini_body(text: &str) -> String {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
    }

    #[test]
    fn test_parse_risk() {
        assert_eq!(parse_risk(" High "), Some(RiskLevel::High));
        assert_eq!(parse_risk("medium"), Some(RiskLevel::Medium));
        assert_eq!(parse_risk("critical"), None);
    }

    #[test]
    fn test_record_listing_has_one_line_per_record() {
        let now = Utc::now();
        let records = demo_records(now);
        let listing = record_listing(&records, now.date_naive());
        assert_eq!(listing.lines().count(), records.len());
        let first: serde_json::Value = serde_json::from_str(listing.lines().next().unwrap()).unwrap();
        assert_eq!(first["id"], json!(records[0].id));
        assert!(first.get("email").is_none());
    }

    #[tokio::test]
    async fn test_ai_search_joins_ids_to_stored_records() {
        let now = Utc::now();
        let records = demo_records(now);
        let lisa = records
            .iter()
            .find(|r| r.contact_name.as_deref() == Some("Lisa Rodriguez"))
            .unwrap();
        let sarah = records
            .iter()
            .find(|r| r.contact_name.as_deref() == Some("Sarah Park"))
            .unwrap();

        let answer = json!({
            "insights": "Two deals need attention.",
            "matches": [
                { "id": lisa.id.to_string(), "risk_level": "high", "suggestion": "Call Lisa today" },
                { "id": "00000000-0000-0000-0000-000000000000", "risk_level": "high" },
                { "id": "not-a-uuid" },
                { "id": sarah.id.to_string(), "risk_level": "extreme", "suggestion": " " },
                { "id": lisa.id.to_string() }
            ]
        })
        .to_string();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(":generateContent$".to_string()))
            .match_body(Matcher::Regex("Which deals need attention".to_string()))
            .with_status(200)
            .with_body(gemini_body(&answer))
            .create_async()
            .await;

        let llm = LlmClient::new("k".into(), "gemini-2.0-flash".into(), server.url()).unwrap();
        let outcome = ai_search(&llm, &records, "Which deals need attention?", now.date_naive())
            .await
            .unwrap();

        assert_eq!(outcome.insights, "Two deals need attention.");
        assert_eq!(outcome.results.len(), 2);

        let first = &outcome.results[0];
        assert_eq!(first.contact.name.as_deref(), Some("Lisa Rodriguez"));
        assert_eq!(first.contact.email, lisa.email);
        assert_eq!(first.suggestion.as_deref(), Some("Call Lisa today"));

        let second = &outcome.results[1];
        assert_eq!(second.contact.name.as_deref(), Some("Sarah Park"));
        assert_eq!(second.risk_level, Some(RiskLevel::Low));
        assert_eq!(second.suggestion, SearchResult::from_record(sarah, now.date_naive()).suggestion);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ai_search_with_no_matches() {
        let now = Utc::now();
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(gemini_body(r#"{"insights": "Nothing matched.", "matches": []}"#))
            .create_async()
            .await;

        let llm = LlmClient::new("k".into(), "gemini-2.0-flash".into(), server.url()).unwrap();
        let outcome = ai_search(&llm, &demo_records(now), "zebra", now.date_naive())
            .await
            .unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.insights, "Nothing matched.");
    }
}
