//! Search: natural-language queries over stored records.
//!
//! With an LLM configured, `ai::ai_search` lets the model pick records by id.
//! Without one, `keyword::keyword_search` interprets the query deterministically.
//! Both build results from stored records only.

pub mod ai;
pub mod handlers;
pub mod keyword;
pub mod prompts;

use chrono::NaiveDate;
use serde::Serialize;

use crate::crm::risk::{assess_record, follow_up_state, FollowUp, RiskLevel};
use crate::models::record::{last_contact_label, StoredRecord};

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub contact: SearchContact,
    pub deal: SearchDeal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchContact {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchDeal {
    pub stage: Option<String>,
    pub value: Option<f64>,
    pub last_contact: String,
    pub days_since_contact: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub insights: String,
}

impl SearchResult {
    /// Builds a result with computed risk and suggestion.
    pub fn from_record(record: &StoredRecord, today: NaiveDate) -> Self {
        let risk = assess_record(record, today);
        let days = record.days_since_contact(today);
        SearchResult {
            contact: SearchContact {
                name: record.contact_name.clone(),
                company: record.company.clone(),
                email: record.email.clone(),
                role: record.role.clone(),
            },
            deal: SearchDeal {
                stage: record.deal_stage.clone(),
                value: record.deal_value,
                last_contact: last_contact_label(days),
                days_since_contact: days,
            },
            risk_level: Some(risk),
            suggestion: suggest(record, risk, today),
        }
    }
}

/// Risk action first, then the stored next step, then a generic follow-up nudge.
pub fn suggest(record: &StoredRecord, risk: RiskLevel, today: NaiveDate) -> Option<String> {
    if let Some(action) = risk.suggestion() {
        return Some(action.to_string());
    }
    if let Some(step) = record.next_steps.first() {
        return Some(step.clone());
    }
    match follow_up_state(record, today) {
        FollowUp::Overdue | FollowUp::DueToday => Some("Follow up as scheduled".to_string()),
        _ => None,
    }
}

/// Highest deal value first; records without a value last; ties by name.
pub fn sort_by_value(records: &mut [&StoredRecord]) {
    records.sort_by(|a, b| {
        let by_value = match (a.deal_value, b.deal_value) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_value.then_with(|| a.contact_name.cmp(&b.contact_name))
    });
}

/// Whole-dollar amount with thousands separators: 1240000.0 -> "$1,240,000".
pub fn format_usd(amount: f64) -> String {
    let whole = amount.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}
