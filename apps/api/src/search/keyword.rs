//! Deterministic keyword search, used when no LLM is configured.
//!
//! A query is read as a conjunction of filters ("CTOs over $50k in
//! negotiation" = role cto AND value >= 50000 AND stage negotiation). A query
//! with no recognizable filter falls back to matching its words against
//! contact fields.

use chrono::NaiveDate;

use crate::crm::risk::{assess_record, follow_up_state, FollowUp, RiskLevel, STALE_AFTER_DAYS};
use crate::crm::stage::{self, display_name, is_open};
use crate::models::crm::parse_money;
use crate::models::record::StoredRecord;
use crate::search::{format_usd, sort_by_value, SearchOutcome, SearchResult};

const ROLE_TOKENS: &[&str] = &[
    "cto", "ceo", "cfo", "coo", "vp", "director", "head", "founder", "manager",
];

/// Checked in order, so two-word stages win over their substrings.
const STAGE_PHRASES: &[&str] = &[
    stage::CLOSED_WON,
    stage::CLOSED_LOST,
    stage::NEGOTIATION,
    stage::QUALIFIED,
    stage::PROSPECT,
];

const SENTIMENTS: &[&str] = &["positive", "neutral", "negative"];

const FOLLOW_UP_PHRASES: &[&str] = &["follow up", "follow-up", "followup", "today"];

const STOPWORDS: &[&str] = &[
    "a", "all", "an", "and", "any", "are", "at", "contact", "contacts", "deal", "deals", "do",
    "find", "for", "from", "get", "give", "i", "in", "is", "list", "me", "my", "of", "on",
    "our", "should", "show", "the", "to", "what", "which", "who", "with",
];

/// A bare number is only read as money right after one of these ("over 75000").
const AMOUNT_CUES: &[&str] = &["over", "above", "than", "least", "exceeding"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeywordQuery {
    pub at_risk: bool,
    pub follow_up: bool,
    pub role: Option<&'static str>,
    pub min_value: Option<f64>,
    pub stage: Option<&'static str>,
    pub sentiment: Option<&'static str>,
    /// Only set when no structured filter was recognized.
    pub free_text: Vec<String>,
}

impl KeywordQuery {
    fn has_filters(&self) -> bool {
        self.at_risk
            || self.follow_up
            || self.role.is_some()
            || self.min_value.is_some()
            || self.stage.is_some()
            || self.sentiment.is_some()
    }

    fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if self.at_risk {
            parts.push("at-risk deals".to_string());
        }
        if self.follow_up {
            parts.push("follow-ups due".to_string());
        }
        if let Some(role) = self.role {
            parts.push(format!("role {}", role.to_uppercase()));
        }
        if let Some(min) = self.min_value {
            parts.push(format!("value of at least {}", format_usd(min)));
        }
        if let Some(stage) = self.stage {
            parts.push(format!("stage {}", display_name(stage)));
        }
        if let Some(sentiment) = self.sentiment {
            parts.push(format!("{sentiment} sentiment"));
        }
        if !self.free_text.is_empty() {
            parts.push(format!("\"{}\"", self.free_text.join(" ")));
        }
        parts
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// `$50k`, `50k` and `$50000` always count; `50000` only after an amount cue.
fn money_token(token: &str, cued: bool) -> Option<f64> {
    let token = token.trim_matches(|c: char| matches!(c, '?' | '!' | ',' | '.' | '(' | ')'));
    let lower = token.to_ascii_lowercase();
    let explicit = lower.starts_with('$') || lower.ends_with('k') || lower.ends_with('m');
    if explicit || cued {
        parse_money(&lower)
    } else {
        None
    }
}

fn min_value(lower: &str) -> Option<f64> {
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    tokens.iter().enumerate().find_map(|(i, token)| {
        let cued = i > 0 && AMOUNT_CUES.contains(&tokens[i - 1]);
        money_token(token, cued)
    })
}

pub fn parse_query(query: &str) -> KeywordQuery {
    let lower = query.to_lowercase();
    let query_words = words(&lower);

    let role = ROLE_TOKENS.iter().copied().find(|&token| {
        query_words
            .iter()
            .any(|w| w == token || w.strip_suffix('s') == Some(token))
    });

    let mut parsed = KeywordQuery {
        at_risk: query_words.iter().any(|w| w == "risk" || w == "risky"),
        follow_up: FOLLOW_UP_PHRASES.iter().any(|p| lower.contains(p)),
        role,
        min_value: min_value(&lower),
        stage: STAGE_PHRASES.iter().copied().find(|&p| lower.contains(p)),
        sentiment: SENTIMENTS
            .iter()
            .copied()
            .find(|&s| query_words.iter().any(|w| w == s)),
        free_text: Vec::new(),
    };

    if !parsed.has_filters() {
        parsed.free_text = query_words
            .into_iter()
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .collect();
    }
    parsed
}

fn record_matches(record: &StoredRecord, query: &KeywordQuery, today: NaiveDate) -> bool {
    let stage_lower = record.stage_lower();

    if query.at_risk && assess_record(record, today) == RiskLevel::Low {
        return false;
    }

    if query.follow_up {
        let due = matches!(
            follow_up_state(record, today),
            FollowUp::Overdue | FollowUp::DueToday
        );
        let stale = record.days_since_contact(today) >= STALE_AFTER_DAYS;
        if !is_open(stage_lower.as_deref()) || !(due || stale) {
            return false;
        }
    }

    if let Some(role) = query.role {
        let role_words = record.role.as_deref().map(words).unwrap_or_default();
        if !role_words.iter().any(|w| w == role) {
            return false;
        }
    }

    if let Some(min) = query.min_value {
        if record.deal_value.map_or(true, |v| v < min) {
            return false;
        }
    }

    if let Some(stage) = query.stage {
        if stage_lower.as_deref() != Some(stage) {
            return false;
        }
    }

    if let Some(sentiment) = query.sentiment {
        let record_sentiment = record.sentiment.as_deref().map(|s| s.trim().to_lowercase());
        if record_sentiment.as_deref() != Some(sentiment) {
            return false;
        }
    }

    if !query.has_filters() {
        if query.free_text.is_empty() {
            return false;
        }
        let haystack = [
            &record.contact_name,
            &record.company,
            &record.email,
            &record.role,
            &record.summary,
        ]
        .iter()
        .filter_map(|f| f.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
        return query.free_text.iter().all(|w| haystack.contains(w.as_str()));
    }

    true
}

pub fn keyword_search(records: &[StoredRecord], query: &str, today: NaiveDate) -> SearchOutcome {
    let parsed = parse_query(query);

    let mut hits: Vec<&StoredRecord> = records
        .iter()
        .filter(|r| record_matches(r, &parsed, today))
        .collect();
    sort_by_value(&mut hits);

    let results: Vec<SearchResult> = hits
        .iter()
        .map(|r| SearchResult::from_record(r, today))
        .collect();

    SearchOutcome {
        insights: insights(query, &parsed, &hits),
        results,
    }
}

fn insights(query: &str, parsed: &KeywordQuery, hits: &[&StoredRecord]) -> String {
    if hits.is_empty() {
        return format!("No records matched \"{}\".", query.trim());
    }
    let total: f64 = hits.iter().filter_map(|r| r.deal_value).sum();
    let noun = if hits.len() == 1 { "record" } else { "records" };
    format!(
        "Found {} {} matching {}. Total pipeline value: {}.",
        hits.len(),
        noun,
        parsed.describe().join(", "),
        format_usd(total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::demo_records;
    use chrono::Utc;

    fn names(outcome: &SearchOutcome) -> Vec<&str> {
        outcome
            .results
            .iter()
            .filter_map(|r| r.contact.name.as_deref())
            .collect()
    }

    #[test]
    fn test_parse_example_queries() {
        assert!(parse_query("Which deals are at risk?").at_risk);
        assert_eq!(parse_query("Show me all CTOs").role, Some("cto"));
        assert!(parse_query("Who should I follow up with today?").follow_up);

        let q = parse_query("Deals over $50k in negotiation");
        assert_eq!(q.min_value, Some(50_000.0));
        assert_eq!(q.stage, Some("negotiation"));

        assert_eq!(
            parse_query("Companies with positive sentiment").sentiment,
            Some("positive")
        );
    }

    #[test]
    fn test_small_bare_numbers_are_not_money() {
        assert_eq!(parse_query("deals idle for 3 weeks").min_value, None);
        assert_eq!(parse_query("deals over 75000").min_value, Some(75_000.0));
        assert_eq!(parse_query("deals worth more than 20000").min_value, Some(20_000.0));
        assert_eq!(parse_query("closed won deals from 2024").min_value, None);
        assert_eq!(parse_query("deals over 1e308k").min_value, None);
    }

    #[test]
    fn test_risk_is_a_whole_word() {
        assert!(!parse_query("brisk sales").at_risk);
        assert!(parse_query("show at-risk accounts").at_risk);
        assert!(parse_query("any risky deals?").at_risk);
    }

    #[test]
    fn test_unrecognized_query_uses_free_text() {
        let q = parse_query("Show me Acme");
        assert!(!q.has_filters());
        assert_eq!(q.free_text, vec!["acme".to_string()]);
    }

    #[test]
    fn test_at_risk_search() {
        let now = Utc::now();
        let outcome = keyword_search(&demo_records(now), "Which deals are at risk?", now.date_naive());
        assert_eq!(
            names(&outcome),
            vec!["Michael Chen", "Lisa Rodriguez", "James Wilson", "Tom Becker"]
        );
        assert!(outcome.insights.starts_with("Found 4 records matching at-risk deals."));
        assert!(outcome.insights.contains("$310,000"));
    }

    #[test]
    fn test_cto_search_matches_word_not_substring() {
        let now = Utc::now();
        let outcome = keyword_search(&demo_records(now), "Show me all CTOs", now.date_naive());
        assert_eq!(
            names(&outcome),
            vec!["David Kumar", "Michael Chen", "Sarah Park", "John Smith"]
        );
    }

    #[test]
    fn test_follow_up_search() {
        let now = Utc::now();
        let outcome = keyword_search(
            &demo_records(now),
            "Who should I follow up with today?",
            now.date_naive(),
        );
        assert_eq!(
            names(&outcome),
            vec![
                "Michael Chen",
                "Lisa Rodriguez",
                "Emma Thompson",
                "James Wilson",
                "Robert Martinez"
            ]
        );
    }

    #[test]
    fn test_combined_value_and_stage_filters() {
        let now = Utc::now();
        let outcome = keyword_search(
            &demo_records(now),
            "Deals over $50k in negotiation",
            now.date_naive(),
        );
        assert_eq!(
            names(&outcome),
            vec!["Michael Chen", "Sarah Park", "Lisa Rodriguez", "Emma Thompson"]
        );
        assert!(outcome
            .insights
            .contains("value of at least $50,000, stage Negotiation"));
    }

    #[test]
    fn test_sentiment_search() {
        let now = Utc::now();
        let outcome = keyword_search(&demo_records(now), "negative sentiment", now.date_naive());
        assert_eq!(names(&outcome), vec!["Tom Becker"]);
        assert!(outcome.insights.starts_with("Found 1 record matching"));
    }

    #[test]
    fn test_free_text_search() {
        let now = Utc::now();
        let outcome = keyword_search(&demo_records(now), "show me acme", now.date_naive());
        assert_eq!(names(&outcome), vec!["Emma Thompson", "John Smith"]);
    }

    #[test]
    fn test_no_match_insight() {
        let now = Utc::now();
        let outcome = keyword_search(&demo_records(now), "zebra", now.date_naive());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.insights, "No records matched \"zebra\".");
    }

    #[test]
    fn test_stopwords_only_matches_nothing() {
        let now = Utc::now();
        let outcome = keyword_search(&demo_records(now), "show me all", now.date_naive());
        assert!(outcome.results.is_empty());
    }
}
