//! Dashboard: pipeline analytics over stored records.

pub mod handlers;
pub mod metrics;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::record::StoredRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    Month,
    #[default]
    All,
}

impl Timeframe {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "all" | "" => Ok(Timeframe::All),
            other => Err(AppError::Validation(format!(
                "unknown timeframe '{other}' (expected week, month or all)"
            ))),
        }
    }

    fn days(self) -> Option<i64> {
        match self {
            Timeframe::Week => Some(7),
            Timeframe::Month => Some(30),
            Timeframe::All => None,
        }
    }

    /// Start of the earliest day inside the window, `None` for all time.
    pub fn since(self, today: NaiveDate) -> Option<DateTime<Utc>> {
        let start = today - Duration::days(self.days()?);
        start
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageBreakdown {
    pub stage: String,
    pub count: usize,
    pub value: f64,
    /// Share of total pipeline value.
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityAction {
    pub action: String,
    pub reason: String,
    pub deal_value: Option<f64>,
    pub priority: Priority,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopAccount {
    pub name: Option<String>,
    pub company: Option<String>,
    pub value: Option<f64>,
    pub sentiment: Option<String>,
    pub last_contact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub timeframe: Timeframe,
    pub total_contacts: usize,
    pub total_pipeline: f64,
    pub at_risk_deals: usize,
    pub won_deals: usize,
    pub avg_deal_size: f64,
    pub conversion_rate: f64,
    pub deals_by_stage: Vec<StageBreakdown>,
    pub sentiment: SentimentCounts,
    pub priority_actions: Vec<PriorityAction>,
    pub top_accounts: Vec<TopAccount>,
}

/// Reduces `records` (already limited to the timeframe) into the dashboard.
pub fn build_report(
    records: &[StoredRecord],
    timeframe: Timeframe,
    today: NaiveDate,
) -> DashboardReport {
    let total_contacts = records.len();
    let total_pipeline = metrics::total_pipeline(records);
    let won_deals = metrics::won_deals(records);

    DashboardReport {
        timeframe,
        total_contacts,
        total_pipeline,
        at_risk_deals: metrics::at_risk_deals(records),
        won_deals,
        avg_deal_size: if total_contacts == 0 {
            0.0
        } else {
            total_pipeline / total_contacts as f64
        },
        conversion_rate: metrics::rate(won_deals, total_contacts),
        deals_by_stage: metrics::deals_by_stage(records),
        sentiment: metrics::sentiment_counts(records),
        priority_actions: metrics::priority_actions(records, today),
        top_accounts: metrics::top_accounts(records, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::demo_records;
    use crate::records::store::{FixtureRecordStore, RecordStore};

    #[test]
    fn test_empty_report() {
        let report = build_report(&[], Timeframe::All, Utc::now().date_naive());
        assert_eq!(report.total_contacts, 0);
        assert_eq!(report.total_pipeline, 0.0);
        assert_eq!(report.avg_deal_size, 0.0);
        assert_eq!(report.conversion_rate, 0.0);
        assert!(report.deals_by_stage.is_empty());
        assert_eq!(report.sentiment, SentimentCounts::default());
        assert!(report.priority_actions.is_empty());
        assert!(report.top_accounts.is_empty());
    }

    #[test]
    fn test_fixture_report() {
        let now = Utc::now();
        let report = build_report(&demo_records(now), Timeframe::All, now.date_naive());
        assert_eq!(report.total_contacts, 10);
        assert_eq!(report.total_pipeline, 790_000.0);
        assert_eq!(report.at_risk_deals, 1);
        assert_eq!(report.won_deals, 1);
        assert_eq!(report.avg_deal_size, 79_000.0);
        assert_eq!(report.conversion_rate, 10.0);
        assert_eq!(
            report.sentiment,
            SentimentCounts {
                positive: 5,
                neutral: 4,
                negative: 1,
                unknown: 0
            }
        );
        assert_eq!(report.priority_actions.len(), 5);
        assert_eq!(report.top_accounts.len(), 3);
    }

    #[test]
    fn test_report_serializes_snake_case() {
        let now = Utc::now();
        let report = build_report(&demo_records(now), Timeframe::Week, now.date_naive());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["timeframe"], "week");
        assert_eq!(json["priority_actions"][0]["priority"], "urgent");
        assert!(json["deals_by_stage"][0]["percentage"].is_u64());
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::parse("Week").unwrap(), Timeframe::Week);
        assert_eq!(Timeframe::parse("").unwrap(), Timeframe::All);
        assert!(matches!(
            Timeframe::parse("year"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_timeframe_since_is_start_of_day() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        let since = Timeframe::Week.since(today).unwrap();
        assert_eq!(since, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(Timeframe::All.since(today), None);
    }

    #[tokio::test]
    async fn test_week_timeframe_keeps_recent_records() {
        let now = Utc::now();
        let store = FixtureRecordStore::new(demo_records(now));
        let today = now.date_naive();
        let records = store
            .contacted_since(Timeframe::Week.since(today))
            .await
            .unwrap();
        let report = build_report(&records, Timeframe::Week, today);
        // Sarah, David, Emma, John, Priya.
        assert_eq!(report.total_contacts, 5);
        assert_eq!(report.won_deals, 1);
        assert_eq!(report.conversion_rate, 20.0);
    }
}
