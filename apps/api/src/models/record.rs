use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `crm_records` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredRecord {
    pub id: Uuid,
    pub contact_name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub deal_stage: Option<String>,
    pub deal_value: Option<f64>,
    pub products: Vec<String>,
    pub summary: Option<String>,
    pub next_steps: Vec<String>,
    pub sentiment: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub last_contact_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Whole days between the last contact and `today`; never negative.
    pub fn days_since_contact(&self, today: NaiveDate) -> i64 {
        (today - self.last_contact_at.date_naive()).num_days().max(0)
    }

    pub fn stage_lower(&self) -> Option<String> {
        self.deal_stage
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

/// "today", "1 day ago", "N days ago".
pub fn last_contact_label(days: i64) -> String {
    match days {
        d if d <= 0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        d => format!("{d} days ago"),
    }
}
