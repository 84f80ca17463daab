use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::crm::stage::{is_open, AT_RISK};
use crate::models::record::StoredRecord;

/// Days without contact after which an open deal counts as stale.
pub const STALE_AFTER_DAYS: i64 = 14;
/// Days without contact after which an open deal is high risk.
pub const HIGH_RISK_AFTER_DAYS: i64 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Action suggested to a rep for this level of risk.
    pub fn suggestion(self) -> Option<&'static str> {
        match self {
            RiskLevel::High => Some("Schedule immediate check-in call"),
            RiskLevel::Medium => Some("Re-engage with updated demo"),
            RiskLevel::Low => None,
        }
    }
}

/// Classifies a deal by stage and staleness.
///
/// Closed deals are always low. An open deal marked "at risk", or untouched
/// for 18+ days, is high; 14+ days is medium.
pub fn assess(stage: Option<&str>, days_since_contact: i64) -> RiskLevel {
    let stage = stage.map(|s| s.trim().to_lowercase());
    if !is_open(stage.as_deref()) {
        return RiskLevel::Low;
    }
    if stage.as_deref() == Some(AT_RISK) || days_since_contact >= HIGH_RISK_AFTER_DAYS {
        RiskLevel::High
    } else if days_since_contact >= STALE_AFTER_DAYS {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn assess_record(record: &StoredRecord, today: NaiveDate) -> RiskLevel {
    assess(record.deal_stage.as_deref(), record.days_since_contact(today))
}

/// Follow-up date state relative to `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Overdue,
    DueToday,
    Upcoming,
    None,
}

pub fn follow_up_state(record: &StoredRecord, today: NaiveDate) -> FollowUp {
    match record.follow_up_date {
        Some(d) if d < today => FollowUp::Overdue,
        Some(d) if d == today => FollowUp::DueToday,
        Some(_) => FollowUp::Upcoming,
        None => FollowUp::None,
    }
}
