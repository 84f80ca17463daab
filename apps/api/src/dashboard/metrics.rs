// Pure reductions over stored records. No I/O.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::crm::risk::{
    assess_record, follow_up_state, FollowUp, RiskLevel, HIGH_RISK_AFTER_DAYS,
};
use crate::crm::stage::{display_name, is_open, pipeline_position, AT_RISK, CLOSED_WON};
use crate::dashboard::{Priority, PriorityAction, SentimentCounts, StageBreakdown, TopAccount};
use crate::models::record::{last_contact_label, StoredRecord};
use crate::search::sort_by_value;

pub const MAX_PRIORITY_ACTIONS: usize = 5;
pub const TOP_ACCOUNTS: usize = 3;

const UNSPECIFIED_STAGE: &str = "Unspecified";

pub fn total_pipeline(records: &[StoredRecord]) -> f64 {
    records.iter().filter_map(|r| r.deal_value).sum()
}

pub fn count_stage(records: &[StoredRecord], stage: &str) -> usize {
    records
        .iter()
        .filter(|r| r.stage_lower().as_deref() == Some(stage))
        .count()
}

pub fn at_risk_deals(records: &[StoredRecord]) -> usize {
    count_stage(records, AT_RISK)
}

pub fn won_deals(records: &[StoredRecord]) -> usize {
    count_stage(records, CLOSED_WON)
}

/// Percentage rounded to one decimal; 0 when `whole` is 0.
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// Integer share of `total`, rounded; 0 when `total` is not positive.
fn share(value: f64, total: f64) -> u32 {
    if total <= 0.0 {
        return 0;
    }
    (value / total * 100.0).round() as u32
}

/// Sort key: known stages in pipeline order, then others alphabetically,
/// then records without a stage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum StageKey {
    Known(usize),
    Other(String),
    Unspecified,
}

fn stage_key(record: &StoredRecord) -> StageKey {
    match record.stage_lower() {
        Some(stage) => match pipeline_position(&stage) {
            Some(pos) => StageKey::Known(pos),
            None => StageKey::Other(stage),
        },
        None => StageKey::Unspecified,
    }
}

pub fn deals_by_stage(records: &[StoredRecord]) -> Vec<StageBreakdown> {
    let total = total_pipeline(records);
    let mut groups: BTreeMap<StageKey, (String, usize, f64)> = BTreeMap::new();

    for record in records {
        let key = stage_key(record);
        let entry = groups.entry(key).or_insert_with(|| {
            let name = record
                .stage_lower()
                .map(|s| display_name(&s))
                .unwrap_or_else(|| UNSPECIFIED_STAGE.to_string());
            (name, 0, 0.0)
        });
        entry.1 += 1;
        entry.2 += record.deal_value.unwrap_or(0.0);
    }

    groups
        .into_values()
        .map(|(stage, count, value)| StageBreakdown {
            stage,
            count,
            value,
            percentage: share(value, total),
        })
        .collect()
}

pub fn sentiment_counts(records: &[StoredRecord]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for record in records {
        let sentiment = record.sentiment.as_deref().map(|s| s.trim().to_lowercase());
        match sentiment.as_deref() {
            Some("positive") => counts.positive += 1,
            Some("neutral") => counts.neutral += 1,
            Some("negative") => counts.negative += 1,
            _ => counts.unknown += 1,
        }
    }
    counts
}

fn display_contact(record: &StoredRecord) -> String {
    record
        .contact_name
        .clone()
        .or_else(|| record.company.clone())
        .unwrap_or_else(|| "unknown contact".to_string())
}

fn priority_action(record: &StoredRecord, today: NaiveDate) -> Option<PriorityAction> {
    if !is_open(record.stage_lower().as_deref()) {
        return None;
    }
    let name = display_contact(record);
    let days = record.days_since_contact(today);
    let marked_at_risk = record.stage_lower().as_deref() == Some(AT_RISK);
    let follow_up_step = || {
        record
            .next_steps
            .first()
            .cloned()
            .unwrap_or_else(|| format!("Follow up with {name}"))
    };

    let (priority, action, reason) = match assess_record(record, today) {
        RiskLevel::High if marked_at_risk && days < HIGH_RISK_AFTER_DAYS => (
            Priority::Urgent,
            format!("Rescue deal with {name}"),
            "Deal marked at risk".to_string(),
        ),
        RiskLevel::High => (
            Priority::Urgent,
            format!("Follow up with {name}"),
            format!("No contact in {days} days"),
        ),
        RiskLevel::Medium => (
            Priority::High,
            format!("Re-engage {name}"),
            format!("No contact in {days} days"),
        ),
        RiskLevel::Low => match (follow_up_state(record, today), record.follow_up_date) {
            (FollowUp::Overdue, Some(date)) => (
                Priority::High,
                follow_up_step(),
                format!("Follow-up was due {}", date.format("%Y-%m-%d")),
            ),
            (FollowUp::DueToday, _) => (
                Priority::Medium,
                follow_up_step(),
                "Follow-up due today".to_string(),
            ),
            _ => return None,
        },
    };

    Some(PriorityAction {
        action,
        reason,
        deal_value: record.deal_value,
        priority,
        company: record.company.clone(),
    })
}

/// Most pressing first, then by deal value.
pub fn priority_actions(records: &[StoredRecord], today: NaiveDate) -> Vec<PriorityAction> {
    let mut refs: Vec<&StoredRecord> = records.iter().collect();
    sort_by_value(&mut refs);

    let mut actions: Vec<PriorityAction> = refs
        .into_iter()
        .filter_map(|r| priority_action(r, today))
        .collect();
    // Stable sort keeps the value order within a priority.
    actions.sort_by_key(|a| a.priority);
    actions.truncate(MAX_PRIORITY_ACTIONS);
    actions
}

pub fn top_accounts(records: &[StoredRecord], today: NaiveDate) -> Vec<TopAccount> {
    let mut refs: Vec<&StoredRecord> = records.iter().filter(|r| r.deal_value.is_some()).collect();
    sort_by_value(&mut refs);
    refs.into_iter()
        .take(TOP_ACCOUNTS)
        .map(|r| TopAccount {
            name: r.contact_name.clone(),
            company: r.company.clone(),
            value: r.deal_value,
            sentiment: r.sentiment.clone(),
            last_contact: last_contact_label(r.days_since_contact(today)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::demo_records;
    use chrono::Utc;

    fn names(actions: &[PriorityAction]) -> Vec<&str> {
        actions.iter().map(|a| a.action.as_str()).collect()
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 3), 33.3);
        assert_eq!(rate(2, 3), 66.7);
        assert_eq!(rate(1, 10), 10.0);
    }

    #[test]
    fn test_stage_order_and_percentages() {
        let now = Utc::now();
        let stages = deals_by_stage(&demo_records(now));
        let summary: Vec<(&str, usize, u32)> = stages
            .iter()
            .map(|s| (s.stage.as_str(), s.count, s.percentage))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Prospect", 1, 6),
                ("Qualified", 3, 34),
                ("Negotiation", 4, 47),
                ("At Risk", 1, 5),
                ("Closed Won", 1, 8),
            ]
        );
        assert_eq!(stages[2].value, 375_000.0);
    }

    #[test]
    fn test_unknown_and_missing_stages_sort_last() {
        let now = Utc::now();
        let mut records = demo_records(now);
        records[0].deal_stage = Some("Discovery".to_string());
        records[1].deal_stage = None;
        records[2].deal_stage = Some("  DISCOVERY ".to_string());
        let stages = deals_by_stage(&records);
        let tail: Vec<&str> = stages.iter().rev().take(2).map(|s| s.stage.as_str()).collect();
        assert_eq!(tail, vec!["Unspecified", "Discovery"]);
        assert_eq!(stages[stages.len() - 2].count, 2);
    }

    #[test]
    fn test_zero_pipeline_gives_zero_percentages() {
        let now = Utc::now();
        let mut records = demo_records(now);
        for r in &mut records {
            r.deal_value = None;
        }
        assert!(deals_by_stage(&records).iter().all(|s| s.percentage == 0));
    }

    #[test]
    fn test_sentiment_counts() {
        let now = Utc::now();
        let mut records = demo_records(now);
        records[0].sentiment = None;
        let counts = sentiment_counts(&records);
        assert_eq!(
            counts.positive + counts.neutral + counts.negative + counts.unknown,
            records.len()
        );
        assert_eq!(counts.unknown, 1);
    }

    #[test]
    fn test_priority_actions_order_and_cap() {
        let now = Utc::now();
        let actions = priority_actions(&demo_records(now), now.date_naive());
        assert_eq!(
            names(&actions),
            vec![
                "Follow up with Michael Chen",
                "Follow up with Lisa Rodriguez",
                "Rescue deal with Tom Becker",
                "Re-engage James Wilson",
                "Schedule demo that was discussed",
            ]
        );
        assert_eq!(actions[0].priority, Priority::Urgent);
        assert_eq!(actions[0].reason, "No contact in 18 days");
        assert_eq!(actions[3].priority, Priority::High);
        assert!(actions[4].reason.starts_with("Follow-up was due "));
    }

    #[test]
    fn test_follow_up_due_today_is_medium() {
        let now = Utc::now();
        let records: Vec<StoredRecord> = demo_records(now)
            .into_iter()
            .filter(|r| r.contact_name.as_deref() == Some("Emma Thompson"))
            .collect();
        let actions = priority_actions(&records, now.date_naive());
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].priority, Priority::Medium);
        assert_eq!(actions[0].action, "Promised to send updated proposal today");
        assert_eq!(actions[0].reason, "Follow-up due today");
    }

    #[test]
    fn test_top_accounts() {
        let now = Utc::now();
        let top = top_accounts(&demo_records(now), now.date_naive());
        let names: Vec<&str> = top.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec!["David Kumar", "Michael Chen", "Sarah Park"]);
        assert_eq!(top[0].last_contact, "7 days ago");
    }
}
