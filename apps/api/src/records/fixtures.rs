//! Demo pipeline served when no database is configured (or `NOVA_DEMO_DATA` is set).
//!
//! Dates are relative to the moment the fixtures are built; `FixtureRecordStore`
//! moves them forward each day so staleness and follow-up logic stay put.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::crm::{Contact, CrmRecord, Deal, Interaction};
use crate::models::record::StoredRecord;

struct Seed {
    name: &'static str,
    company: &'static str,
    email: &'static str,
    phone: Option<&'static str>,
    role: &'static str,
    stage: &'static str,
    value: f64,
    products: &'static [&'static str],
    summary: &'static str,
    next_steps: &'static [&'static str],
    sentiment: &'static str,
    days_since_contact: i64,
    /// Offset from today; negative is overdue.
    follow_up_in_days: Option<i64>,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Michael Chen",
        company: "TechFlow Inc",
        email: "michael@techflow.com",
        phone: None,
        role: "CTO",
        stage: "Negotiation",
        value: 120_000.0,
        products: &["Enterprise Plan"],
        summary: "Pricing review stalled after security questionnaire.",
        next_steps: &["Schedule immediate check-in call"],
        sentiment: "positive",
        days_since_contact: 18,
        follow_up_in_days: None,
    },
    Seed {
        name: "Lisa Rodriguez",
        company: "DataCore Systems",
        email: "lisa@datacore.com",
        phone: None,
        role: "VP of Engineering",
        stage: "Negotiation",
        value: 85_000.0,
        products: &["Enterprise Plan", "Analytics Add-on"],
        summary: "Waiting on revised proposal with analytics bundle.",
        next_steps: &["Send follow-up proposal"],
        sentiment: "neutral",
        days_since_contact: 21,
        follow_up_in_days: Some(-3),
    },
    Seed {
        name: "James Wilson",
        company: "CloudNine",
        email: "james@cloudnine.io",
        phone: None,
        role: "Director of Operations",
        stage: "Qualified",
        value: 65_000.0,
        products: &["Team Plan"],
        summary: "Interested but evaluating two other vendors.",
        next_steps: &["Re-engage with updated demo"],
        sentiment: "neutral",
        days_since_contact: 15,
        follow_up_in_days: None,
    },
    Seed {
        name: "Sarah Park",
        company: "InnovateLabs",
        email: "sarah@innovatelabs.com",
        phone: None,
        role: "CTO",
        stage: "Negotiation",
        value: 95_000.0,
        products: &["Enterprise Plan"],
        summary: "Legal review of MSA in progress.",
        next_steps: &["Answer redline questions"],
        sentiment: "positive",
        days_since_contact: 5,
        follow_up_in_days: Some(3),
    },
    Seed {
        name: "David Kumar",
        company: "NextGen AI",
        email: "david@nextgen.ai",
        phone: None,
        role: "CTO & Co-founder",
        stage: "Qualified",
        value: 150_000.0,
        products: &["Enterprise Plan", "API Access"],
        summary: "Needs API rate limits confirmed before committing.",
        next_steps: &["Share API capacity plan"],
        sentiment: "neutral",
        days_since_contact: 7,
        follow_up_in_days: Some(5),
    },
    Seed {
        name: "Emma Thompson",
        company: "Acme Corp",
        email: "emma@acme.com",
        phone: None,
        role: "VP of Sales",
        stage: "Negotiation",
        value: 75_000.0,
        products: &["Enterprise Plan"],
        summary: "Asked for a demo for the regional sales leads.",
        next_steps: &["Promised to send updated proposal today"],
        sentiment: "positive",
        days_since_contact: 7,
        follow_up_in_days: Some(0),
    },
    Seed {
        name: "Robert Martinez",
        company: "GlobalTech",
        email: "robert@globaltech.com",
        phone: None,
        role: "Head of Procurement",
        stage: "Qualified",
        value: 50_000.0,
        products: &["Team Plan"],
        summary: "Procurement wants a live demo before sign-off.",
        next_steps: &["Schedule demo that was discussed"],
        sentiment: "neutral",
        days_since_contact: 10,
        follow_up_in_days: Some(-1),
    },
    Seed {
        name: "John Smith",
        company: "Acme Corp",
        email: "john.smith@acme.com",
        phone: Some("555-0123"),
        role: "CTO",
        stage: "Prospect",
        value: 50_000.0,
        products: &["Enterprise Plan"],
        summary: "Impressed by the enterprise demo; 50 seats under discussion.",
        next_steps: &["Send proposal by Friday", "Book technical deep-dive"],
        sentiment: "positive",
        days_since_contact: 1,
        follow_up_in_days: Some(4),
    },
    Seed {
        name: "Priya Nair",
        company: "Brightwave",
        email: "priya@brightwave.io",
        phone: None,
        role: "Head of Customer Success",
        stage: "Closed Won",
        value: 60_000.0,
        products: &["Team Plan"],
        summary: "Signed annual contract.",
        next_steps: &["Kick off onboarding"],
        sentiment: "positive",
        days_since_contact: 2,
        follow_up_in_days: None,
    },
    Seed {
        name: "Tom Becker",
        company: "Northwind Logistics",
        email: "tom@northwind.com",
        phone: None,
        role: "Operations Manager",
        stage: "At Risk",
        value: 40_000.0,
        products: &["Team Plan"],
        summary: "Budget freeze announced; champion leaving.",
        next_steps: &[],
        sentiment: "negative",
        days_since_contact: 9,
        follow_up_in_days: None,
    },
];

/// Builds the demo records with dates anchored at `now`.
pub fn demo_records(now: DateTime<Utc>) -> Vec<StoredRecord> {
    let today = now.date_naive();
    SEEDS
        .iter()
        .map(|seed| {
            let last_contact_at = now - Duration::days(seed.days_since_contact);
            StoredRecord {
                id: Uuid::new_v4(),
                contact_name: Some(seed.name.to_string()),
                company: Some(seed.company.to_string()),
                email: Some(seed.email.to_string()),
                phone: seed.phone.map(String::from),
                role: Some(seed.role.to_string()),
                deal_stage: Some(seed.stage.to_string()),
                deal_value: Some(seed.value),
                products: seed.products.iter().map(|p| p.to_string()).collect(),
                summary: Some(seed.summary.to_string()),
                next_steps: seed.next_steps.iter().map(|s| s.to_string()).collect(),
                sentiment: Some(seed.sentiment.to_string()),
                follow_up_date: seed
                    .follow_up_in_days
                    .map(|d| today + Duration::days(d)),
                last_contact_at,
                created_at: last_contact_at,
            }
        })
        .collect()
}

pub const SAMPLE_EMAIL: &str = "From: john.smith@acme.com
To: sales@nova.com
Subject: Following up on enterprise demo

Hi there,

Thanks for the demo yesterday. Our team at Acme Corp is really impressed with your enterprise features. We're looking at a potential deal around $50,000 for 50 seats.

Can you send over a proposal by Friday? We'd like to move quickly on this. Let's also schedule a technical deep-dive for next week with our CTO.

Best,
John Smith
CTO, Acme Corp
john.smith@acme.com
555-0123";

pub const SAMPLE_VOICE_TRANSCRIPT: &str = "Just had coffee with Sarah from Acme Corp. She's the VP of Sales and they're really interested in our enterprise plan. Looking at around fifty thousand dollars for their team of 75 people. They want to move fast - need a proposal by next Friday and want to schedule a technical demo for their IT team next week.";

/// The record a correct extraction of `SAMPLE_VOICE_TRANSCRIPT` produces.
pub fn sample_voice_record() -> CrmRecord {
    CrmRecord {
        contact: Contact {
            name: Some("Sarah".to_string()),
            company: Some("Acme Corp".to_string()),
            email: None,
            phone: None,
            role: Some("VP of Sales".to_string()),
        },
        deal: Deal {
            stage: Some("qualified".to_string()),
            value: Some(50_000.0),
            products: vec!["Enterprise Plan".to_string()],
        },
        interaction: Interaction {
            summary: Some(
                "Coffee meeting discussing enterprise plan adoption for a team of 75.".to_string(),
            ),
            action_items: vec![
                "Send proposal by next Friday".to_string(),
                "Schedule technical demo for IT team".to_string(),
            ],
            next_steps: vec![
                "Prepare enterprise proposal".to_string(),
                "Coordinate with technical team for demo".to_string(),
            ],
            follow_up_date: None,
            sentiment: Some("positive".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_records_are_anchored_at_now() {
        let now = Utc::now();
        let records = demo_records(now);
        assert_eq!(records.len(), SEEDS.len());

        let michael = records
            .iter()
            .find(|r| r.contact_name.as_deref() == Some("Michael Chen"))
            .unwrap();
        assert_eq!(michael.days_since_contact(now.date_naive()), 18);
    }

    #[test]
    fn test_sample_voice_record_is_already_normalized() {
        let record = sample_voice_record();
        assert_eq!(record.clone().normalize(), record);
    }
}
