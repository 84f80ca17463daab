//! The CRM record: contact, deal and interaction groups.
//!
//! Records come from the LLM, so deserialization is lenient. Every field
//! defaults, and `deal.value` also accepts money strings. `normalize` trims
//! and cleans what the model returned before it leaves the service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmRecord {
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub deal: Deal,
    #[serde(default)]
    pub interaction: Interaction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Free text; "qualified", "negotiation", "closed won", ...
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_deal_value")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub action_items: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub follow_up_date: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl CrmRecord {
    /// Trims strings, drops empties and duplicate list items, lowercases sentiment.
    pub fn normalize(mut self) -> Self {
        let c = &mut self.contact;
        for field in [
            &mut c.name,
            &mut c.company,
            &mut c.email,
            &mut c.phone,
            &mut c.role,
        ] {
            clean_opt(field);
        }

        clean_opt(&mut self.deal.stage);
        self.deal.value = self.deal.value.filter(|v| v.is_finite() && *v >= 0.0);
        clean_list(&mut self.deal.products);

        let i = &mut self.interaction;
        clean_opt(&mut i.summary);
        clean_opt(&mut i.follow_up_date);
        clean_opt(&mut i.sentiment);
        i.sentiment = i.sentiment.take().map(|s| s.to_lowercase());
        clean_list(&mut i.action_items);
        clean_list(&mut i.next_steps);

        self
    }

    /// Record returned when a voice note contained no recognizable speech.
    pub fn no_speech(summary: &str) -> Self {
        CrmRecord {
            interaction: Interaction {
                summary: Some(summary.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn clean_opt(field: &mut Option<String>) {
    *field = field
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
}

fn clean_list(items: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        let item = item.trim().to_string();
        if !item.is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    *items = seen;
}

/// Accepts a number, `null`, or a money string like `"$50,000"`, `"50k"`, `"1.5M"`.
fn deserialize_deal_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_money(&s),
        _ => None,
    })
}

/// Accepts a list of strings, a single string, or `null`. Non-string items are skipped.
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}

/// Parses a human money amount. Returns `None` for anything that isn't one.
pub fn parse_money(input: &str) -> Option<f64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(|c: char| matches!(c, '$' | '€' | '£'))
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();
    let lower = cleaned.to_ascii_lowercase();

    let (digits, multiplier) = if let Some(d) = lower.strip_suffix('k') {
        (d, 1_000.0)
    } else if let Some(d) = lower.strip_suffix('m') {
        (d, 1_000_000.0)
    } else if let Some(d) = lower.strip_suffix('b') {
        (d, 1_000_000_000.0)
    } else {
        (lower.as_str(), 1.0)
    };

    let amount = digits.parse::<f64>().ok()? * multiplier;
    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}
