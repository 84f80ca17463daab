// Search LLM prompt templates.

pub const SEARCH_SYSTEM: &str = "\
You are a sales assistant answering questions about a CRM pipeline. \
You only ever refer to records by the ids you are given. \
You MUST respond with valid JSON only: no markdown fences, no explanations.";

/// Replace `{today}`, `{query}` and `{records}` before sending.
pub const SEARCH_PROMPT_TEMPLATE: &str = r#"Answer the user's question about the CRM records below.

TODAY'S DATE: {today}

QUESTION:
{query}

RECORDS (one JSON object per line):
{records}

RISK GUIDE:
- Closed won and closed lost deals are "low".
- An open deal in stage "at risk", or not contacted for 18 days or more, is "high".
- An open deal not contacted for 14 days or more is "medium".
- Everything else is "low".

OUTPUT SCHEMA (return exactly this structure):
{
  "insights": "one or two sentences answering the question",
  "matches": [
    {
      "id": "record id copied from RECORDS",
      "risk_level": "high" | "medium" | "low",
      "suggestion": "short next action for the sales rep"
    }
  ]
}

RULES:
1. Only include records that answer the question. Use an empty list if none do.
2. Copy ids exactly as given. Never make up an id.
3. Order matches from most to least relevant.
4. Return ONLY the JSON object, nothing else."#;

pub fn build_search_prompt(query: &str, records: &str, today: &str) -> String {
    SEARCH_PROMPT_TEMPLATE
        .replace("{today}", today)
        .replace("{query}", query)
        .replace("{records}", records)
}
