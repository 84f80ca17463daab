// Extraction LLM prompt templates.

pub const EXTRACTION_SYSTEM: &str = "\
You are a CRM data-entry assistant for a B2B sales team. \
Read sales emails and meeting transcripts and extract CRM fields. \
You MUST respond with valid JSON only: no markdown fences, no explanations. \
Never guess contact details that are not written in the input.";

/// Replace `{source_kind}`, `{today}` and `{source_text}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract CRM data from the following {source_kind}.

TODAY'S DATE: {today}

INPUT:
{source_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "contact": {
    "name": "string",
    "company": "string",
    "email": "string",
    "phone": "string",
    "role": "string"
  },
  "deal": {
    "stage": "prospect" | "qualified" | "negotiation" | "closed won" | "closed lost" | "",
    "value": number | null,
    "products": ["string"]
  },
  "interaction": {
    "summary": "string",
    "action_items": ["string"],
    "next_steps": ["string"],
    "follow_up_date": "YYYY-MM-DD" | "",
    "sentiment": "positive" | "neutral" | "negative"
  }
}

RULES:
1. Use "" for any contact field that is not stated.
2. deal.value is the total amount in dollars as a plain number (e.g. 50000), or null if no amount is mentioned.
3. Resolve relative dates ("by Friday", "next week") against TODAY'S DATE. Use "" if there is no follow-up date.
4. action_items are things the sales rep promised to do; next_steps are agreed next stages of the deal.
5. summary is one or two sentences.
6. Return ONLY the JSON object, nothing else, no code fences."#;

#[derive(Debug, Clone, Copy)]
pub enum SourceKind {
    Email,
    VoiceTranscript,
}

impl SourceKind {
    fn describe(self) -> &'static str {
        match self {
            SourceKind::Email => "sales email",
            SourceKind::VoiceTranscript => "voice note transcript",
        }
    }
}

pub fn build_extraction_prompt(kind: SourceKind, source_text: &str, today: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{source_kind}", kind.describe())
        .replace("{today}", today)
        .replace("{source_text}", source_text)
}
