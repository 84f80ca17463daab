// Shared prompt fragments.
// Each feature module that calls the LLM keeps its own prompts.rs alongside it.

/// Appended to every prompt that reads customer data.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the provided input. \
    Do NOT invent names, companies, emails, phone numbers or amounts. \
    If a value is not stated, leave it empty.";
