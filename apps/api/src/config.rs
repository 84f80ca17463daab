use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SPEECH_API_BASE: &str = "https://speech.googleapis.com";

/// Application configuration loaded from environment variables.
///
/// Every external backend is optional. A missing `DATABASE_URL` selects the
/// fixture record store, a missing `GOOGLE_API_KEY` disables AI extraction.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub speech_api_base: String,
    pub transcribe_proxy_url: Option<String>,
    pub cors_allowed_origin: String,
    pub demo_data: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            speech_api_base: optional_env("SPEECH_API_BASE")
                .unwrap_or_else(|| DEFAULT_SPEECH_API_BASE.to_string()),
            transcribe_proxy_url: optional_env("TRANSCRIBE_PROXY_URL"),
            cors_allowed_origin: optional_env("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            demo_data: parse_flag(optional_env("NOVA_DEMO_DATA").as_deref())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("NOVA_DEMO_DATA must be a boolean, got '{other}'"),
        },
    }
}
