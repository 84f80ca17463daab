//! Transcription: pluggable audio → text backends.
//!
//! `GoogleSpeechTranscriber` calls Speech-to-Text directly;
//! `ProxyTranscriber` forwards the upload to an external service that
//! answers `{ "transcript": ... }`. Held in `AppState` as `Arc<dyn Transcriber>`.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod google;
pub mod handlers;
pub mod proxy;
pub mod upload;

pub use google::GoogleSpeechTranscriber;
pub use proxy::ProxyTranscriber;

/// Returned in place of an empty transcript.
pub const NO_SPEECH_DETECTED: &str = "No speech detected.";

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An uploaded audio file.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl AudioUpload {
    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the transcript, which may be empty when nothing was recognized.
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, TranscriptionError>;

    /// "google-speech" | "proxy", reported by /health.
    fn backend(&self) -> &'static str;
}

/// Substitutes `NO_SPEECH_DETECTED` for a blank transcript.
pub fn or_no_speech(transcript: String) -> String {
    let trimmed = transcript.trim();
    if trimmed.is_empty() {
        NO_SPEECH_DETECTED.to_string()
    } else {
        trimmed.to_string()
    }
}
