use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::prompts::SourceKind;
use crate::extraction::{extract_record, validate_source};
use crate::models::crm::CrmRecord;
use crate::state::AppState;
use crate::transcription::{upload::read_audio_upload, NO_SPEECH_DETECTED};

#[derive(Debug, Deserialize)]
pub struct ExtractEmailRequest {
    #[serde(rename = "emailText", alias = "email_text", default)]
    pub email_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractEmailResponse {
    pub success: bool,
    pub data: CrmRecord,
}

#[derive(Debug, Serialize)]
pub struct ExtractVoiceResponse {
    pub success: bool,
    pub transcript: String,
    pub data: CrmRecord,
}

/// POST /api/extract-email
pub async fn handle_extract_email(
    State(state): State<AppState>,
    req: Result<Json<ExtractEmailRequest>, JsonRejection>,
) -> Result<Json<ExtractEmailResponse>, AppError> {
    let Json(req) = req?;
    validate_source("emailText", &req.email_text)?;
    let llm = state.llm()?;

    let data = extract_record(llm, SourceKind::Email, &req.email_text).await?;
    Ok(Json(ExtractEmailResponse {
        success: true,
        data,
    }))
}

/// POST /api/extract-voice
///
/// Transcribes the uploaded voice note, then extracts a CRM record from the transcript.
pub async fn handle_extract_voice(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractVoiceResponse>, AppError> {
    let audio = read_audio_upload(multipart).await?;
    let transcriber = state.transcriber()?;
    let llm = state.llm()?;

    let transcript = transcriber.transcribe(&audio).await?;
    let transcript = transcript.trim();
    if transcript.is_empty() {
        info!("No speech detected in '{}'", audio.file_name);
        return Ok(Json(ExtractVoiceResponse {
            success: true,
            transcript: NO_SPEECH_DETECTED.to_string(),
            data: CrmRecord::no_speech(NO_SPEECH_DETECTED),
        }));
    }

    validate_source("transcript", transcript)?;
    let data = extract_record(llm, SourceKind::VoiceTranscript, transcript).await?;
    Ok(Json(ExtractVoiceResponse {
        success: true,
        transcript: transcript.to_string(),
        data,
    }))
}
