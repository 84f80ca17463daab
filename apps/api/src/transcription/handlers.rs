use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::transcription::{or_no_speech, upload::read_audio_upload};

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

/// POST /transcribe-audio/
///
/// Upload an audio file as multipart field `file` and get its transcript.
pub async fn handle_transcribe_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    let audio = read_audio_upload(multipart).await?;
    let transcriber = state.transcriber()?;
    info!(
        "Transcribing '{}' via {}",
        audio.file_name,
        transcriber.backend()
    );

    let transcript = transcriber.transcribe(&audio).await?;
    Ok(Json(TranscribeResponse {
        transcript: or_no_speech(transcript),
    }))
}
