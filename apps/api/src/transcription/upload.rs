use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use super::AudioUpload;
use crate::errors::AppError;

/// Upper bound on an audio upload. Synchronous recognition caps audio near this size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "upload";

/// Reads the `file` field of a multipart request. Other fields are ignored.
pub async fn read_audio_upload(mut multipart: Multipart) -> Result<AudioUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        return Ok(AudioUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Audio uploads are limited to {} MiB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ))
    } else {
        AppError::Validation(e.body_text())
    }
}
