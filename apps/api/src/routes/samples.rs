// Canned inputs for the demo UI's "try a sample" buttons.

use axum::Json;
use serde::Serialize;

use crate::models::crm::CrmRecord;
use crate::records::fixtures::{sample_voice_record, SAMPLE_EMAIL, SAMPLE_VOICE_TRANSCRIPT};

#[derive(Debug, Serialize)]
pub struct SampleEmail {
    #[serde(rename = "emailText")]
    pub email_text: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SampleVoice {
    pub transcript: &'static str,
    pub data: CrmRecord,
}

/// GET /api/samples/email
pub async fn sample_email() -> Json<SampleEmail> {
    Json(SampleEmail {
        email_text: SAMPLE_EMAIL,
    })
}

/// GET /api/samples/voice
pub async fn sample_voice() -> Json<SampleVoice> {
    Json(SampleVoice {
        transcript: SAMPLE_VOICE_TRANSCRIPT,
        data: sample_voice_record(),
    })
}
