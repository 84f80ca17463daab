use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AudioUpload, Transcriber, TranscriptionError};

const LANGUAGE_CODE: &str = "en-US";
const MP3_SAMPLE_RATE_HERTZ: u32 = 44_100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Speech-to-Text audio encodings we can infer from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    EncodingUnspecified,
    Linear16,
    Flac,
    Mp3,
    OggOpus,
    WebmOpus,
    Amr,
}

impl AudioEncoding {
    /// Picks the encoding from the extension. Containers the API reads headers
    /// from (and unknown ones, m4a included) stay unspecified.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some("mp3") => AudioEncoding::Mp3,
            Some("flac") => AudioEncoding::Flac,
            Some("wav") => AudioEncoding::Linear16,
            Some("ogg") | Some("opus") => AudioEncoding::OggOpus,
            Some("webm") => AudioEncoding::WebmOpus,
            Some("amr") => AudioEncoding::Amr,
            _ => AudioEncoding::EncodingUnspecified,
        }
    }
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig,
    audio: RecognitionAudio<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: AudioEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate_hertz: Option<u32>,
    language_code: &'static str,
    enable_automatic_punctuation: bool,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio<'a> {
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Joins the top alternative of every result.
    pub(crate) fn transcript(&self) -> String {
        self.results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Synchronous `speech:recognize` against Google Speech-to-Text.
pub struct GoogleSpeechTranscriber {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GoogleSpeechTranscriber {
    pub fn new(api_key: String, api_base: String) -> Result<Self, TranscriptionError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        // v1p1beta1 is the version that accepts MP3.
        format!("{}/v1p1beta1/speech:recognize", self.api_base)
    }
}

#[async_trait]
impl Transcriber for GoogleSpeechTranscriber {
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, TranscriptionError> {
        let encoding = AudioEncoding::from_extension(audio.extension().as_deref());
        let content = STANDARD.encode(&audio.bytes);
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding,
                sample_rate_hertz: (encoding == AudioEncoding::Mp3)
                    .then_some(MP3_SAMPLE_RATE_HERTZ),
                language_code: LANGUAGE_CODE,
                enable_automatic_punctuation: true,
            },
            audio: RecognitionAudio { content: &content },
        };

        debug!(
            "Transcribing '{}' ({} bytes, {:?})",
            audio.file_name,
            audio.bytes.len(),
            encoding
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoogleError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TranscriptionError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: RecognizeResponse = serde_json::from_str(&body)?;
        Ok(parsed.transcript())
    }

    fn backend(&self) -> &'static str {
        "google-speech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_encoding_from_extension() {
        assert_eq!(AudioEncoding::from_extension(Some("mp3")), AudioEncoding::Mp3);
        assert_eq!(
            AudioEncoding::from_extension(Some("m4a")),
            AudioEncoding::EncodingUnspecified
        );
        assert_eq!(
            AudioEncoding::from_extension(None),
            AudioEncoding::EncodingUnspecified
        );
    }

    #[test]
    fn test_encoding_serializes_like_the_api_enum() {
        assert_eq!(
            serde_json::to_value(AudioEncoding::OggOpus).unwrap(),
            json!("OGG_OPUS")
        );
        assert_eq!(
            serde_json::to_value(AudioEncoding::EncodingUnspecified).unwrap(),
            json!("ENCODING_UNSPECIFIED")
        );
    }

    #[test]
    fn test_transcript_joins_top_alternatives() {
        let response: RecognizeResponse = serde_json::from_value(json!({
            "results": [
                { "alternatives": [{ "transcript": "Just had coffee with Sarah.", "confidence": 0.93 },
                                   { "transcript": "Just had toffee with Sarah." }] },
                { "alternatives": [] },
                { "alternatives": [{ "transcript": " She wants a proposal. " }] }
            ]
        }))
        .unwrap();
        assert_eq!(
            response.transcript(),
            "Just had coffee with Sarah. She wants a proposal."
        );
    }

    #[test]
    fn test_empty_response_has_empty_transcript() {
        let response: RecognizeResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.transcript(), "");
    }

    #[tokio::test]
    async fn test_transcribe_sends_base64_mp3() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1p1beta1/speech:recognize")
            .match_header("x-goog-api-key", "k")
            .match_body(Matcher::PartialJson(json!({
                "config": {
                    "encoding": "MP3",
                    "sampleRateHertz": 44100,
                    "languageCode": "en-US",
                    "enableAutomaticPunctuation": true
                },
                "audio": { "content": "aGVsbG8=" }
            })))
            .with_status(200)
            .with_body(json!({ "results": [{ "alternatives": [{ "transcript": "hello" }] }] }).to_string())
            .create_async()
            .await;

        let transcriber = GoogleSpeechTranscriber::new("k".into(), server.url()).unwrap();
        let audio = AudioUpload {
            file_name: "note.mp3".into(),
            content_type: Some("audio/mpeg".into()),
            bytes: Bytes::from_static(b"hello"),
        };
        assert_eq!(transcriber.transcribe(&audio).await.unwrap(), "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transcribe_surfaces_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1p1beta1/speech:recognize")
            .with_status(400)
            .with_body(json!({ "error": { "code": 400, "message": "Invalid recognition config" } }).to_string())
            .create_async()
            .await;

        let transcriber = GoogleSpeechTranscriber::new("k".into(), server.url()).unwrap();
        let audio = AudioUpload {
            file_name: "note.wav".into(),
            content_type: None,
            bytes: Bytes::from_static(b"RIFF"),
        };
        match transcriber.transcribe(&audio).await.unwrap_err() {
            TranscriptionError::Upstream { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid recognition config");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
