use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AudioUpload, Transcriber, TranscriptionError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    transcript: Option<String>,
    error: Option<String>,
}

/// Forwards the upload as multipart field `file` to an external transcription service.
pub struct ProxyTranscriber {
    client: Client,
    url: String,
}

impl ProxyTranscriber {
    pub fn new(url: String) -> Result<Self, TranscriptionError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            url,
        })
    }
}

#[async_trait]
impl Transcriber for ProxyTranscriber {
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, TranscriptionError> {
        let file_part = || Part::bytes(audio.bytes.to_vec()).file_name(audio.file_name.clone());
        // A client-supplied type that is not a valid MIME type is dropped.
        let part = match audio.content_type.as_deref() {
            Some(content_type) => file_part().mime_str(content_type).unwrap_or_else(|_| {
                warn!("Ignoring invalid content type '{content_type}' for '{}'", audio.file_name);
                file_part()
            }),
            None => file_part(),
        };
        let form = Form::new().part("file", part);

        debug!("Forwarding '{}' to {}", audio.file_name, self.url);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = serde_json::from_str::<ProxyResponse>(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|p| p.error)
                .unwrap_or(body);
            return Err(TranscriptionError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = parsed?;
        if let Some(message) = parsed.error {
            return Err(TranscriptionError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(parsed.transcript.unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "proxy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::Matcher;
    use serde_json::json;

    fn audio() -> AudioUpload {
        AudioUpload {
            file_name: "meeting.m4a".into(),
            content_type: Some("audio/mp4".into()),
            bytes: Bytes::from_static(b"fake-audio"),
        }
    }

    #[tokio::test]
    async fn test_forwards_file_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/transcribe-audio/")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="meeting.m4a""#.to_string()),
                Matcher::Regex("fake-audio".to_string()),
            ]))
            .with_status(200)
            .with_body(json!({ "transcript": "Call with Lisa" }).to_string())
            .create_async()
            .await;

        let transcriber =
            ProxyTranscriber::new(format!("{}/transcribe-audio/", server.url())).unwrap();
        assert_eq!(transcriber.transcribe(&audio()).await.unwrap(), "Call with Lisa");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/transcribe-audio/")
            .with_status(500)
            .with_body(json!({ "error": "credentials not found" }).to_string())
            .create_async()
            .await;

        let transcriber =
            ProxyTranscriber::new(format!("{}/transcribe-audio/", server.url())).unwrap();
        match transcriber.transcribe(&audio()).await.unwrap_err() {
            TranscriptionError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "credentials not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_transcript_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/t")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let transcriber = ProxyTranscriber::new(format!("{}/t", server.url())).unwrap();
        assert_eq!(transcriber.transcribe(&audio()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_invalid_content_type_is_ignored() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/t")
            .match_body(Matcher::Regex(r#"filename="meeting.m4a""#.to_string()))
            .with_status(200)
            .with_body(json!({ "transcript": "Call with Lisa" }).to_string())
            .create_async()
            .await;

        let upload = AudioUpload {
            content_type: Some("not a mime type".into()),
            ..audio()
        };
        let transcriber = ProxyTranscriber::new(format!("{}/t", server.url())).unwrap();
        assert_eq!(transcriber.transcribe(&upload).await.unwrap(), "Call with Lisa");
        mock.assert_async().await;
    }
}
