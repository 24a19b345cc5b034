//! Frame upload to the inference service
//!
//! Serializes a capture request into the service's JSON shape (base64 frame
//! bytes plus the question) and performs a single POST exchange. The frame
//! is already JPEG so its bytes go out as-is; nothing here retries or
//! surfaces failures into the orchestrator.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::Value;

use crate::capture::CaptureRequest;
use crate::{Error, Result};

/// Request body for the `/explain-image/` exchange
#[derive(Serialize)]
struct ExplainRequest<'a> {
    filename: &'a str,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<&'a str>,
}

/// Sends captured frames to the inference service and extracts the answer
pub struct Uploader {
    client: reqwest::Client,
    base_url: String,
}

impl Uploader {
    /// Create an uploader for the given inference-service base URL
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Perform one capture exchange, returning the spoken answer if present
    ///
    /// The answer is read from the top-level `message` field or nested at
    /// `response.message`; `Ok(None)` means the exchange succeeded but no
    /// message was found.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    pub async fn explain(&self, request: &CaptureRequest) -> Result<Option<String>> {
        let filename = request.filename();
        let body = ExplainRequest {
            filename: &filename,
            data: BASE64.encode(request.frame.data()),
            question: if request.question.is_empty() {
                None
            } else {
                Some(&request.question)
            },
        };

        let url = format!("{}/explain-image/", self.base_url);
        tracing::debug!(
            url,
            filename,
            frame_bytes = request.frame.len(),
            "uploading capture"
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "inference service error {status}: {body}"
            )));
        }

        let value: Value = response.json().await?;
        let message = extract_message(&value);
        if message.is_none() {
            tracing::debug!(%value, "no message field in inference response");
        }
        Ok(message)
    }
}

/// Pull the human-readable answer out of `{message}` or `{response: {message}}`
fn extract_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .get("response")
                .and_then(|nested| nested.get("message"))
                .and_then(Value::as_str)
        })
        .map(ToString::to_string)
}
