// SPDX-License-Identifier: GPL-3.0-only

//! HTTP client for the image inference endpoint

use crate::errors::NetworkError;
use crate::pipelines::photo::CapturedFrame;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Request body: `{"image_b64": "..."}`
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest {
    pub image_b64: String,
}

/// Response body: `{"answer": "..."}`
#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    pub answer: String,
}

/// Answer returned for one picture
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    answer_text: String,
    received_at: DateTime<Local>,
}

impl InferenceResult {
    pub fn new(answer_text: impl Into<String>) -> Self {
        Self {
            answer_text: answer_text.into(),
            received_at: Local::now(),
        }
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn received_at(&self) -> DateTime<Local> {
        self.received_at
    }
}

/// Posts encoded pictures and parses the answer
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    endpoint: String,
}

impl InferenceClient {
    /// Create a client for `endpoint`
    ///
    /// Without a timeout the transport default applies (none).
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!(
            endpoint,
            timeout_secs = ?timeout.map(|t| t.as_secs()),
            "Inference client configured"
        );

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one captured frame and return the answer
    ///
    /// The frame is consumed: its payload does not outlive the request.
    /// Transport failures, non-2xx statuses and malformed bodies all fail. No retry.
    pub async fn analyze(&self, frame: CapturedFrame) -> Result<InferenceResult, NetworkError> {
        let request = AnalyzeRequest {
            image_b64: frame.into_payload(),
        };
        let started = Instant::now();
        debug!(
            endpoint = %self.endpoint,
            payload_len = request.image_b64.len(),
            "Uploading picture"
        );

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        drop(request);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Inference request rejected");
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            answer_len = body.answer.len(),
            "Inference answer received"
        );

        Ok(InferenceResult::new(body.answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = AnalyzeRequest {
            image_b64: "abc123".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"image_b64":"abc123"}"#
        );
    }

    #[test]
    fn test_response_wire_format() {
        let response: AnalyzeResponse = serde_json::from_str(r#"{"answer":"cat"}"#).unwrap();
        assert_eq!(response.answer, "cat");

        // Extra fields are ignored, a missing answer is not
        let response: AnalyzeResponse =
            serde_json::from_str(r#"{"answer":"dog","confidence":0.9}"#).unwrap();
        assert_eq!(response.answer, "dog");
        assert!(serde_json::from_str::<AnalyzeResponse>(r#"{"label":"dog"}"#).is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = InferenceClient::new(&format!("http://{}/analyze", addr), None).unwrap();
        let result = client.analyze(CapturedFrame::from_encoded("abc123")).await;
        assert!(matches!(result, Err(NetworkError::Transport(_))));
    }
}
