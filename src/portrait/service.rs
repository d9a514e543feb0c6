// SPDX-License-Identifier: MPL-2.0
//! Client for the hosted live-portrait animation service.

use super::controller::SubmissionError;
use super::request::SubmissionRequest;
use super::result::VideoPayload;
use crate::config::{ServiceSettings, API_KEY_HEADER};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Animates a face image. Implemented over HTTP and by test doubles.
#[async_trait]
pub trait AnimationService: Send + Sync {
    async fn animate(&self, request: &SubmissionRequest) -> Result<VideoPayload, SubmissionError>;
}

/// POSTs requests as JSON and expects a binary video back.
#[derive(Clone)]
pub struct HttpAnimationService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for HttpAnimationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAnimationService")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpAnimationService {
    /// Returns `None` when no API key is configured.
    pub fn from_settings(client: reqwest::Client, settings: &ServiceSettings) -> Option<Self> {
        let api_key = settings.api_key.clone()?;
        Some(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
            timeout: settings.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnimationService for HttpAnimationService {
    async fn animate(&self, request: &SubmissionRequest) -> Result<VideoPayload, SubmissionError> {
        tracing::info!(endpoint = %self.endpoint, "submitting face image");

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "*/*")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        interpret_response(status, content_type.as_deref(), body)
    }
}

/// Maps a service response onto a payload or a submission error.
///
/// 400 means the service rejected the face image.
pub fn interpret_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<VideoPayload, SubmissionError> {
    if status.is_success() {
        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        tracing::info!(%status, %content_type, len = body.len(), "animation service answered");
        return Ok(VideoPayload {
            bytes: body,
            content_type,
        });
    }

    let preview = String::from_utf8_lossy(&body[..body.len().min(256)]).into_owned();
    tracing::warn!(%status, body = %preview, "animation service rejected the request");

    if status == StatusCode::BAD_REQUEST {
        Err(SubmissionError::InvalidInput)
    } else {
        Err(SubmissionError::Service {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    #[test]
    fn success_keeps_bytes_and_content_type() {
        let payload = interpret_response(
            StatusCode::OK,
            Some("video/mp4"),
            Bytes::from_static(b"mp4-bytes"),
        )
        .expect("success");

        assert_eq!(payload.content_type, "video/mp4");
        assert_eq!(payload.bytes, Bytes::from_static(b"mp4-bytes"));
    }

    #[test]
    fn missing_content_type_falls_back() {
        let payload = interpret_response(StatusCode::OK, None, Bytes::new()).expect("success");
        assert_eq!(payload.content_type, FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn bad_request_is_invalid_face() {
        let err = interpret_response(
            StatusCode::BAD_REQUEST,
            Some("application/json"),
            Bytes::from_static(br#"{"error":"no face detected"}"#),
        )
        .expect_err("400 must fail");

        assert_eq!(err, SubmissionError::InvalidInput);
        assert_eq!(err.to_string(), "Invalid Face image");
    }

    #[test]
    fn other_failures_keep_status() {
        let err = interpret_response(StatusCode::SERVICE_UNAVAILABLE, None, Bytes::new())
            .expect_err("503 must fail");
        assert_eq!(err, SubmissionError::Service { status: 503 });
    }

    #[test]
    fn service_needs_an_api_key() {
        let without = ServiceSettings::resolve_with_env(&ServiceConfig::default(), None);
        assert!(HttpAnimationService::from_settings(reqwest::Client::new(), &without).is_none());

        let with = ServiceSettings::resolve_with_env(&ServiceConfig::default(), Some("k".into()));
        let service = HttpAnimationService::from_settings(reqwest::Client::new(), &with)
            .expect("service");
        assert_eq!(service.endpoint(), crate::config::DEFAULT_SERVICE_ENDPOINT);
    }
}
