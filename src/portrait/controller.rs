// SPDX-License-Identifier: MPL-2.0
//! Submission state machine: idle, loading, then a new result or an error.
//!
//! The Iced update loop cannot hold `&mut` across an await, so a submission
//! is split in three steps:
//!
//! 1. [`SubmissionController::begin`] validates and raises the busy flag.
//! 2. [`PendingSubmission::run`] does the async work off the update loop.
//! 3. [`SubmissionController::finish`] lowers the flag and stores the result.

use super::encoder::{EncodeError, Encoder};
use super::request::SubmissionRequest;
use super::result::{self, GeneratedVideo};
use super::service::AnimationService;
use super::source::SelectedImage;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please upload a portrait image")]
    NoImage,
    #[error("a submission is already in progress")]
    Busy,
    #[error("no API key configured")]
    MissingApiKey,
    #[error("Invalid Face image")]
    InvalidInput,
    #[error("animation service returned HTTP {status}")]
    Service { status: u16 },
    #[error("network error: {0}")]
    Transport(String),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("cannot store the generated video: {0}")]
    Storage(String),
}

impl SubmissionError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            SubmissionError::NoImage => "notification-no-image",
            SubmissionError::Busy => "notification-busy",
            SubmissionError::MissingApiKey => "notification-missing-api-key",
            SubmissionError::InvalidInput => "notification-invalid-face",
            SubmissionError::Service { .. } => "notification-service-error",
            SubmissionError::Transport(_) => "notification-transport-error",
            SubmissionError::Encode(_) => "notification-encode-error",
            SubmissionError::Storage(_) => "notification-storage-error",
        }
    }

    /// Interpolation arguments for the toast message.
    pub fn i18n_args(&self) -> Vec<(String, String)> {
        match self {
            SubmissionError::Service { status } => vec![("status".into(), status.to_string())],
            _ => Vec::new(),
        }
    }
}

pub type SubmissionResult = Result<GeneratedVideo, SubmissionError>;

/// Owns the busy flag and the current result.
pub struct SubmissionController {
    encoder: Encoder,
    service: Option<Arc<dyn AnimationService>>,
    videos_dir: PathBuf,
    loading: bool,
    result: Option<GeneratedVideo>,
}

impl std::fmt::Debug for SubmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionController")
            .field("has_service", &self.service.is_some())
            .field("videos_dir", &self.videos_dir)
            .field("loading", &self.loading)
            .field("result", &self.result)
            .finish()
    }
}

impl SubmissionController {
    /// `service` is `None` when no API key is configured.
    pub fn new(
        encoder: Encoder,
        service: Option<Arc<dyn AnimationService>>,
        videos_dir: PathBuf,
    ) -> Self {
        Self {
            encoder,
            service,
            videos_dir,
            loading: false,
            result: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&GeneratedVideo> {
        self.result.as_ref()
    }

    /// Validates the submission and marks the controller busy.
    pub fn begin(
        &mut self,
        selected: Option<&SelectedImage>,
    ) -> Result<PendingSubmission, SubmissionError> {
        if self.loading {
            return Err(SubmissionError::Busy);
        }
        let selected = selected.cloned().ok_or(SubmissionError::NoImage)?;
        let service = self.service.clone().ok_or(SubmissionError::MissingApiKey)?;

        self.loading = true;
        tracing::debug!(image = %selected.label(), "submission started");

        Ok(PendingSubmission {
            selected,
            encoder: self.encoder.clone(),
            service,
            videos_dir: self.videos_dir.clone(),
        })
    }

    /// Clears the busy flag. The current result is replaced only on success,
    /// and the replaced video's cache file is removed.
    pub fn finish(&mut self, outcome: SubmissionResult) -> Result<&GeneratedVideo, SubmissionError> {
        self.loading = false;
        match outcome {
            Ok(video) => {
                if let Some(previous) = self.result.take() {
                    if previous.path != video.path {
                        result::discard(&previous);
                    }
                }
                Ok(&*self.result.insert(video))
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                Err(err)
            }
        }
    }

    /// Runs a whole submission in place.
    pub async fn submit(
        &mut self,
        selected: Option<&SelectedImage>,
    ) -> Result<&GeneratedVideo, SubmissionError> {
        let pending = self.begin(selected)?;
        let outcome = pending.run().await;
        self.finish(outcome)
    }
}

/// A validated submission, detached from the controller.
pub struct PendingSubmission {
    selected: SelectedImage,
    encoder: Encoder,
    service: Arc<dyn AnimationService>,
    videos_dir: PathBuf,
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("selected", &self.selected.label())
            .finish_non_exhaustive()
    }
}

impl PendingSubmission {
    /// Encodes the image, calls the service and stores the returned video.
    pub async fn run(self) -> SubmissionResult {
        let face_image = self.encoder.encode(&self.selected).await?;
        let request = SubmissionRequest::new(face_image);
        let payload = self.service.animate(&request).await?;

        result::persist(payload, &self.videos_dir)
            .await
            .map_err(|err| SubmissionError::Storage(err.to_string()))
    }
}
