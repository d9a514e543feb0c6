// SPDX-License-Identifier: MPL-2.0
//! Capture-and-submit workflow.
//!
//! - [`source`] and [`capture`] produce the selected face image
//! - [`encoder`] turns it into base64
//! - [`controller`], [`request`] and [`service`] run the submission
//! - [`result`] stores and exports the generated video

pub mod camera_nokhwa;
pub mod capture;
pub mod controller;
pub mod encoder;
pub mod request;
pub mod result;
pub mod service;
pub mod source;

pub use capture::{CameraError, CameraProvider, CameraRequest, CaptureSession, VideoStream};
pub use controller::{PendingSubmission, SubmissionController, SubmissionError, SubmissionResult};
pub use encoder::{EncodeError, Encoder};
pub use request::{AnimationParams, SubmissionRequest};
pub use result::{GeneratedVideo, VideoPayload};
pub use service::{AnimationService, HttpAnimationService};
pub use source::{DropZone, LocalFile, SelectedImage, SourceManager};
