// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **Service**: Animation endpoint, request timeout
//! - **Animation**: Driving video and the live-portrait tuning parameters
//! - **Capture**: Webcam request size and snapshot canvas size
//! - **Playback**: Preview refresh rate

// ==========================================================================
// Service Defaults
// ==========================================================================

/// Live-portrait endpoint of the hosted animation service.
pub const DEFAULT_SERVICE_ENDPOINT: &str = "https://api.segmind.com/v1/live-portrait";

/// Header carrying the service API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Environment variable that overrides `[service] api_key`.
pub const ENV_API_KEY: &str = "FACEMOTION_API_KEY";

/// Default request timeout. Generation routinely takes a minute or more.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Minimum request timeout (in seconds).
pub const MIN_TIMEOUT_SECS: u64 = 10;

/// Maximum request timeout (in seconds).
pub const MAX_TIMEOUT_SECS: u64 = 1800;

// ==========================================================================
// Animation Defaults
// ==========================================================================

/// Reference video whose motion is transferred onto the face.
pub const DRIVING_VIDEO_URL: &str =
    "https://segmind-sd-models.s3.amazonaws.com/display_images/liveportrait-video.mp4";

pub const LIVE_PORTRAIT_DSIZE: u32 = 512;
pub const LIVE_PORTRAIT_SCALE: f32 = 2.3;
pub const VIDEO_FRAME_LOAD_CAP: u32 = 128;
pub const LIVE_PORTRAIT_LIP_ZERO: bool = true;
pub const LIVE_PORTRAIT_RELATIVE: bool = true;
pub const LIVE_PORTRAIT_VX_RATIO: f32 = 0.0;
pub const LIVE_PORTRAIT_VY_RATIO: f32 = -0.12;
pub const LIVE_PORTRAIT_STITCHING: bool = true;
pub const VIDEO_SELECT_EVERY_N_FRAMES: u32 = 1;
pub const LIVE_PORTRAIT_EYE_RETARGETING: bool = false;
pub const LIVE_PORTRAIT_LIP_RETARGETING: bool = false;
pub const LIVE_PORTRAIT_LIP_RETARGETING_MULTIPLIER: f32 = 1.0;
pub const LIVE_PORTRAIT_EYES_RETARGETING_MULTIPLIER: f32 = 1.0;

// ==========================================================================
// Capture Defaults
// ==========================================================================

/// Requested webcam width. Drivers pick the closest supported mode.
pub const CAMERA_REQUEST_WIDTH: u32 = 500;

/// Requested webcam height.
pub const CAMERA_REQUEST_HEIGHT: u32 = 500;

/// Requested webcam frame rate.
pub const CAMERA_REQUEST_FPS: u32 = 30;

/// Width of the snapshot canvas.
pub const SNAPSHOT_WIDTH: u32 = 414;

/// Height of the snapshot canvas (16:9 of the width, truncated).
pub const SNAPSHOT_HEIGHT: u32 = SNAPSHOT_WIDTH * 9 / 16;

/// Default camera index.
pub const DEFAULT_CAMERA_INDEX: u32 = 0;

// ==========================================================================
// Playback Defaults
// ==========================================================================

/// Interval between camera preview refreshes.
pub const CAMERA_PREVIEW_INTERVAL_MS: u64 = 33;

/// Interval between notification ticks.
pub const NOTIFICATION_TICK_MS: u64 = 250;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_TIMEOUT_SECS > 0);
    assert!(MAX_TIMEOUT_SECS >= MIN_TIMEOUT_SECS);
    assert!(DEFAULT_TIMEOUT_SECS >= MIN_TIMEOUT_SECS);
    assert!(DEFAULT_TIMEOUT_SECS <= MAX_TIMEOUT_SECS);

    assert!(SNAPSHOT_WIDTH > 0);
    assert!(SNAPSHOT_HEIGHT > 0);
    assert!(SNAPSHOT_HEIGHT < SNAPSHOT_WIDTH);
    assert!(CAMERA_REQUEST_FPS > 0);
    assert!(VIDEO_SELECT_EVERY_N_FRAMES > 0);
};
