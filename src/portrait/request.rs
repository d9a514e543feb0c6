// SPDX-License-Identifier: MPL-2.0
//! JSON body of a live-portrait request.

use crate::config::defaults;
use serde::Serialize;

/// Driving video and tuning parameters sent with every face image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationParams {
    pub driving_video: String,
    pub live_portrait_dsize: u32,
    pub live_portrait_scale: f32,
    pub video_frame_load_cap: u32,
    pub live_portrait_lip_zero: bool,
    pub live_portrait_relative: bool,
    pub live_portrait_vx_ratio: f32,
    pub live_portrait_vy_ratio: f32,
    pub live_portrait_stitching: bool,
    pub video_select_every_n_frames: u32,
    pub live_portrait_eye_retargeting: bool,
    pub live_portrait_lip_retargeting: bool,
    pub live_portrait_lip_retargeting_multiplier: f32,
    pub live_portrait_eyes_retargeting_multiplier: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            driving_video: defaults::DRIVING_VIDEO_URL.to_string(),
            live_portrait_dsize: defaults::LIVE_PORTRAIT_DSIZE,
            live_portrait_scale: defaults::LIVE_PORTRAIT_SCALE,
            video_frame_load_cap: defaults::VIDEO_FRAME_LOAD_CAP,
            live_portrait_lip_zero: defaults::LIVE_PORTRAIT_LIP_ZERO,
            live_portrait_relative: defaults::LIVE_PORTRAIT_RELATIVE,
            live_portrait_vx_ratio: defaults::LIVE_PORTRAIT_VX_RATIO,
            live_portrait_vy_ratio: defaults::LIVE_PORTRAIT_VY_RATIO,
            live_portrait_stitching: defaults::LIVE_PORTRAIT_STITCHING,
            video_select_every_n_frames: defaults::VIDEO_SELECT_EVERY_N_FRAMES,
            live_portrait_eye_retargeting: defaults::LIVE_PORTRAIT_EYE_RETARGETING,
            live_portrait_lip_retargeting: defaults::LIVE_PORTRAIT_LIP_RETARGETING,
            live_portrait_lip_retargeting_multiplier:
                defaults::LIVE_PORTRAIT_LIP_RETARGETING_MULTIPLIER,
            live_portrait_eyes_retargeting_multiplier:
                defaults::LIVE_PORTRAIT_EYES_RETARGETING_MULTIPLIER,
        }
    }
}

/// One face image plus the fixed parameters, flattened into a single object.
#[derive(Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    /// Base64 without a `data:` prefix.
    pub face_image: String,
    #[serde(flatten)]
    pub params: AnimationParams,
}

impl SubmissionRequest {
    pub fn new(face_image: String) -> Self {
        Self {
            face_image,
            params: AnimationParams::default(),
        }
    }
}

// The payload can be megabytes of base64.
impl std::fmt::Debug for SubmissionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionRequest")
            .field("face_image_len", &self.face_image.len())
            .field("params", &self.params)
            .finish()
    }
}
