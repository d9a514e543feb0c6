// SPDX-License-Identifier: MPL-2.0
//! Playback of the generated video.
//!
//! FFmpeg decodes on a blocking Tokio thread and hands RGBA frames to an Iced
//! subscription. The result panel shows the latest frame as an image.

mod decoder;
mod state;
pub mod subscription;

pub use decoder::{AsyncDecoder, DecodedFrame, DecoderCommand, DecoderEvent};
pub use state::{PlaybackState, VideoPlayer};
pub use subscription::{video_playback, DecoderCommandSender, PlaybackMessage, VideoPlaybackId};

use crate::error::{Error, Result, VideoError};
use std::sync::Once;

static FFMPEG_INIT: Once = Once::new();

/// Initializes FFmpeg once per process and silences its warnings.
pub fn init_ffmpeg() -> Result<()> {
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(Error::Video(VideoError::Other(format!(
                "FFmpeg initialization failed: {e}"
            ))));
            return;
        }

        // SAFETY: av_log_set_level only touches FFmpeg's global log level.
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}
