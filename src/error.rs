// SPDX-License-Identifier: MPL-2.0
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Video Error: {0}")]
    Video(#[from] VideoError),
}

/// Specific error types for playback of the generated video.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoError {
    /// The returned payload is not something FFmpeg can demux.
    #[error("Unsupported video format")]
    UnsupportedFormat,

    /// Video codec is not supported by the system's FFmpeg
    #[error("Unsupported video codec: {0}")]
    UnsupportedCodec(String),

    /// File exists but contains no video stream
    #[error("No video stream found")]
    NoVideoStream,

    /// Decoding failed during playback
    #[error("Decoding failed: {0}")]
    DecodingFailed(String),

    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    IoError(String),

    /// Generic error with raw message
    #[error("{0}")]
    Other(String),
}

impl VideoError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            VideoError::UnsupportedFormat => "error-video-unsupported-format",
            VideoError::UnsupportedCodec(_) => "error-video-unsupported-codec",
            VideoError::NoVideoStream => "error-video-no-video-stream",
            VideoError::DecodingFailed(_) => "error-video-decoding-failed",
            VideoError::IoError(_) => "error-video-io",
            VideoError::Other(_) => "error-video-general",
        }
    }

    /// Attempts to parse a raw FFmpeg error message into a specific variant.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        // Codec errors first, they may also contain "not found"
        if msg_lower.contains("codec") || msg_lower.contains("decoder") {
            if let Some(codec) = Self::extract_codec_name(&msg_lower) {
                return VideoError::UnsupportedCodec(codec);
            }
            return VideoError::DecodingFailed(msg.to_string());
        }

        if msg_lower.contains("no such file")
            || msg_lower.contains("not found")
            || msg_lower.contains("permission denied")
        {
            return VideoError::IoError(msg.to_string());
        }

        if msg_lower.contains("no video stream") {
            return VideoError::NoVideoStream;
        }

        if msg_lower.contains("invalid data found") {
            return VideoError::UnsupportedFormat;
        }

        if msg_lower.contains("packet") || msg_lower.contains("scaling") {
            return VideoError::DecodingFailed(msg.to_string());
        }

        VideoError::Other(msg.to_string())
    }

    fn extract_codec_name(msg: &str) -> Option<String> {
        let codecs = ["h264", "hevc", "h265", "vp8", "vp9", "av1", "mpeg4"];
        codecs
            .iter()
            .find(|codec| msg.contains(*codec))
            .map(|codec| codec.to_uppercase())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
