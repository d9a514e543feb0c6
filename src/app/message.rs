// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::portrait::{CameraError, LocalFile, SubmissionResult};
use crate::ui::{face_panel, notifications, result_panel};
use crate::video_player::PlaybackMessage;
use std::path::PathBuf;
use std::time::Instant;

/// Why a file is being read: the two paths end in different source-manager
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrigin {
    Upload,
    Drop,
}

/// Top-level messages consumed by `App::update`. The variants forward
/// lower-level component messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    FacePanel(face_panel::Message),
    ResultPanel(result_panel::Message),
    Notification(notifications::NotificationMessage),
    /// Result from the open file dialog.
    OpenFileDialogResult(Option<PathBuf>),
    /// A dragged file entered the window.
    FileHovered,
    /// The drag left the window without dropping.
    FilesHoveredLeft,
    /// A file was dropped on the window. Multi-file drops arrive one by one.
    FileDropped(PathBuf),
    /// A picked or dropped file has been read into memory.
    FileLoaded {
        origin: FileOrigin,
        path: PathBuf,
        result: Result<LocalFile, String>,
    },
    /// The camera worker finished its open attempt.
    CameraOpened(Result<(), CameraError>),
    /// Refreshes the camera preview.
    CameraTick(Instant),
    SubmissionFinished(SubmissionResult),
    /// Result from the download save dialog.
    DownloadDialogResult(Option<PathBuf>),
    DownloadFinished(Result<PathBuf, String>),
    Playback(PlaybackMessage),
    /// Periodic tick for toast auto-dismiss and the loading spinner.
    Tick(Instant),
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `fr`, `en-US`).
    pub lang: Option<String>,
    /// Optional face image to preselect on startup.
    pub file_path: Option<String>,
    /// Optional data directory override (state file, generated videos).
    /// Takes precedence over `FACEMOTION_DATA_DIR`.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `FACEMOTION_CONFIG_DIR`.
    pub config_dir: Option<String>,
}
