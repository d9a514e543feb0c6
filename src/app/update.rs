// SPDX-License-Identifier: MPL-2.0
//! Update logic and message handlers for the application.
//!
//! `App::update` builds an [`UpdateContext`] over its fields and dispatches to
//! the handlers below, so each handler only sees the state it needs.

use super::camera::CameraState;
use super::message::FileOrigin;
use super::persisted_state::AppState;
use super::Message;
use crate::portrait::source::IMAGE_EXTENSIONS;
use crate::portrait::{
    result, CameraError, DropZone, GeneratedVideo, LocalFile, SourceManager,
    SubmissionController, SubmissionError, SubmissionResult,
};
use crate::ui::notifications::{self, Notification};
use crate::ui::widgets::spinner;
use crate::ui::{face_panel, result_panel};
use crate::video_player::{PlaybackMessage, VideoPlayer};
use iced::widget::image;
use iced::Task;
use std::path::{Path, PathBuf};

/// Context for update operations containing mutable references to app state.
pub struct UpdateContext<'a> {
    pub sources: &'a mut SourceManager,
    pub preview: &'a mut Option<image::Handle>,
    pub drop_zone: &'a mut DropZone,
    pub camera: &'a mut CameraState,
    pub submission: &'a mut SubmissionController,
    pub player: &'a mut Option<VideoPlayer>,
    pub next_session_id: &'a mut u64,
    pub app_state: &'a mut AppState,
    /// Data directory override for the state file. `None` uses the default.
    pub state_dir: Option<&'a Path>,
    pub notifications: &'a mut notifications::Manager,
    pub spinner_rotation: &'a mut f32,
}

impl UpdateContext<'_> {
    /// Rebuilds the preview handle after the selection changed.
    fn refresh_preview(&mut self) {
        *self.preview = self
            .sources
            .selected()
            .and_then(|selected| selected.preview_bytes())
            .map(image::Handle::from_bytes);
    }

    fn persist_state(&mut self) {
        if let Some(key) = self.app_state.save_to(self.state_dir.map(Path::to_path_buf)) {
            self.notifications.push(Notification::warning(key));
        }
    }

    fn push_submission_error(&mut self, error: &SubmissionError) {
        let mut notification = Notification::error(error.i18n_key());
        for (key, value) in error.i18n_args() {
            notification = notification.with_arg(key, value);
        }
        self.notifications.push(notification);
    }

    fn push_camera_error(&mut self, error: &CameraError) {
        tracing::warn!(error = %error, "camera unavailable");
        self.notifications
            .push(Notification::warning(error.i18n_key()));
    }
}

pub fn handle_face_panel_message(
    ctx: &mut UpdateContext<'_>,
    message: face_panel::Message,
) -> Task<Message> {
    match message {
        face_panel::Message::Upload => open_file_dialog(ctx.app_state.last_open_directory.clone()),
        face_panel::Message::Clear => {
            ctx.sources.clear();
            ctx.refresh_preview();
            Task::none()
        }
        face_panel::Message::OpenCamera => ctx.camera.open(),
        face_panel::Message::TakePhoto => {
            match ctx.camera.capture() {
                Ok(data_url) => {
                    ctx.sources.set_from_capture(data_url);
                    ctx.refresh_preview();
                }
                Err(err) => ctx.push_camera_error(&err),
            }
            Task::none()
        }
        face_panel::Message::CancelCamera => {
            ctx.camera.cancel();
            Task::none()
        }
        face_panel::Message::Generate => handle_generate(ctx),
        face_panel::Message::Download => handle_download(ctx),
    }
}

fn open_file_dialog(last_directory: Option<PathBuf>) -> Task<Message> {
    Task::perform(
        async move {
            let mut dialog = rfd::AsyncFileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);

            if let Some(dir) = last_directory {
                if dir.exists() {
                    dialog = dialog.set_directory(&dir);
                }
            }

            dialog.pick_file().await.map(|h| h.path().to_path_buf())
        },
        Message::OpenFileDialogResult,
    )
}

/// Reads the picked or dropped file off the update loop.
pub fn load_file(origin: FileOrigin, path: PathBuf) -> Task<Message> {
    Task::perform(
        async move {
            let result = LocalFile::read(&path).await.map_err(|err| err.to_string());
            (path, result)
        },
        move |(path, result)| Message::FileLoaded {
            origin,
            path,
            result,
        },
    )
}

pub fn handle_open_dialog_result(path: Option<PathBuf>) -> Task<Message> {
    match path {
        Some(path) => load_file(FileOrigin::Upload, path),
        None => Task::none(),
    }
}

pub fn handle_file_dropped(ctx: &mut UpdateContext<'_>, path: PathBuf) -> Task<Message> {
    match ctx.drop_zone.drop_file(path) {
        Some(path) => load_file(FileOrigin::Drop, path),
        None => Task::none(),
    }
}

pub fn handle_file_loaded(
    ctx: &mut UpdateContext<'_>,
    origin: FileOrigin,
    path: &Path,
    result: Result<LocalFile, String>,
) -> Task<Message> {
    if origin == FileOrigin::Drop {
        ctx.drop_zone.finish_drop();
    }

    match result {
        Ok(file) => {
            match origin {
                FileOrigin::Upload => ctx.sources.set_from_upload(file),
                FileOrigin::Drop => ctx.sources.set_from_drop(vec![file]),
            }
            ctx.refresh_preview();
            ctx.app_state.set_last_open_directory_from_file(path);
            ctx.persist_state();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot read face image");
            ctx.notifications
                .push(Notification::error("notification-open-error"));
        }
    }
    Task::none()
}

pub fn handle_camera_opened(ctx: &mut UpdateContext<'_>, result: Result<(), CameraError>) {
    // A closed camera means the tick already reported the failure or the user
    // cancelled while the device was opening.
    if let Err(err) = result {
        if ctx.camera.is_on() {
            ctx.camera.cancel();
            ctx.push_camera_error(&err);
        }
    }
}

pub fn handle_camera_tick(ctx: &mut UpdateContext<'_>) {
    if let Some(err) = ctx.camera.refresh() {
        ctx.push_camera_error(&err);
    }
}

fn handle_generate(ctx: &mut UpdateContext<'_>) -> Task<Message> {
    match ctx.submission.begin(ctx.sources.selected()) {
        Ok(pending) => {
            *ctx.spinner_rotation = 0.0;
            Task::perform(pending.run(), Message::SubmissionFinished)
        }
        Err(SubmissionError::Busy) => {
            tracing::debug!("submission already running, ignoring");
            Task::none()
        }
        Err(err) => {
            tracing::warn!(error = %err, "submission rejected");
            ctx.push_submission_error(&err);
            Task::none()
        }
    }
}

pub fn handle_submission_finished(ctx: &mut UpdateContext<'_>, outcome: SubmissionResult) {
    match ctx.submission.finish(outcome) {
        Ok(video) => {
            let path = video.path.clone();
            *ctx.next_session_id = ctx.next_session_id.wrapping_add(1);
            *ctx.player = Some(VideoPlayer::new(path, *ctx.next_session_id));

            ctx.notifications.clear_errors();
            ctx.notifications
                .push(Notification::success("notification-generate-success"));
        }
        Err(err) => ctx.push_submission_error(&err),
    }
}

fn handle_download(ctx: &mut UpdateContext<'_>) -> Task<Message> {
    let Some(video) = ctx.submission.result() else {
        return Task::none();
    };
    let file_name = video.download_file_name();
    let last_directory = ctx.app_state.last_save_directory.clone();

    Task::perform(
        async move {
            let mut dialog = rfd::AsyncFileDialog::new().set_file_name(&file_name);

            if let Some(dir) = last_directory {
                if dir.exists() {
                    dialog = dialog.set_directory(&dir);
                }
            }

            dialog.save_file().await.map(|h| h.path().to_path_buf())
        },
        Message::DownloadDialogResult,
    )
}

pub fn handle_download_dialog_result(
    ctx: &mut UpdateContext<'_>,
    path: Option<PathBuf>,
) -> Task<Message> {
    let (Some(path), Some(video)) = (path, ctx.submission.result()) else {
        return Task::none();
    };
    save_video(video.clone(), path)
}

fn save_video(video: GeneratedVideo, path: PathBuf) -> Task<Message> {
    Task::perform(
        async move {
            result::save_copy(&video, &path)
                .await
                .map(|()| path)
                .map_err(|err| err.to_string())
        },
        Message::DownloadFinished,
    )
}

pub fn handle_download_finished(ctx: &mut UpdateContext<'_>, result: Result<PathBuf, String>) {
    match result {
        Ok(path) => {
            tracing::info!(path = %path.display(), "video downloaded");
            ctx.app_state.set_last_save_directory_from_file(&path);
            ctx.persist_state();
            ctx.notifications
                .push(Notification::success("notification-download-success"));
        }
        Err(err) => {
            tracing::warn!(error = %err, "cannot save video");
            ctx.notifications
                .push(Notification::error("notification-download-error"));
        }
    }
}

pub fn handle_playback_message(ctx: &mut UpdateContext<'_>, message: PlaybackMessage) {
    let Some(player) = ctx.player.as_mut() else {
        return;
    };

    match message {
        PlaybackMessage::Started(sender) => player.set_command_sender(sender),
        PlaybackMessage::FrameReady {
            rgba_data,
            width,
            height,
            pts_secs,
        } => player.on_frame(rgba_data, width, height, pts_secs),
        PlaybackMessage::Buffering => {}
        PlaybackMessage::EndOfStream => player.on_end_of_stream(),
        PlaybackMessage::Error(err) => player.set_error(err),
    }
}

pub fn handle_result_panel_message(ctx: &mut UpdateContext<'_>, message: result_panel::Message) {
    let Some(player) = ctx.player.as_mut() else {
        return;
    };

    match message {
        result_panel::Message::TogglePlayback => player.toggle_playback(),
        result_panel::Message::Replay => player.replay(),
    }
}

pub fn handle_tick(ctx: &mut UpdateContext<'_>) {
    ctx.notifications.tick();
    if ctx.submission.is_loading() {
        *ctx.spinner_rotation = spinner::advance(*ctx.spinner_rotation);
    }
}
