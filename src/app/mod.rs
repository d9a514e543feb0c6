// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration between the face panel, the
//! submission workflow and the result player.
//!
//! The `App` struct wires together the domains (image sources, camera,
//! submission, playback, localization) and translates messages into side
//! effects like file dialogs, HTTP submissions or state persistence.

mod camera;
mod message;
pub mod paths;
pub mod persisted_state;
mod subscription;
mod update;
mod view;

pub use message::{FileOrigin, Flags, Message};

use crate::config::{self, Config, ServiceSettings, DEFAULT_CAMERA_INDEX};
use crate::i18n::fluent::I18n;
use crate::portrait::camera_nokhwa::NokhwaCamera;
use crate::portrait::{
    result, AnimationService, CameraProvider, DropZone, Encoder, HttpAnimationService,
    SelectedImage, SourceManager, SubmissionController,
};
use crate::ui::face_panel::Preview;
use crate::ui::notifications;
use crate::ui::theming::ThemeMode;
use crate::video_player::VideoPlayer;
use camera::CameraState;
use iced::widget::image;
use iced::{window, Element, Subscription, Task, Theme};
use persisted_state::AppState;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub const WINDOW_DEFAULT_HEIGHT: u32 = 720;
pub const WINDOW_DEFAULT_WIDTH: u32 = 960;
pub const MIN_WINDOW_HEIGHT: u32 = 560;
pub const MIN_WINDOW_WIDTH: u32 = 900;

/// Root Iced application state.
pub struct App {
    pub i18n: I18n,
    theme_mode: ThemeMode,
    sources: SourceManager,
    /// Decoded preview of the selection, rebuilt when the selection changes.
    preview: Option<image::Handle>,
    drop_zone: DropZone,
    camera: CameraState,
    submission: SubmissionController,
    player: Option<VideoPlayer>,
    next_session_id: u64,
    spinner_rotation: f32,
    app_state: AppState,
    state_dir: Option<PathBuf>,
    notifications: notifications::Manager,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("selected", &self.sources.selected().map(SelectedImage::label))
            .field("camera", &self.camera)
            .field("submission", &self.submission)
            .finish_non_exhaustive()
    }
}

/// External collaborators, replaceable in tests.
pub struct Services {
    pub camera: Arc<dyn CameraProvider>,
    /// `None` when no API key is configured.
    pub animation: Option<Arc<dyn AnimationService>>,
    pub encoder: Encoder,
    /// Where generated videos are stored before playback.
    pub videos_dir: PathBuf,
    /// Data directory override for the state file.
    pub state_dir: Option<PathBuf>,
}

impl Services {
    /// Builds the HTTP client, the animation service and the webcam backend.
    pub fn from_config(config: &Config) -> Self {
        let settings = ServiceSettings::resolve(&config.service);

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "cannot build HTTP client, using defaults");
                reqwest::Client::new()
            });

        let animation = HttpAnimationService::from_settings(client.clone(), &settings)
            .map(|service| Arc::new(service) as Arc<dyn AnimationService>);
        if animation.is_none() {
            tracing::warn!("no API key configured, submissions are disabled");
        }

        let videos_dir = paths::get_videos_dir()
            .unwrap_or_else(|| std::env::temp_dir().join("facemotion"));
        result::clear_stale(&videos_dir);

        Self {
            camera: Arc::new(NokhwaCamera),
            animation,
            encoder: Encoder::new(client),
            videos_dir,
            state_dir: None,
        }
    }
}

pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        ..window::Settings::default()
    }
}

pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        // Iced boots once; a second call gets the defaults.
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl App {
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let (config, config_warning) = config::load();
        let (app_state, state_warning) = AppState::load();
        let services = Services::from_config(&config);

        let warnings = [config_warning, state_warning].into_iter().flatten().collect();
        Self::boot(flags, &config, app_state, warnings, services)
    }

    /// Builds the application from already loaded configuration.
    ///
    /// `warnings` are i18n keys shown as warning toasts on startup.
    pub fn boot(
        flags: Flags,
        config: &Config,
        app_state: AppState,
        warnings: Vec<String>,
        services: Services,
    ) -> (Self, Task<Message>) {
        let i18n = I18n::new(flags.lang.clone(), config);
        let camera_index = config.portrait.camera_index.unwrap_or(DEFAULT_CAMERA_INDEX);
        let initial = config
            .portrait
            .default_face_image
            .clone()
            .map(SelectedImage::RemoteUrl);

        let mut app = App {
            i18n,
            theme_mode: config.general.theme_mode,
            sources: SourceManager::new(initial),
            preview: None,
            drop_zone: DropZone::default(),
            camera: CameraState::new(services.camera, camera_index),
            submission: SubmissionController::new(
                services.encoder,
                services.animation,
                services.videos_dir,
            ),
            player: None,
            next_session_id: 0,
            spinner_rotation: 0.0,
            app_state,
            state_dir: services.state_dir,
            notifications: notifications::Manager::new(),
        };

        for key in warnings {
            app.notifications
                .push(notifications::Notification::warning(key));
        }

        let task = match flags.file_path {
            Some(path) => update::load_file(FileOrigin::Upload, PathBuf::from(path)),
            None => Task::none(),
        };

        (app, task)
    }

    fn title(&self) -> String {
        let app_name = self.i18n.tr("window-title");
        match self.sources.selected() {
            Some(selected) => format!("{} - {app_name}", selected.label()),
            None => app_name,
        }
    }

    fn theme(&self) -> Theme {
        self.theme_mode.iced_theme()
    }

    fn subscription(&self) -> Subscription<Message> {
        let event_sub = subscription::create_event_subscription();
        let tick_sub = subscription::create_tick_subscription(
            self.submission.is_loading(),
            self.notifications.has_notifications(),
        );
        let camera_sub = subscription::create_camera_subscription(self.camera.is_on());
        let video_sub = subscription::create_video_subscription(self.player.as_ref());

        Subscription::batch([event_sub, tick_sub, camera_sub, video_sub])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let mut ctx = update::UpdateContext {
            sources: &mut self.sources,
            preview: &mut self.preview,
            drop_zone: &mut self.drop_zone,
            camera: &mut self.camera,
            submission: &mut self.submission,
            player: &mut self.player,
            next_session_id: &mut self.next_session_id,
            app_state: &mut self.app_state,
            state_dir: self.state_dir.as_deref(),
            notifications: &mut self.notifications,
            spinner_rotation: &mut self.spinner_rotation,
        };

        match message {
            Message::FacePanel(message) => update::handle_face_panel_message(&mut ctx, message),
            Message::ResultPanel(message) => {
                update::handle_result_panel_message(&mut ctx, message);
                Task::none()
            }
            Message::Notification(message) => {
                ctx.notifications.handle_message(&message);
                Task::none()
            }
            Message::OpenFileDialogResult(path) => update::handle_open_dialog_result(path),
            Message::FileHovered => {
                ctx.drop_zone.hover();
                Task::none()
            }
            Message::FilesHoveredLeft => {
                ctx.drop_zone.leave();
                Task::none()
            }
            Message::FileDropped(path) => update::handle_file_dropped(&mut ctx, path),
            Message::FileLoaded {
                origin,
                path,
                result,
            } => update::handle_file_loaded(&mut ctx, origin, &path, result),
            Message::CameraOpened(result) => {
                update::handle_camera_opened(&mut ctx, result);
                Task::none()
            }
            Message::CameraTick(_) => {
                update::handle_camera_tick(&mut ctx);
                Task::none()
            }
            Message::SubmissionFinished(outcome) => {
                update::handle_submission_finished(&mut ctx, outcome);
                Task::none()
            }
            Message::DownloadDialogResult(path) => {
                update::handle_download_dialog_result(&mut ctx, path)
            }
            Message::DownloadFinished(result) => {
                update::handle_download_finished(&mut ctx, result);
                Task::none()
            }
            Message::Playback(message) => {
                update::handle_playback_message(&mut ctx, message);
                Task::none()
            }
            Message::Tick(_) => {
                update::handle_tick(&mut ctx);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let preview = match (&self.preview, self.sources.selected()) {
            (Some(handle), _) => Preview::Image(handle),
            (None, Some(selected)) => Preview::Label(selected.label()),
            (None, None) => Preview::Empty,
        };

        view::view(view::ViewContext {
            i18n: &self.i18n,
            preview,
            camera_frame: self.camera.frame_handle(),
            is_camera_on: self.camera.is_on(),
            is_dragging: self.drop_zone.is_dragging(),
            loading: self.submission.is_loading(),
            has_result: self.submission.result().is_some(),
            player: self.player.as_ref(),
            spinner_rotation: self.spinner_rotation,
            notifications: &self.notifications,
        })
    }
}
