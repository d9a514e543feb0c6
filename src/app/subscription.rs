// SPDX-License-Identifier: MPL-2.0
//! Event and timer subscriptions for the application.

use super::Message;
use crate::config::{CAMERA_PREVIEW_INTERVAL_MS, NOTIFICATION_TICK_MS};
use crate::video_player::{self, VideoPlayer};
use iced::{event, time, window, Subscription};
use std::time::Duration;

/// Routes window drag-and-drop events. Native drops arrive one event per file.
pub fn create_event_subscription() -> Subscription<Message> {
    event::listen_with(|event, _status, _window_id| match event {
        event::Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        event::Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        event::Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    })
}

/// Periodic tick for toast auto-dismiss and the loading spinner.
pub fn create_tick_subscription(is_loading: bool, has_notifications: bool) -> Subscription<Message> {
    if is_loading || has_notifications {
        time::every(Duration::from_millis(NOTIFICATION_TICK_MS)).map(Message::Tick)
    } else {
        Subscription::none()
    }
}

/// Polls the camera preview at roughly the stream frame rate.
pub fn create_camera_subscription(is_camera_on: bool) -> Subscription<Message> {
    if is_camera_on {
        time::every(Duration::from_millis(CAMERA_PREVIEW_INTERVAL_MS)).map(Message::CameraTick)
    } else {
        Subscription::none()
    }
}

/// Decodes the current result video. A new player gets a new session id,
/// which restarts the stream.
pub fn create_video_subscription(player: Option<&VideoPlayer>) -> Subscription<Message> {
    match player {
        Some(player) => {
            video_player::video_playback(player.path().to_path_buf(), player.session_id())
                .map(Message::Playback)
        }
        None => Subscription::none(),
    }
}
