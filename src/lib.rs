// SPDX-License-Identifier: MPL-2.0
//! `facemotion` animates a face photo with a hosted live-portrait service.
//!
//! A face image is picked from disk, dropped on the window or captured from
//! the webcam, sent to the animation service as base64, and the returned
//! video is played back in the window or saved to disk.

pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod portrait;
pub mod ui;
pub mod video_player;
