// SPDX-License-Identifier: MPL-2.0
//! User interface components.
//!
//! Elm-style "state down, messages up": each panel renders from a borrowed
//! `ViewContext` and emits its own `Message`, which the app maps.
//!
//! - [`face_panel`] - Face image preview, drop zone, camera and actions
//! - [`result_panel`] - Generated video playback
//! - [`loading_overlay`] - "Generating..." overlay
//! - [`notifications`] - Toast notification system for user feedback
//! - [`styles`] - Widget styles
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)
//! - [`theming`] - Light/Dark/System theme mode management

pub mod design_tokens;
pub mod face_panel;
pub mod loading_overlay;
pub mod notifications;
pub mod result_panel;
pub mod styles;
pub mod theming;
pub mod widgets;
