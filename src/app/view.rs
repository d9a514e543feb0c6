// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.
//!
//! The face panel and the result panel sit side by side. The loading overlay
//! and the toasts are stacked on top.

use super::Message;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::spacing;
use crate::ui::face_panel::{self, Preview};
use crate::ui::notifications::{self, Toast};
use crate::ui::{loading_overlay, result_panel};
use crate::video_player::VideoPlayer;
use iced::widget::{image, Container, Row, Stack};
use iced::{alignment, Element, Length};

/// Context required to render the application view.
pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub preview: Preview<'a>,
    pub camera_frame: Option<&'a image::Handle>,
    pub is_camera_on: bool,
    pub is_dragging: bool,
    pub loading: bool,
    pub has_result: bool,
    pub player: Option<&'a VideoPlayer>,
    pub spinner_rotation: f32,
    pub notifications: &'a notifications::Manager,
}

pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let face = face_panel::view(face_panel::ViewContext {
        i18n: ctx.i18n,
        preview: ctx.preview,
        camera_frame: ctx.camera_frame,
        is_camera_on: ctx.is_camera_on,
        is_dragging: ctx.is_dragging,
        loading: ctx.loading,
        has_result: ctx.has_result,
    })
    .map(Message::FacePanel);

    let result = result_panel::view(result_panel::ViewContext {
        i18n: ctx.i18n,
        player: ctx.player,
    })
    .map(Message::ResultPanel);

    let panels = Row::new()
        .spacing(spacing::LG)
        .padding(spacing::LG)
        .align_y(alignment::Vertical::Top)
        .push(face)
        .push(result);

    let mut stack = Stack::new().push(
        Container::new(panels)
            .width(Length::Fill)
            .height(Length::Fill),
    );

    if ctx.loading {
        stack = stack.push(loading_overlay::view(ctx.i18n, ctx.spinner_rotation));
    }

    stack
        .push(Toast::view_overlay(ctx.notifications, ctx.i18n).map(Message::Notification))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
