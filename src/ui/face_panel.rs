// SPDX-License-Identifier: MPL-2.0
//! Face image panel: preview, drop zone, camera and the submit actions.

use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::styles;
use iced::widget::{button, image, text, Column, Container, Row, Text};
use iced::{alignment, ContentFit, Element, Length, Theme};

/// Preview of the current selection.
#[derive(Debug, Clone)]
pub enum Preview<'a> {
    Empty,
    /// Decodable image bytes.
    Image(&'a image::Handle),
    /// A selection without local bytes, such as a remote URL.
    Label(String),
}

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub preview: Preview<'a>,
    /// Latest camera frame while the camera is on.
    pub camera_frame: Option<&'a image::Handle>,
    pub is_camera_on: bool,
    pub is_dragging: bool,
    pub loading: bool,
    pub has_result: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Upload,
    Clear,
    OpenCamera,
    TakePhoto,
    CancelCamera,
    Generate,
    Download,
}

#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let title = Text::new(ctx.i18n.tr("face-panel-title")).size(typography::TITLE_SM);

    let mut content = Column::new()
        .spacing(spacing::SM)
        .width(Length::Fixed(sizing::FACE_PANEL_WIDTH))
        .push(title)
        .push(preview(&ctx))
        .push(drop_zone(&ctx));

    if ctx.is_camera_on {
        content = content.push(camera(&ctx));
    }

    let generate = action_button(
        ctx.i18n.tr("face-panel-generate"),
        (!ctx.loading).then_some(Message::Generate),
        styles::button::primary,
    );
    let download = action_button(
        ctx.i18n.tr("face-panel-download"),
        (!ctx.loading && ctx.has_result).then_some(Message::Download),
        styles::button::secondary,
    );

    content = content.push(generate).push(download);

    Container::new(content)
        .padding(spacing::MD)
        .style(styles::container::panel)
        .into()
}

fn preview<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let body: Element<'a, Message> = match &ctx.preview {
        Preview::Image(handle) => image((*handle).clone())
            .content_fit(ContentFit::Cover)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Preview::Label(label) => Text::new(label.clone()).size(typography::BODY).into(),
        Preview::Empty => Text::new(ctx.i18n.tr("face-panel-no-image"))
            .size(typography::BODY)
            .into(),
    };

    Container::new(body)
        .width(Length::Fill)
        .height(Length::Fixed(sizing::FACE_PREVIEW_HEIGHT))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(sizing::FACE_PREVIEW_HEIGHT))
        .style(styles::container::drop_zone(false))
        .into()
}

fn drop_zone<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let tools = Row::new()
        .spacing(spacing::XS)
        .push(tool_button(ctx.i18n.tr("face-panel-upload"), Message::Upload))
        .push(tool_button(ctx.i18n.tr("face-panel-clear"), Message::Clear))
        .push(tool_button(
            ctx.i18n.tr("face-panel-camera"),
            Message::OpenCamera,
        ));

    let call_to_action = Text::new(ctx.i18n.tr("face-panel-drop-hint"))
        .size(typography::BODY_LG)
        .style(|_theme: &Theme| text::Style {
            color: Some(palette::PRIMARY_500),
        });
    let constraints = Text::new(ctx.i18n.tr("face-panel-drop-constraints"))
        .size(typography::CAPTION)
        .style(|_theme: &Theme| text::Style {
            color: Some(palette::GRAY_400),
        });

    let zone = Column::new()
        .spacing(spacing::XS)
        .align_x(alignment::Horizontal::Center)
        .width(Length::Fill)
        .push(tools)
        .push(call_to_action)
        .push(constraints);

    // The whole zone behaves like the hidden file input it replaces.
    button(
        Container::new(zone)
            .padding(spacing::MD)
            .width(Length::Fill)
            .style(styles::container::drop_zone(ctx.is_dragging)),
    )
    .on_press(Message::Upload)
    .padding(0)
    .width(Length::Fill)
    .style(styles::button::drop_zone)
    .into()
}

fn camera<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let feed: Element<'a, Message> = match ctx.camera_frame {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => Text::new(ctx.i18n.tr("face-panel-camera-starting"))
            .size(typography::BODY)
            .into(),
    };

    let controls = Row::new()
        .spacing(spacing::MD)
        .push(action_button(
            ctx.i18n.tr("face-panel-take-photo"),
            ctx.camera_frame.is_some().then_some(Message::TakePhoto),
            styles::button::primary,
        ))
        .push(action_button(
            ctx.i18n.tr("face-panel-cancel"),
            Some(Message::CancelCamera),
            styles::button::secondary,
        ));

    Column::new()
        .spacing(spacing::SM)
        .push(
            Container::new(feed)
                .width(Length::Fill)
                .height(Length::Fixed(sizing::FACE_PREVIEW_HEIGHT))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(sizing::FACE_PREVIEW_HEIGHT))
                .style(styles::container::media_frame),
        )
        .push(controls)
        .into()
}

fn tool_button<'a>(label: String, message: Message) -> Element<'a, Message> {
    button(Text::new(label).size(typography::BODY))
        .on_press(message)
        .padding([spacing::XXS, spacing::SM])
        .style(styles::button::secondary)
        .into()
}

fn action_button<'a>(
    label: String,
    on_press: Option<Message>,
    style: fn(&Theme, button::Status) -> button::Style,
) -> Element<'a, Message> {
    button(
        Text::new(label)
            .size(typography::BODY_LG)
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Center),
    )
    .on_press_maybe(on_press)
    .width(Length::Fill)
    .height(Length::Fixed(sizing::BUTTON_HEIGHT))
    .style(style)
    .into()
}
