// SPDX-License-Identifier: MPL-2.0
//! Result panel: the generated video with play, pause and replay.

use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::styles;
use crate::video_player::{PlaybackState, VideoPlayer};
use iced::widget::{button, image, text, Column, Container, Row, Text};
use iced::{alignment, ContentFit, Element, Length, Theme};

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub player: Option<&'a VideoPlayer>,
}

#[derive(Debug, Clone)]
pub enum Message {
    TogglePlayback,
    Replay,
}

#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let title = Text::new(ctx.i18n.tr("result-panel-title")).size(typography::TITLE_SM);

    let body: Element<'_, Message> = match ctx.player {
        None => placeholder(ctx.i18n.tr("result-panel-empty")),
        Some(player) => player_view(ctx.i18n, player),
    };

    Container::new(
        Column::new()
            .spacing(spacing::SM)
            .width(Length::Fill)
            .push(title)
            .push(body),
    )
    .padding(spacing::MD)
    .width(Length::Fill)
    .style(styles::container::panel)
    .into()
}

fn player_view<'a>(i18n: &'a I18n, player: &'a VideoPlayer) -> Element<'a, Message> {
    if let Some(error) = player.state().error() {
        let message = Text::new(i18n.tr(error.i18n_key()))
            .size(typography::BODY)
            .style(|_theme: &Theme| text::Style {
                color: Some(palette::ERROR_500),
            });
        return frame(message.into());
    }

    let picture: Element<'a, Message> = match player.frame() {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => Text::new(i18n.tr("result-panel-loading"))
            .size(typography::BODY)
            .into(),
    };

    let state = player.state();
    let toggle_label = if state.is_playing() {
        i18n.tr("result-panel-pause")
    } else {
        i18n.tr("result-panel-play")
    };
    let ready = !matches!(state, PlaybackState::Loading);

    let position = state
        .position()
        .map(format_position)
        .unwrap_or_default();

    let controls = Row::new()
        .spacing(spacing::SM)
        .align_y(alignment::Vertical::Center)
        .push(
            button(Text::new(toggle_label).size(typography::BODY))
                .on_press_maybe(ready.then_some(Message::TogglePlayback))
                .style(styles::button::primary),
        )
        .push(
            button(Text::new(i18n.tr("result-panel-replay")).size(typography::BODY))
                .on_press_maybe(ready.then_some(Message::Replay))
                .style(styles::button::secondary),
        )
        .push(Text::new(position).size(typography::CAPTION));

    Column::new()
        .spacing(spacing::SM)
        .push(frame(picture))
        .push(controls)
        .into()
}

fn frame(content: Element<'_, Message>) -> Element<'_, Message> {
    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fixed(sizing::RESULT_PANEL_WIDTH))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(sizing::RESULT_PANEL_WIDTH))
        .style(styles::container::media_frame)
        .into()
}

fn placeholder<'a>(label: String) -> Element<'a, Message> {
    frame(Text::new(label).size(typography::BODY).into())
}

/// Formats seconds as `m:ss`.
fn format_position(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
