// SPDX-License-Identifier: MPL-2.0
//! Full-window overlay shown while a submission runs.

use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, spacing, typography};
use crate::ui::styles;
use crate::ui::widgets::Spinner;
use iced::widget::{Column, Container, Text};
use iced::{alignment, Element, Length};

#[must_use]
pub fn view<'a, Message: 'static>(i18n: &I18n, rotation: f32) -> Element<'a, Message> {
    let card = Column::new()
        .spacing(spacing::SM)
        .align_x(alignment::Horizontal::Center)
        .push(Spinner::new(palette::PRIMARY_400, rotation).into_element())
        .push(Text::new(i18n.tr("loading-generating")).size(typography::BODY_LG));

    Container::new(
        Container::new(card)
            .padding(spacing::LG)
            .style(styles::overlay::card),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .style(styles::overlay::backdrop)
    .into()
}
