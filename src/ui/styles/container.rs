// SPDX-License-Identifier: MPL-2.0
//! Container styles.

use crate::ui::design_tokens::{border, opacity, palette, radius};
use iced::widget::container;
use iced::{Background, Border, Color, Theme};

/// Panel surface for the face and result panels.
///
/// Derived from the theme background so both light and dark modes stay
/// readable.
pub fn panel(theme: &Theme) -> container::Style {
    let base = theme.extended_palette().background.base.color;

    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::SURFACE,
            ..base
        })),
        border: Border {
            color: theme.extended_palette().background.strong.color,
            width: border::WIDTH_SM,
            radius: radius::LG.into(),
        },
        ..Default::default()
    }
}

/// Drop target. Highlighted while a file hovers the window.
pub fn drop_zone(is_dragging: bool) -> impl Fn(&Theme) -> container::Style {
    move |theme: &Theme| {
        let extended = theme.extended_palette();
        let (background, border_color) = if is_dragging {
            (
                Color {
                    a: opacity::OVERLAY_SUBTLE,
                    ..palette::PRIMARY_400
                },
                palette::PRIMARY_500,
            )
        } else {
            (extended.background.weak.color, palette::GRAY_400)
        };

        container::Style {
            background: Some(Background::Color(background)),
            border: Border {
                color: border_color,
                width: border::WIDTH_MD,
                radius: radius::MD.into(),
            },
            text_color: Some(extended.background.base.text),
            ..Default::default()
        }
    }
}

/// Black frame behind camera previews and video frames.
pub fn media_frame(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::BLACK)),
        border: Border {
            radius: radius::MD.into(),
            ..Default::default()
        },
        text_color: Some(palette::WHITE),
        ..Default::default()
    }
}
