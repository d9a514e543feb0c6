// SPDX-License-Identifier: MPL-2.0
//! Overlay styles for the loading screen.

use crate::ui::design_tokens::{
    opacity,
    palette::{BLACK, WHITE},
    radius,
};
use iced::widget::container;
use iced::{Background, Border, Color, Theme};

/// Dims the whole window while a submission runs.
pub fn backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::OVERLAY_STRONG,
            ..BLACK
        })),
        text_color: Some(WHITE),
        ..Default::default()
    }
}

/// Card holding the loading label.
pub fn card(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::OVERLAY_HOVER,
            ..BLACK
        })),
        text_color: Some(WHITE),
        border: Border {
            color: Color {
                a: opacity::OVERLAY_SUBTLE,
                ..WHITE
            },
            width: 1.0,
            radius: radius::LG.into(),
        },
        ..Default::default()
    }
}
