// SPDX-License-Identifier: MPL-2.0
//! Button styles.

use crate::ui::design_tokens::{
    border,
    palette::{self, WHITE},
    radius, shadow,
};
use iced::widget::button;
use iced::{Background, Border, Color, Theme};

fn outline(color: Color) -> Border {
    Border {
        color,
        width: border::WIDTH_SM,
        radius: radius::SM.into(),
    }
}

fn disabled_style(theme: &Theme) -> button::Style {
    let is_light = matches!(theme, Theme::Light);
    button::Style {
        background: Some(Background::Color(if is_light {
            palette::GRAY_200
        } else {
            palette::GRAY_700
        })),
        text_color: palette::GRAY_400,
        border: outline(palette::GRAY_400),
        shadow: shadow::NONE,
        ..button::Style::default()
    }
}

/// Main call to action (Generate, Take photo).
pub fn primary(theme: &Theme, status: button::Status) -> button::Style {
    match status {
        button::Status::Active | button::Status::Pressed => button::Style {
            background: Some(Background::Color(palette::PRIMARY_500)),
            text_color: WHITE,
            border: outline(palette::PRIMARY_600),
            shadow: shadow::SM,
            ..button::Style::default()
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(palette::PRIMARY_400)),
            text_color: WHITE,
            border: outline(palette::PRIMARY_500),
            shadow: shadow::MD,
            ..button::Style::default()
        },
        button::Status::Disabled => disabled_style(theme),
    }
}

/// Secondary actions (Upload, Camera, Cancel, Download).
pub fn secondary(theme: &Theme, status: button::Status) -> button::Style {
    let is_light = matches!(theme, Theme::Light);
    let (bg_color, text_color) = if is_light {
        (palette::GRAY_100, palette::GRAY_900)
    } else {
        (palette::GRAY_700, WHITE)
    };

    match status {
        button::Status::Active | button::Status::Pressed => button::Style {
            background: Some(Background::Color(bg_color)),
            text_color,
            border: outline(palette::GRAY_400),
            shadow: shadow::NONE,
            ..button::Style::default()
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(if is_light {
                palette::GRAY_200
            } else {
                Color::from_rgb(0.35, 0.35, 0.35)
            })),
            text_color,
            border: outline(palette::PRIMARY_500),
            shadow: shadow::SM,
            ..button::Style::default()
        },
        button::Status::Disabled => disabled_style(theme),
    }
}

/// Borderless button wrapping the drop zone.
pub fn drop_zone(_theme: &Theme, _status: button::Status) -> button::Style {
    button::Style {
        background: None,
        border: Border::default(),
        shadow: shadow::NONE,
        ..button::Style::default()
    }
}
