// SPDX-License-Identifier: MPL-2.0
//! Light/dark theming resolved from `[general] theme_mode`.

use iced::Theme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    /// Returns true if the effective theme is dark.
    /// System mode asks the desktop and defaults to dark on detection error.
    #[must_use]
    pub fn is_dark(self) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => !matches!(dark_light::detect(), Ok(dark_light::Mode::Light)),
        }
    }

    #[must_use]
    pub fn iced_theme(self) -> Theme {
        if self.is_dark() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_modes_map_to_iced_themes() {
        assert_eq!(ThemeMode::Light.iced_theme(), Theme::Light);
        assert_eq!(ThemeMode::Dark.iced_theme(), Theme::Dark);
        let _ = ThemeMode::System.iced_theme();
    }

    #[test]
    fn mode_uses_lowercase_names() {
        #[derive(Serialize)]
        struct Wrapper {
            mode: ThemeMode,
        }
        let text = toml::to_string(&Wrapper {
            mode: ThemeMode::Dark,
        })
        .expect("serialize");
        assert_eq!(text.trim(), "mode = \"dark\"");
    }
}
