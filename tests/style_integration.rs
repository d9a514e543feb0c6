// SPDX-License-Identifier: MPL-2.0
//! Integration tests to validate style and design token coherence.

#[cfg(test)]
mod tests {
    use iced::widget::button::Status;
    use iced::{Background, Theme};
    use facemotion::ui::design_tokens::{opacity, palette, sizing, spacing};
    use facemotion::ui::styles::{button, container, overlay};
    use facemotion::ui::theming::ThemeMode;

    #[test]
    fn all_styles_are_callable_in_both_themes() {
        for theme in [Theme::Light, Theme::Dark] {
            for status in [Status::Active, Status::Hovered, Status::Pressed, Status::Disabled] {
                let _ = button::primary(&theme, status);
                let _ = button::secondary(&theme, status);
                let _ = button::drop_zone(&theme, status);
            }
            let _ = container::panel(&theme);
            let _ = container::drop_zone(true)(&theme);
            let _ = container::media_frame(&theme);
            let _ = overlay::backdrop(&theme);
            let _ = overlay::card(&theme);
        }
    }

    #[test]
    fn dragging_highlights_the_drop_zone() {
        let theme = Theme::Dark;
        let idle = container::drop_zone(false)(&theme);
        let dragging = container::drop_zone(true)(&theme);

        assert_ne!(idle.border.color, dragging.border.color);
        assert_eq!(dragging.border.color, palette::PRIMARY_500);
    }

    #[test]
    fn backdrop_is_translucent() {
        let style = overlay::backdrop(&Theme::Light);
        match style.background {
            Some(Background::Color(color)) => assert!(color.a < opacity::OPAQUE),
            other => panic!("unexpected backdrop background: {other:?}"),
        }
    }

    #[test]
    fn panels_share_the_snapshot_width() {
        assert_eq!(sizing::FACE_PANEL_WIDTH, sizing::RESULT_PANEL_WIDTH);
        assert!(spacing::XS < spacing::MD);
    }

    #[test]
    fn theme_modes_resolve_to_iced_themes() {
        assert_eq!(ThemeMode::Light.iced_theme(), Theme::Light);
        assert_eq!(ThemeMode::Dark.iced_theme(), Theme::Dark);
    }
}
