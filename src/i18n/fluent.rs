// SPDX-License-Identifier: MPL-2.0
use crate::config::Config;
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource};
use rust_embed::RustEmbed;
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

const DEFAULT_LOCALE: &str = "en-US";

pub struct I18n {
    bundles: HashMap<LanguageIdentifier, FluentBundle<FluentResource>>,
    pub available_locales: Vec<LanguageIdentifier>,
    current_locale: LanguageIdentifier,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(None, &Config::default())
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("available_locales", &self.available_locales)
            .field("current_locale", &self.current_locale)
            .finish()
    }
}

impl I18n {
    pub fn new(cli_lang: Option<String>, config: &Config) -> Self {
        let mut bundles = HashMap::new();
        let mut available_locales = Vec::new();

        for file in Asset::iter() {
            let filename = file.as_ref();
            let Some(locale) = filename
                .strip_suffix(".ftl")
                .and_then(|stem| stem.parse::<LanguageIdentifier>().ok())
            else {
                continue;
            };
            let Some(content) = Asset::get(filename) else {
                continue;
            };

            let source = String::from_utf8_lossy(content.data.as_ref()).to_string();
            let resource = match FluentResource::try_new(source) {
                Ok(resource) => resource,
                Err((resource, errors)) => {
                    tracing::warn!(file = filename, count = errors.len(), "translation file has syntax errors");
                    resource
                }
            };

            let mut bundle = FluentBundle::new(vec![locale.clone()]);
            // Isolation marks render as boxes in iced text.
            bundle.set_use_isolating(false);
            if let Err(errors) = bundle.add_resource(resource) {
                tracing::warn!(file = filename, count = errors.len(), "duplicate translation keys");
            }
            bundles.insert(locale.clone(), bundle);
            available_locales.push(locale);
        }
        available_locales.sort_by_key(|locale| locale.to_string());

        let current_locale = resolve_locale(cli_lang, config, &available_locales)
            .unwrap_or_else(default_locale);

        Self {
            bundles,
            available_locales,
            current_locale,
        }
    }

    pub fn current_locale(&self) -> &LanguageIdentifier {
        &self.current_locale
    }

    pub fn tr(&self, key: &str) -> String {
        self.format(key, None)
    }

    pub fn tr_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.format(key, Some(&fluent_args))
    }

    fn format(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let fallback = default_locale();
        for locale in [&self.current_locale, &fallback] {
            let Some(bundle) = self.bundles.get(locale) else {
                continue;
            };
            let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
                continue;
            };
            let mut errors = vec![];
            let value = bundle.format_pattern(pattern, args, &mut errors);
            if errors.is_empty() {
                return value.to_string();
            }
        }
        format!("MISSING: {}", key)
    }
}

fn default_locale() -> LanguageIdentifier {
    DEFAULT_LOCALE.parse().unwrap_or_default()
}

fn resolve_locale(
    cli_lang: Option<String>,
    config: &Config,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    let candidates = [
        cli_lang,
        config.general.language.clone(),
        sys_locale::get_locale(),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|raw| raw.parse::<LanguageIdentifier>().ok())
        .find_map(|wanted| match_available(&wanted, available))
}

/// Exact match first, then a bare-language match ("fr-CA" -> "fr").
fn match_available(
    wanted: &LanguageIdentifier,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    if available.contains(wanted) {
        return Some(wanted.clone());
    }
    available
        .iter()
        .find(|locale| locale.language == wanted.language)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<LanguageIdentifier> {
        vec!["en-US".parse().unwrap(), "fr".parse().unwrap()]
    }

    #[test]
    fn cli_language_wins() {
        let mut config = Config::default();
        config.general.language = Some("en-US".to_string());
        let lang = resolve_locale(Some("fr".to_string()), &config, &available());
        assert_eq!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn config_language_is_used_without_cli() {
        let mut config = Config::default();
        config.general.language = Some("fr".to_string());
        let lang = resolve_locale(None, &config, &available());
        assert_eq!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn regional_variant_falls_back_to_language() {
        let lang = resolve_locale(Some("fr-CA".to_string()), &Config::default(), &available());
        assert_eq!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn default_locale_is_en_us() {
        assert_eq!(default_locale().to_string(), DEFAULT_LOCALE);
    }

    #[test]
    fn embedded_bundles_translate_known_keys() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        assert_eq!(i18n.tr("notification-invalid-face"), "Invalid Face image");
        assert_eq!(i18n.tr("loading-generating"), "Generating...");
    }

    #[test]
    fn unknown_key_is_marked_missing() {
        let i18n = I18n::default();
        assert_eq!(i18n.tr("no-such-key"), "MISSING: no-such-key");
    }

    #[test]
    fn args_are_interpolated() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let text = i18n.tr_with_args("notification-service-error", &[("status", "503")]);
        assert!(text.contains("503"));
    }

    #[test]
    fn french_bundle_is_available() {
        let i18n = I18n::new(Some("fr".to_string()), &Config::default());
        assert_eq!(i18n.current_locale().to_string(), "fr");
        assert!(!i18n.tr("notification-no-image").starts_with("MISSING"));
    }
}
