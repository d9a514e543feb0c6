// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[general]` - Language and theme mode
//! - `[service]` - Animation service endpoint, API key and request timeout
//! - `[portrait]` - Sample face image and camera selection
//!
//! # Path Resolution
//!
//! The config file location can be customized for testing or portable deployments:
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Pass `--config-dir` or set `FACEMOTION_CONFIG_DIR`
//! 3. Falls back to platform-specific config directory
//!
//! # API key
//!
//! The key is never compiled in. [`ServiceSettings::resolve`] reads the
//! `FACEMOTION_API_KEY` environment variable first and falls back to
//! `[service] api_key`.
//!
//! # Examples
//!
//! ```no_run
//! use facemotion::config::{self, ServiceSettings};
//!
//! let (config, _warning) = config::load();
//! let settings = ServiceSettings::resolve(&config.service);
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::error::{Error, Result};
use crate::ui::theming::ThemeMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// UI language code (e.g., "en-US", "fr").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Application theme mode (light, dark, or system).
    #[serde(
        default = "default_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: None,
            theme_mode: default_theme_mode(),
        }
    }
}

/// Animation service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Endpoint override. Defaults to the hosted live-portrait endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key. `FACEMOTION_API_KEY` takes precedence when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Face image acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortraitConfig {
    /// Sample face image URL preselected at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_face_image: Option<String>,

    /// Index of the camera opened by the capture button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_index: Option<u32>,
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub portrait: PortraitConfig,
}

/// Service settings after environment overrides and clamping.
#[derive(Clone, PartialEq)]
pub struct ServiceSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ServiceSettings {
    /// Resolves the effective settings from the config and the process environment.
    pub fn resolve(config: &ServiceConfig) -> Self {
        Self::resolve_with_env(config, std::env::var(ENV_API_KEY).ok())
    }

    /// Same as [`resolve`](Self::resolve) with an explicit environment value.
    pub fn resolve_with_env(config: &ServiceConfig, env_key: Option<String>) -> Self {
        let api_key = env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| config.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let timeout_secs = config
            .timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);

        Self {
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE_ENDPOINT.to_string()),
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

// The key must never end up in logs.
impl std::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_theme_mode() -> ThemeMode {
    ThemeMode::System
}

fn default_timeout_secs() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_SECS)
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> std::result::Result<ThemeMode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;
    match raw.to_lowercase().as_str() {
        "light" => Ok(ThemeMode::Light),
        "dark" => Ok(ThemeMode::Dark),
        "system" => Ok(ThemeMode::System),
        other => Err(D::Error::custom(format!("invalid theme_mode: {}", other))),
    }
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with the i18n key of a warning explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "falling back to default config");
                    return (
                        Config::default(),
                        Some("notification-config-load-error".to_string()),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_settings() {
        let config = Config {
            general: GeneralConfig {
                language: Some("fr".to_string()),
                theme_mode: ThemeMode::Light,
            },
            service: ServiceConfig {
                endpoint: Some("http://localhost:9000/animate".to_string()),
                api_key: Some("secret".to_string()),
                timeout_secs: Some(60),
            },
            portrait: PortraitConfig {
                default_face_image: Some("https://example.com/face.jpg".to_string()),
                camera_index: Some(1),
            },
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_invalid_toml_errors() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let result = load_from_path(&config_path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn load_with_override_warns_on_invalid_file() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "[general\n").expect("write");

        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert_eq!(warning.as_deref(), Some("notification-config-load-error"));
    }

    #[test]
    fn load_with_override_missing_file_is_silent_default() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "[service]\napi_key = \"abc\"\n").expect("write");

        let loaded = load_from_path(&config_path).expect("load");
        assert_eq!(loaded.service.api_key.as_deref(), Some("abc"));
        assert_eq!(loaded.service.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(loaded.general.theme_mode, ThemeMode::System);
    }

    #[test]
    fn env_key_takes_precedence_over_config_key() {
        let service = ServiceConfig {
            api_key: Some("from-config".to_string()),
            ..ServiceConfig::default()
        };
        let settings = ServiceSettings::resolve_with_env(&service, Some("from-env".to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn blank_env_key_falls_back_to_config() {
        let service = ServiceConfig {
            api_key: Some(" from-config ".to_string()),
            ..ServiceConfig::default()
        };
        let settings = ServiceSettings::resolve_with_env(&service, Some("   ".to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("from-config"));
    }

    #[test]
    fn missing_key_resolves_to_none() {
        let settings = ServiceSettings::resolve_with_env(&ServiceConfig::default(), None);
        assert!(settings.api_key.is_none());
        assert_eq!(settings.endpoint, DEFAULT_SERVICE_ENDPOINT);
    }

    #[test]
    fn timeout_is_clamped() {
        let service = ServiceConfig {
            timeout_secs: Some(1),
            ..ServiceConfig::default()
        };
        let settings = ServiceSettings::resolve_with_env(&service, None);
        assert_eq!(settings.timeout, Duration::from_secs(MIN_TIMEOUT_SECS));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let service = ServiceConfig {
            api_key: Some("super-secret".to_string()),
            ..ServiceConfig::default()
        };
        let settings = ServiceSettings::resolve_with_env(&service, None);
        let debug = format!("{settings:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
