// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for application directories.
//!
//! # Path Resolution Order
//!
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **CLI arguments** (`--data-dir`, `--config-dir`) - set via [`init_cli_overrides`]
//! 3. **Environment variables** (`FACEMOTION_DATA_DIR`, `FACEMOTION_CONFIG_DIR`)
//! 4. **Platform default** - via `dirs` crate
//!
//! Generated videos land in a `videos/` subdirectory of the platform cache
//! directory, or of the data directory when a data override is active so that
//! portable installs keep everything in one place.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "FaceMotion";

/// Subdirectory holding generated videos.
const VIDEOS_DIR: &str = "videos";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "FACEMOTION_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "FACEMOTION_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Initializes CLI overrides for data and config directories.
///
/// Call once at startup before any path is resolved. Later calls are ignored.
pub fn init_cli_overrides(data_dir: Option<String>, config_dir: Option<String>) {
    if CLI_DATA_DIR.set(data_dir.map(PathBuf::from)).is_err()
        || CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from)).is_err()
    {
        tracing::warn!("directory overrides were already initialized");
    }
}

fn get_cli_data_dir() -> Option<PathBuf> {
    CLI_DATA_DIR.get().and_then(Clone::clone)
}

fn get_cli_config_dir() -> Option<PathBuf> {
    CLI_CONFIG_DIR.get().and_then(Clone::clone)
}

fn env_dir(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the application data directory path (persisted state lives here).
///
/// Returns `None` if the data directory cannot be determined (rare edge case).
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

/// Returns the application data directory path with an optional override.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path
        .or_else(get_cli_data_dir)
        .or_else(|| env_dir(ENV_DATA_DIR))
        .or_else(|| {
            dirs::data_dir().map(|mut path| {
                path.push(APP_NAME);
                path
            })
        })
}

/// Returns the application config directory path (`settings.toml` lives here).
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path
        .or_else(get_cli_config_dir)
        .or_else(|| env_dir(ENV_CONFIG_DIR))
        .or_else(|| {
            dirs::config_dir().map(|mut path| {
                path.push(APP_NAME);
                path
            })
        })
}

/// Returns the directory where generated videos are written.
pub fn get_videos_dir() -> Option<PathBuf> {
    get_videos_dir_with_override(None)
}

/// Returns the generated videos directory with an optional override of its parent.
pub fn get_videos_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    let base = override_path
        .or_else(get_cli_data_dir)
        .or_else(|| env_dir(ENV_DATA_DIR))
        .or_else(|| {
            dirs::cache_dir().map(|mut path| {
                path.push(APP_NAME);
                path
            })
        })?;
    Some(base.join(VIDEOS_DIR))
}
