// SPDX-License-Identifier: MPL-2.0
//! Session state persisted in CBOR next to (not inside) the user preferences.
//!
//! Only dialog directories live here: they improve the next session but are
//! not something a user edits by hand, unlike `settings.toml`.

use super::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.cbor";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    /// Initial directory of the "choose a face image" dialog.
    #[serde(default)]
    pub last_open_directory: Option<PathBuf>,

    /// Initial directory of the "download video" dialog.
    #[serde(default)]
    pub last_save_directory: Option<PathBuf>,
}

impl AppState {
    /// Loads state from the default location.
    ///
    /// Returns `(state, warning_key)`. Failures fall back to the default state.
    pub fn load() -> (Self, Option<String>) {
        Self::load_from(None)
    }

    pub fn load_from(base_dir: Option<PathBuf>) -> (Self, Option<String>) {
        let Some(path) = Self::state_file_path_with_override(base_dir) else {
            return (Self::default(), None);
        };

        if !path.exists() {
            return (Self::default(), None);
        }

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot open session state");
                return (
                    Self::default(),
                    Some("notification-state-read-error".to_string()),
                );
            }
        };

        match ciborium::from_reader(BufReader::new(file)) {
            Ok(state) => (state, None),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot parse session state");
                (
                    Self::default(),
                    Some("notification-state-parse-error".to_string()),
                )
            }
        }
    }

    /// Saves state to the default location. Returns a warning key on failure.
    pub fn save(&self) -> Option<String> {
        self.save_to(None)
    }

    pub fn save_to(&self, base_dir: Option<PathBuf>) -> Option<String> {
        let Some(path) = Self::state_file_path_with_override(base_dir) else {
            return Some("notification-state-write-error".to_string());
        };

        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(dir = %parent.display(), error = %err, "cannot create state directory");
                return Some("notification-state-write-error".to_string());
            }
        }

        let written = fs::File::create(&path)
            .map_err(|err| err.to_string())
            .and_then(|file| {
                ciborium::into_writer(self, BufWriter::new(file)).map_err(|err| err.to_string())
            });

        match written {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot write session state");
                Some("notification-state-write-error".to_string())
            }
        }
    }

    fn state_file_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
        paths::get_app_data_dir_with_override(base_dir).map(|mut path| {
            path.push(STATE_FILE);
            path
        })
    }

    /// Remembers the parent of `file_path` for the next save dialog.
    pub fn set_last_save_directory_from_file(&mut self, file_path: &Path) {
        if let Some(parent) = file_path.parent() {
            self.last_save_directory = Some(parent.to_path_buf());
        }
    }

    /// Remembers the parent of `file_path` for the next open dialog.
    pub fn set_last_open_directory_from_file(&mut self, file_path: &Path) {
        if let Some(parent) = file_path.parent() {
            self.last_open_directory = Some(parent.to_path_buf());
        }
    }
}
