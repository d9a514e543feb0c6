// SPDX-License-Identifier: MPL-2.0
//! The user's face image and the ways it can be chosen.
//!
//! Uploads and drops become [`SelectedImage::LocalFile`], webcam snapshots
//! become [`SelectedImage::DataUrl`] and the configured sample image is a
//! [`SelectedImage::RemoteUrl`]. Only one selection exists at a time.

use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Extensions offered by the open dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// An image read from disk, kept in memory until submission.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads `path` into memory. The MIME type comes from the extension.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, mime_type_for_path(path), bytes))
    }
}

// Raw bytes make Debug output unreadable.
impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedImage {
    /// A sample image reachable over HTTP(S).
    RemoteUrl(String),
    /// A file chosen in the picker or dropped on the window.
    LocalFile(LocalFile),
    /// A webcam still, `data:<mime>;base64,<payload>`.
    DataUrl(String),
}

impl SelectedImage {
    /// Short label for the face panel caption and logs.
    pub fn label(&self) -> String {
        match self {
            SelectedImage::RemoteUrl(url) => url
                .rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .unwrap_or(url)
                .to_string(),
            SelectedImage::LocalFile(file) => file.name.clone(),
            SelectedImage::DataUrl(_) => "snapshot.png".to_string(),
        }
    }

    /// Encoded image bytes when they are already in memory.
    ///
    /// Remote images and malformed data URLs return `None`.
    pub fn preview_bytes(&self) -> Option<Vec<u8>> {
        use base64::Engine;

        match self {
            SelectedImage::LocalFile(file) => Some(file.bytes.to_vec()),
            SelectedImage::DataUrl(url) => {
                let (_, payload) = url.split_once(',')?;
                base64::engine::general_purpose::STANDARD.decode(payload).ok()
            }
            SelectedImage::RemoteUrl(_) => None,
        }
    }
}

/// Infers a MIME type from the file extension.
pub fn mime_type_for_path(path: &Path) -> String {
    image_rs::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME.to_string())
}

/// Holds the current selection.
#[derive(Debug, Clone, Default)]
pub struct SourceManager {
    selected: Option<SelectedImage>,
}

impl SourceManager {
    pub fn new(initial: Option<SelectedImage>) -> Self {
        Self { selected: initial }
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    pub fn set_from_upload(&mut self, file: LocalFile) {
        tracing::debug!(name = %file.name, "face image selected from picker");
        self.selected = Some(SelectedImage::LocalFile(file));
    }

    /// Takes the first file of a drop; the rest are ignored.
    pub fn set_from_drop(&mut self, files: Vec<LocalFile>) {
        if let Some(file) = files.into_iter().next() {
            tracing::debug!(name = %file.name, "face image selected from drop");
            self.selected = Some(SelectedImage::LocalFile(file));
        }
    }

    pub fn set_from_capture(&mut self, data_url: String) {
        self.selected = Some(SelectedImage::DataUrl(data_url));
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

/// Drag-and-drop gesture over the window.
///
/// The windowing layer reports one event per file. `DropZone` folds them back
/// into a single gesture so only the first dropped path is accepted.
#[derive(Debug, Clone, Default)]
pub struct DropZone {
    hovering: bool,
    drop_consumed: bool,
}

impl DropZone {
    pub fn is_dragging(&self) -> bool {
        self.hovering
    }

    pub fn hover(&mut self) {
        if !self.hovering {
            self.hovering = true;
            self.drop_consumed = false;
        }
    }

    pub fn leave(&mut self) {
        self.hovering = false;
        self.drop_consumed = false;
    }

    /// Returns the path to load, or `None` when this gesture already produced one.
    pub fn drop_file(&mut self, path: PathBuf) -> Option<PathBuf> {
        self.hovering = false;

        if self.drop_consumed {
            tracing::debug!(path = %path.display(), "ignoring extra dropped file");
            return None;
        }
        self.drop_consumed = true;
        Some(path)
    }

    /// Closes the gesture once its file has been loaded.
    ///
    /// The remaining per-file drop events of a gesture are queued before the
    /// load completes, so they are still rejected.
    pub fn finish_drop(&mut self) {
        self.drop_consumed = false;
    }
}
