// SPDX-License-Identifier: MPL-2.0
//! The generated video: response payload, its cache file and downloads.

use bytes::Bytes;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Raw service response.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoPayload {
    pub bytes: Bytes,
    pub content_type: String,
}

impl std::fmt::Debug for VideoPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPayload")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A payload written to disk so the player and the save dialog can use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub payload: VideoPayload,
    /// Resource reference: the cache file holding the payload.
    pub path: PathBuf,
}

impl GeneratedVideo {
    pub fn content_type(&self) -> &str {
        &self.payload.content_type
    }

    pub fn len(&self) -> usize {
        self.payload.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.bytes.is_empty()
    }

    /// Default name offered by the save dialog.
    pub fn download_file_name(&self) -> String {
        download_file_name(&self.path.to_string_lossy())
    }
}

/// File extension for a declared content type. Parameters are ignored.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Last path segment of a resource reference.
pub fn download_file_name(reference: &str) -> String {
    reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference)
        .to_string()
}

const FILE_PREFIX: &str = "facemotion-";

/// Writes the payload into `dir` as `facemotion-<timestamp>.<ext>`.
pub async fn persist(payload: VideoPayload, dir: &Path) -> std::io::Result<GeneratedVideo> {
    tokio::fs::create_dir_all(dir).await?;

    let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f").to_string();
    let extension = extension_for_content_type(&payload.content_type);
    let mut path = dir.join(format!("{FILE_PREFIX}{stamp}.{extension}"));
    // Two results within the same millisecond get a counter suffix.
    let mut counter = 1;
    while tokio::fs::try_exists(&path).await? {
        path = dir.join(format!("{FILE_PREFIX}{stamp}-{counter}.{extension}"));
        counter += 1;
    }

    tokio::fs::write(&path, &payload.bytes).await?;
    tracing::info!(path = %path.display(), len = payload.bytes.len(), "generated video stored");

    Ok(GeneratedVideo { payload, path })
}

/// Removes the cache file of a result that is no longer current.
///
/// A file still held open by the player may refuse removal on some
/// platforms; it is then left for [`clear_stale`] at the next start.
pub fn discard(video: &GeneratedVideo) {
    match std::fs::remove_file(&video.path) {
        Ok(()) => tracing::debug!(path = %video.path.display(), "previous video removed"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %video.path.display(), error = %err, "cannot remove previous video");
        }
    }
}

/// Deletes videos left in `dir` by earlier sessions. Returns how many were removed.
pub fn clear_stale(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_video = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(FILE_PREFIX));
        if !is_video || !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "cannot remove stale video"),
        }
    }

    if removed > 0 {
        tracing::info!(dir = %dir.display(), removed, "stale videos removed");
    }
    removed
}

/// Copies the video to the location picked in the save dialog.
pub async fn save_copy(video: &GeneratedVideo, destination: &Path) -> std::io::Result<()> {
    tokio::fs::write(destination, &video.payload.bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn payload() -> VideoPayload {
        VideoPayload {
            bytes: Bytes::from_static(b"\x00\x00\x00\x18ftypmp42"),
            content_type: "video/mp4".into(),
        }
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(download_file_name("/tmp/cache/facemotion-1.mp4"), "facemotion-1.mp4");
        assert_eq!(download_file_name(r"C:\cache\clip.webm"), "clip.webm");
        assert_eq!(download_file_name("default-video.mp4"), "default-video.mp4");
    }

    #[test]
    fn extension_ignores_parameters_and_case() {
        assert_eq!(extension_for_content_type("Video/MP4; codecs=avc1"), "mp4");
        assert_eq!(extension_for_content_type("video/webm"), "webm");
        assert_eq!(extension_for_content_type("application/octet-stream"), "bin");
    }

    #[tokio::test]
    async fn persist_writes_payload_with_matching_extension() {
        let dir = tempdir().expect("temp dir");
        let video = persist(payload(), &dir.path().join("videos"))
            .await
            .expect("persist");

        assert_eq!(video.path.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert!(video.download_file_name().starts_with("facemotion-"));
        let written = std::fs::read(&video.path).expect("read back");
        assert_eq!(written, payload().bytes.to_vec());
    }

    #[tokio::test]
    async fn persist_twice_never_reuses_a_path() {
        let dir = tempdir().expect("temp dir");
        let first = persist(payload(), dir.path()).await.expect("first");
        let second = persist(payload(), dir.path()).await.expect("second");

        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    #[tokio::test]
    async fn discard_removes_the_cache_file() {
        let dir = tempdir().expect("temp dir");
        let video = persist(payload(), dir.path()).await.expect("persist");

        discard(&video);
        assert!(!video.path.exists());

        // Already gone: nothing to do.
        discard(&video);
    }

    #[test]
    fn clear_stale_only_touches_generated_videos() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("facemotion-20240101-000000.000.mp4"), b"old").expect("write");
        std::fs::write(dir.path().join("facemotion-20240101-000000.000-1.bin"), b"old").expect("write");
        std::fs::write(dir.path().join("notes.txt"), b"keep").expect("write");

        assert_eq!(clear_stale(dir.path()), 2);
        let left: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(left, vec![std::ffi::OsString::from("notes.txt")]);
    }

    #[test]
    fn clear_stale_ignores_missing_directory() {
        let dir = tempdir().expect("temp dir");
        assert_eq!(clear_stale(&dir.path().join("absent")), 0);
    }

    #[tokio::test]
    async fn save_copy_duplicates_bytes() {
        let dir = tempdir().expect("temp dir");
        let video = persist(payload(), dir.path()).await.expect("persist");
        let destination = dir.path().join("mine.mp4");

        save_copy(&video, &destination).await.expect("copy");
        assert_eq!(std::fs::read(destination).expect("read"), payload().bytes.to_vec());
    }
}
