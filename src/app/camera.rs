// SPDX-License-Identifier: MPL-2.0
//! Webcam state owned by the application: the capture session and the
//! preview handle shown in the face panel.

use super::Message;
use crate::portrait::capture::SessionStatus;
use crate::portrait::{CameraError, CameraProvider, CameraRequest, CaptureSession};
use iced::widget::image;
use iced::Task;
use std::sync::Arc;

pub struct CameraState {
    provider: Arc<dyn CameraProvider>,
    index: u32,
    session: Option<CaptureSession>,
    /// Preview handle with the generation it was built from.
    frame: Option<(u64, image::Handle)>,
}

impl std::fmt::Debug for CameraState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraState")
            .field("index", &self.index)
            .field("session", &self.session)
            .field("generation", &self.frame.as_ref().map(|(generation, _)| *generation))
            .finish()
    }
}

impl CameraState {
    pub fn new(provider: Arc<dyn CameraProvider>, index: u32) -> Self {
        Self {
            provider,
            index,
            session: None,
            frame: None,
        }
    }

    /// Starts a capture session. The open result arrives as
    /// [`Message::CameraOpened`]. Does nothing if the camera is already on.
    pub fn open(&mut self) -> Task<Message> {
        if self.is_on() {
            return Task::none();
        }

        let (session, opened) =
            CaptureSession::start(Arc::clone(&self.provider), CameraRequest::new(self.index));
        self.session = Some(session);
        self.frame = None;

        Task::perform(
            async move {
                match tokio::task::spawn_blocking(move || opened.recv()).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(CameraError::Stream("camera worker exited".into())),
                    Err(err) => Err(CameraError::Stream(err.to_string())),
                }
            },
            Message::CameraOpened,
        )
    }

    pub fn is_on(&self) -> bool {
        self.session.is_some()
    }

    pub fn frame_handle(&self) -> Option<&image::Handle> {
        self.frame.as_ref().map(|(_, handle)| handle)
    }

    /// Rebuilds the preview when a new frame arrived.
    ///
    /// Returns the failure if the stream died; the session is closed then.
    pub fn refresh(&mut self) -> Option<CameraError> {
        let session = self.session.as_ref()?;

        if let SessionStatus::Failed(err) = session.status() {
            self.close();
            return Some(err);
        }

        if let Some((generation, frame)) = session.latest_frame() {
            let stale = self
                .frame
                .as_ref()
                .is_none_or(|(current, _)| *current != generation);
            if stale {
                let handle = image::Handle::from_rgba(
                    frame.width(),
                    frame.height(),
                    frame.as_raw().clone(),
                );
                self.frame = Some((generation, handle));
            }
        }
        None
    }

    /// Takes a snapshot and closes the camera.
    ///
    /// [`CameraError::NoFrame`] leaves the camera open so the user can retry.
    pub fn capture(&mut self) -> Result<String, CameraError> {
        let session = self.session.as_ref().ok_or(CameraError::NoFrame)?;
        let data_url = session.snapshot()?;
        self.close();
        Ok(data_url)
    }

    /// Closes the camera without taking a snapshot.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portrait::capture::tests::{wait_for_frame, FakeCamera};
    use std::sync::atomic::Ordering;

    fn started(camera: FakeCamera) -> CameraState {
        let mut state = CameraState::new(Arc::new(camera), 0);
        let _ = state.open();
        state
    }

    #[test]
    fn cancel_releases_the_stream() {
        let camera = FakeCamera::streaming();
        let stops = Arc::clone(&camera.stops);
        let mut state = started(camera);
        assert!(state.is_on());

        state.cancel();

        assert!(!state.is_on());
        assert!(state.frame_handle().is_none());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn capture_returns_png_data_url_and_closes() {
        let camera = FakeCamera::streaming();
        let stops = Arc::clone(&camera.stops);
        let mut state = started(camera);
        wait_for_frame(state.session.as_ref().expect("session"));

        let data_url = state.capture().expect("snapshot");

        assert!(data_url.starts_with("data:image/png;base64,"));
        assert!(!state.is_on());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn capture_without_frame_keeps_camera_open() {
        let camera = FakeCamera {
            frames: false,
            ..FakeCamera::streaming()
        };
        let mut state = started(camera);

        assert_eq!(state.capture(), Err(CameraError::NoFrame));
        assert!(state.is_on());
    }

    #[test]
    fn refresh_builds_preview_from_latest_frame() {
        let mut state = started(FakeCamera::streaming());
        wait_for_frame(state.session.as_ref().expect("session"));

        assert!(state.refresh().is_none());
        assert!(state.frame_handle().is_some());
    }

    #[test]
    fn refresh_reports_failed_stream() {
        let camera = FakeCamera {
            fail_with: Some(CameraError::NotFound(0)),
            ..FakeCamera::streaming()
        };
        let mut state = started(camera);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let error = loop {
            if let Some(err) = state.refresh() {
                break err;
            }
            assert!(std::time::Instant::now() < deadline, "failure not reported");
            std::thread::sleep(std::time::Duration::from_millis(2));
        };

        assert_eq!(error, CameraError::NotFound(0));
        assert!(!state.is_on());
    }

    #[test]
    fn open_twice_keeps_one_session() {
        let camera = FakeCamera::streaming();
        let stops = Arc::clone(&camera.stops);
        let mut state = started(camera);
        let _ = state.open();
        state.cancel();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
