// SPDX-License-Identifier: MPL-2.0
//! Webcam capture sessions and snapshots.
//!
//! A [`CaptureSession`] owns a worker thread that opens the camera, keeps the
//! most recent frame in a shared slot and stops the stream when the session is
//! stopped or dropped. Cameras are not `Send` on every backend, so the stream
//! is created and released on the worker itself.

use crate::config::{
    CAMERA_REQUEST_FPS, CAMERA_REQUEST_HEIGHT, CAMERA_REQUEST_WIDTH, SNAPSHOT_HEIGHT,
    SNAPSHOT_WIDTH,
};
use base64::Engine;
use image_rs::{imageops, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Pause between polls when the stream has no new frame.
const IDLE_POLL: Duration = Duration::from_millis(5);

/// How long `stop` waits for the worker before detaching it.
const WORKER_STOP_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("no camera found at index {0}")]
    NotFound(u32),
    #[error("camera stream failed: {0}")]
    Stream(String),
    #[error("no frame received from the camera yet")]
    NoFrame,
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

impl CameraError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied(_) => "notification-camera-denied",
            CameraError::NotFound(_) => "notification-camera-not-found",
            CameraError::Stream(_) => "notification-camera-error",
            CameraError::NoFrame => "notification-camera-no-frame",
            CameraError::Encode(_) => "notification-camera-snapshot-error",
        }
    }
}

/// What to ask the driver for. Drivers pick the closest supported mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl CameraRequest {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            width: CAMERA_REQUEST_WIDTH,
            height: CAMERA_REQUEST_HEIGHT,
            fps: CAMERA_REQUEST_FPS,
        }
    }
}

/// An open camera stream.
pub trait VideoStream {
    /// Blocks until the next frame, or returns `Ok(None)` when none is ready.
    fn next_frame(&mut self) -> Result<Option<RgbaImage>, CameraError>;

    /// Releases the device. Must be idempotent.
    fn stop(&mut self);
}

/// Opens camera streams.
pub trait CameraProvider: Send + Sync {
    fn open(&self, request: CameraRequest) -> Result<Box<dyn VideoStream>, CameraError>;
}

/// Lifecycle of the worker, as seen from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Starting,
    Streaming,
    Failed(CameraError),
    Stopped,
}

#[derive(Debug)]
struct Shared {
    status: SessionStatus,
    latest: Option<Arc<RgbaImage>>,
    /// Bumped on every frame so the UI only rebuilds its preview on change.
    generation: u64,
}

/// An open webcam preview awaiting a snapshot or cancellation.
pub struct CaptureSession {
    shared: Arc<Mutex<Shared>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("running", &self.running.load(Ordering::SeqCst))
            .field("status", &self.status())
            .finish()
    }
}

impl CaptureSession {
    /// Starts the worker thread, which opens the camera.
    ///
    /// The returned receiver yields once, after the open attempt.
    pub fn start(
        provider: Arc<dyn CameraProvider>,
        request: CameraRequest,
    ) -> (Self, mpsc::Receiver<Result<(), CameraError>>) {
        let shared = Arc::new(Mutex::new(Shared {
            status: SessionStatus::Starting,
            latest: None,
            generation: 0,
        }));
        let running = Arc::new(AtomicBool::new(true));
        let (opened_tx, opened_rx) = mpsc::channel();

        let worker = {
            let shared = Arc::clone(&shared);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("facemotion-camera".into())
                .spawn(move || capture_loop(provider.as_ref(), request, &shared, &running, &opened_tx))
        };

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                let error = CameraError::Stream(err.to_string());
                set_status(&shared, SessionStatus::Failed(error.clone()));
                running.store(false, Ordering::SeqCst);
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(Err(error));
                return (
                    Self {
                        shared,
                        running,
                        worker: None,
                    },
                    rx,
                );
            }
        };

        (
            Self {
                shared,
                running,
                worker,
            },
            opened_rx,
        )
    }

    pub fn status(&self) -> SessionStatus {
        self.shared
            .lock()
            .map(|shared| shared.status.clone())
            .unwrap_or(SessionStatus::Stopped)
    }

    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && matches!(
                self.status(),
                SessionStatus::Starting | SessionStatus::Streaming
            )
    }

    /// Latest frame and its generation counter.
    pub fn latest_frame(&self) -> Option<(u64, Arc<RgbaImage>)> {
        let shared = self.shared.lock().ok()?;
        shared
            .latest
            .as_ref()
            .map(|frame| (shared.generation, Arc::clone(frame)))
    }

    /// Renders the latest frame as a PNG data URL.
    ///
    /// Refuses with [`CameraError::NoFrame`] before the first frame; the
    /// session keeps running in that case.
    pub fn snapshot(&self) -> Result<String, CameraError> {
        let (_, frame) = self.latest_frame().ok_or(CameraError::NoFrame)?;
        snapshot_data_url(&frame)
    }

    /// Stops the stream and waits for the worker to release the device.
    ///
    /// A worker stuck in the driver is detached after a short wait; it
    /// releases the device once the driver returns.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let deadline = Instant::now() + WORKER_STOP_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(IDLE_POLL);
            }
            if !handle.is_finished() {
                tracing::warn!("camera worker did not stop in time, detaching it");
            } else if handle.join().is_err() {
                tracing::warn!("camera worker panicked");
            }
        }
        if let Ok(mut shared) = self.shared.lock() {
            if !matches!(shared.status, SessionStatus::Failed(_)) {
                shared.status = SessionStatus::Stopped;
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn set_status(shared: &Mutex<Shared>, status: SessionStatus) {
    if let Ok(mut shared) = shared.lock() {
        shared.status = status;
    }
}

fn capture_loop(
    provider: &dyn CameraProvider,
    request: CameraRequest,
    shared: &Mutex<Shared>,
    running: &AtomicBool,
    opened: &mpsc::Sender<Result<(), CameraError>>,
) {
    let mut stream = match provider.open(request) {
        Ok(stream) => {
            set_status(shared, SessionStatus::Streaming);
            let _ = opened.send(Ok(()));
            stream
        }
        Err(err) => {
            tracing::warn!(index = request.index, error = %err, "cannot open camera");
            set_status(shared, SessionStatus::Failed(err.clone()));
            running.store(false, Ordering::SeqCst);
            let _ = opened.send(Err(err));
            return;
        }
    };

    tracing::info!(index = request.index, "camera stream started");

    while running.load(Ordering::SeqCst) {
        match stream.next_frame() {
            Ok(Some(frame)) => {
                if let Ok(mut shared) = shared.lock() {
                    shared.latest = Some(Arc::new(frame));
                    shared.generation = shared.generation.wrapping_add(1);
                }
            }
            Ok(None) => thread::sleep(IDLE_POLL),
            Err(err) => {
                tracing::warn!(error = %err, "camera stream interrupted");
                set_status(shared, SessionStatus::Failed(err));
                running.store(false, Ordering::SeqCst);
            }
        }
    }

    stream.stop();
    tracing::info!(index = request.index, "camera stream stopped");
}

/// Draws `frame` into the snapshot canvas and returns a PNG data URL.
///
/// The frame is stretched to the canvas, like drawing a video onto an
/// HTML canvas of fixed size.
pub fn snapshot_data_url(frame: &RgbaImage) -> Result<String, CameraError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CameraError::NoFrame);
    }

    let canvas = imageops::resize(
        frame,
        SNAPSHOT_WIDTH,
        SNAPSHOT_HEIGHT,
        imageops::FilterType::Triangle,
    );

    let mut png = Cursor::new(Vec::new());
    canvas
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| CameraError::Encode(err.to_string()))?;

    let payload = base64::engine::general_purpose::STANDARD.encode(png.into_inner());
    Ok(format!("data:image/png;base64,{payload}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Camera double that produces solid frames and counts stops.
    pub(crate) struct FakeCamera {
        pub fail_with: Option<CameraError>,
        pub frames: bool,
        /// Time each frame read blocks, like a stalled driver.
        pub stall: Duration,
        pub stops: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        pub(crate) fn streaming() -> Self {
            Self {
                fail_with: None,
                frames: true,
                stall: Duration::ZERO,
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct FakeStream {
        frames: bool,
        stall: Duration,
        stops: Arc<AtomicUsize>,
        stopped: bool,
    }

    impl VideoStream for FakeStream {
        fn next_frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
            thread::sleep(self.stall);
            if !self.frames {
                return Ok(None);
            }
            thread::sleep(Duration::from_millis(2));
            Ok(Some(RgbaImage::from_pixel(
                64,
                48,
                image_rs::Rgba([200, 10, 10, 255]),
            )))
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.stops.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl CameraProvider for FakeCamera {
        fn open(&self, _request: CameraRequest) -> Result<Box<dyn VideoStream>, CameraError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(Box::new(FakeStream {
                frames: self.frames,
                stall: self.stall,
                stops: Arc::clone(&self.stops),
                stopped: false,
            }))
        }
    }

    pub(crate) fn wait_for_frame(session: &CaptureSession) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.latest_frame().is_none() {
            assert!(Instant::now() < deadline, "camera produced no frame");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn stop_releases_stream_and_joins_worker() {
        let camera = FakeCamera::streaming();
        let stops = Arc::clone(&camera.stops);
        let (mut session, opened) = CaptureSession::start(Arc::new(camera), CameraRequest::new(0));

        assert_eq!(opened.recv().expect("open result"), Ok(()));
        assert!(session.is_active());

        session.stop();
        assert!(!session.is_active());
        assert_eq!(session.status(), SessionStatus::Stopped);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_does_not_wait_for_a_stalled_driver() {
        let camera = FakeCamera {
            stall: Duration::from_secs(2),
            ..FakeCamera::streaming()
        };
        let stops = Arc::clone(&camera.stops);
        let (mut session, opened) = CaptureSession::start(Arc::new(camera), CameraRequest::new(0));
        opened.recv().expect("open result").expect("opened");

        let started = Instant::now();
        session.stop();
        assert!(started.elapsed() < Duration::from_millis(1500));
        assert_eq!(session.status(), SessionStatus::Stopped);

        // The detached worker still releases the device once the read returns.
        let deadline = Instant::now() + Duration::from_secs(5);
        while stops.load(Ordering::SeqCst) == 0 {
            assert!(Instant::now() < deadline, "stream never released");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn open_failure_is_reported() {
        let camera = FakeCamera {
            fail_with: Some(CameraError::PermissionDenied("denied".into())),
            ..FakeCamera::streaming()
        };
        let (session, opened) = CaptureSession::start(Arc::new(camera), CameraRequest::new(0));

        assert!(matches!(
            opened.recv().expect("open result"),
            Err(CameraError::PermissionDenied(_))
        ));
        assert!(!session.is_active());
    }

    #[test]
    fn snapshot_before_first_frame_is_refused() {
        let camera = FakeCamera {
            frames: false,
            ..FakeCamera::streaming()
        };
        let (mut session, opened) = CaptureSession::start(Arc::new(camera), CameraRequest::new(0));
        opened.recv().expect("open result").expect("opened");

        assert_eq!(session.snapshot(), Err(CameraError::NoFrame));
        assert!(session.is_active());
        session.stop();
    }

    #[test]
    fn snapshot_is_png_data_url_of_canvas_size() {
        let (mut session, opened) =
            CaptureSession::start(Arc::new(FakeCamera::streaming()), CameraRequest::new(0));
        opened.recv().expect("open result").expect("opened");
        wait_for_frame(&session);

        let data_url = session.snapshot().expect("snapshot");
        session.stop();

        let payload = data_url
            .strip_prefix("data:image/png;base64,")
            .expect("png data url");
        let png = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .expect("valid base64");
        let decoded = image_rs::load_from_memory(&png).expect("valid png");
        assert_eq!(decoded.width(), SNAPSHOT_WIDTH);
        assert_eq!(decoded.height(), SNAPSHOT_HEIGHT);
    }

    #[test]
    fn request_uses_configured_resolution() {
        let request = CameraRequest::new(2);
        assert_eq!(request.index, 2);
        assert_eq!((request.width, request.height), (500, 500));
    }
}
