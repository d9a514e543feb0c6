// SPDX-License-Identifier: MPL-2.0
//! Native webcam backend (V4L2, AVFoundation, Media Foundation) via `nokhwa`.

use super::capture::{CameraError, CameraProvider, CameraRequest, VideoStream};
use image_rs::{DynamicImage, RgbImage, RgbaImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Camera, NokhwaError};

#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaCamera;

impl CameraProvider for NokhwaCamera {
    fn open(&self, request: CameraRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(request.width, request.height),
                FrameFormat::MJPEG,
                request.fps,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(request.index), format)
            .map_err(|err| classify(&err, request.index))?;
        camera
            .open_stream()
            .map_err(|err| classify(&err, request.index))?;

        let resolution = camera.resolution();
        tracing::debug!(
            width = resolution.width(),
            height = resolution.height(),
            "camera negotiated resolution"
        );

        Ok(Box::new(NokhwaStream {
            camera,
            stopped: false,
        }))
    }
}

struct NokhwaStream {
    camera: Camera,
    stopped: bool,
}

impl VideoStream for NokhwaStream {
    fn next_frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        if self.stopped {
            return Ok(None);
        }

        let buffer = self
            .camera
            .frame()
            .map_err(|err| CameraError::Stream(err.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|err| CameraError::Stream(err.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let rgb = RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CameraError::Stream("frame buffer size mismatch".into()))?;

        Ok(Some(DynamicImage::ImageRgb8(rgb).to_rgba8()))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(err) = self.camera.stop_stream() {
            tracing::warn!(error = %err, "failed to stop camera stream");
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Maps backend errors onto the user-facing categories.
fn classify(err: &NokhwaError, index: u32) -> CameraError {
    let message = err.to_string();
    let lower = message.to_lowercase();

    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        CameraError::PermissionDenied(message)
    } else if lower.contains("no such device")
        || lower.contains("not found")
        || lower.contains("out of range")
        || lower.contains("could not find")
    {
        CameraError::NotFound(index)
    } else {
        CameraError::Stream(message)
    }
}
