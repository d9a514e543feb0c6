// SPDX-License-Identifier: MPL-2.0
//! Async video frame decoder using FFmpeg.
//!
//! Decoding runs on a blocking Tokio thread since FFmpeg types are not `Send`.
//! Frames are paced against their presentation timestamps and delivered
//! through a bounded channel.

use crate::error::{Error, Result, VideoError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// FFmpeg seeks in `AV_TIME_BASE` units.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Idle wait between command polls while paused.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// A decoded video frame ready for display.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// RGBA pixel data (width × height × 4 bytes).
    pub rgba_data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    /// Presentation timestamp in seconds.
    pub pts_secs: f64,
}

impl DecodedFrame {
    pub fn size_bytes(&self) -> usize {
        self.rgba_data.len()
    }
}

/// Commands sent to the decoder task.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCommand {
    /// Start or resume decoding at the current position.
    Play,

    /// Stop sending frames, keep the position.
    Pause,

    /// Jump to a timestamp. While paused, one frame is decoded to show it.
    Seek { target_secs: f64 },

    /// Stop decoding and release the input.
    Stop,
}

/// Events sent from the decoder to the UI.
#[derive(Debug, Clone)]
pub enum DecoderEvent {
    FrameReady(DecodedFrame),
    Buffering,
    EndOfStream,
    Error(VideoError),
}

/// Handle on a decoder running in a blocking Tokio thread.
pub struct AsyncDecoder {
    command_tx: mpsc::UnboundedSender<DecoderCommand>,
    /// Bounded so frames never pile up faster than the UI draws them.
    event_rx: mpsc::Receiver<DecoderEvent>,
}

impl AsyncDecoder {
    /// Spawns the decoder for `video_path`. The file is opened lazily by the
    /// decoder thread; open failures arrive as [`DecoderEvent::Error`].
    pub fn new<P: AsRef<Path>>(video_path: P) -> Result<Self> {
        let path = video_path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(Error::Video(VideoError::IoError(format!(
                "video file not found: {}",
                path.display()
            ))));
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(2);

        tokio::task::spawn_blocking(move || {
            if let Err(err) = Self::decoder_loop_blocking(&path, command_rx, &event_tx) {
                tracing::warn!(path = %path.display(), error = %err, "video decoder failed");
                let _ = event_tx.blocking_send(DecoderEvent::Error(err));
            }
        });

        Ok(Self {
            command_tx,
            event_rx,
        })
    }

    pub fn send_command(&self, command: DecoderCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::Video(VideoError::Other("decoder task is not running".into())))
    }

    /// Returns `None` once the decoder thread has exited.
    pub async fn recv_event(&mut self) -> Option<DecoderEvent> {
        self.event_rx.recv().await
    }

    fn decoder_loop_blocking(
        video_path: &Path,
        mut command_rx: mpsc::UnboundedReceiver<DecoderCommand>,
        event_tx: &mpsc::Sender<DecoderEvent>,
    ) -> std::result::Result<(), VideoError> {
        super::init_ffmpeg().map_err(|err| VideoError::Other(err.to_string()))?;

        let mut ictx = ffmpeg_next::format::input(video_path)
            .map_err(|e| VideoError::from_message(&e.to_string()))?;

        let input = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(VideoError::NoVideoStream)?;
        let video_stream_index = input.index();

        let context_decoder =
            ffmpeg_next::codec::context::Context::from_parameters(input.parameters())
                .map_err(|e| VideoError::from_message(&format!("codec context: {e}")))?;
        let mut decoder = context_decoder
            .decoder()
            .video()
            .map_err(|e| VideoError::from_message(&format!("video decoder: {e}")))?;

        let width = decoder.width();
        let height = decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| VideoError::DecodingFailed(format!("scaler: {e}")))?;

        let time_base = input.time_base();
        let time_base_f64 = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

        tracing::debug!(path = %video_path.display(), width, height, "video decoder opened");

        let mut is_playing = false;
        let mut playback_start_time: Option<Instant> = None;
        let mut first_pts: Option<f64> = None;
        let mut current_pts_secs: f64 = 0.0;
        let mut decode_single_frame = false;
        // Set once the input is exhausted and the decoder got end-of-stream.
        let mut draining = false;

        loop {
            match command_rx.try_recv() {
                Ok(DecoderCommand::Play) => {
                    // Resuming from a pause: reposition on the last shown frame.
                    if !is_playing && current_pts_secs > 0.0 {
                        let timestamp = (current_pts_secs * AV_TIME_BASE) as i64;
                        if let Err(e) = ictx.seek(timestamp, ..timestamp) {
                            let _ = event_tx.blocking_send(DecoderEvent::Error(
                                VideoError::DecodingFailed(format!("resume seek: {e}")),
                            ));
                        } else {
                            decoder.flush();
                            draining = false;
                        }
                    }
                    is_playing = true;
                    playback_start_time = Some(Instant::now());
                    first_pts = None;
                    let _ = event_tx.blocking_send(DecoderEvent::Buffering);
                }
                Ok(DecoderCommand::Pause) => {
                    is_playing = false;
                    playback_start_time = None;
                    first_pts = None;
                }
                Ok(DecoderCommand::Seek { target_secs }) => {
                    let timestamp = (target_secs * AV_TIME_BASE) as i64;
                    if let Err(e) = ictx.seek(timestamp, ..timestamp) {
                        let _ = event_tx.blocking_send(DecoderEvent::Error(
                            VideoError::DecodingFailed(format!("seek: {e}")),
                        ));
                    } else {
                        decoder.flush();
                        draining = false;
                        current_pts_secs = target_secs;
                        playback_start_time = Some(Instant::now());
                        first_pts = None;
                        if !is_playing {
                            decode_single_frame = true;
                        }
                    }
                }
                Ok(DecoderCommand::Stop) | Err(mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
            }

            if !is_playing && !decode_single_frame {
                std::thread::sleep(IDLE_POLL);
                continue;
            }

            let decoded_frame = {
                let mut pipeline = FfmpegPipeline {
                    input: &mut ictx,
                    decoder: &mut decoder,
                    stream_index: video_stream_index,
                };
                pull_frame(&mut pipeline, &mut draining)
            };

            let Some(decoded_frame) = decoded_frame else {
                let _ = event_tx.blocking_send(DecoderEvent::EndOfStream);
                is_playing = false;
                playback_start_time = None;
                first_pts = None;
                decode_single_frame = false;
                continue;
            };

            let mut rgba_frame = ffmpeg_next::frame::Video::empty();
            if let Err(e) = scaler.run(&decoded_frame, &mut rgba_frame) {
                let _ = event_tx.blocking_send(DecoderEvent::Error(VideoError::DecodingFailed(
                    format!("scaling: {e}"),
                )));
                continue;
            }

            let pts_secs = decoded_frame
                .timestamp()
                .map_or(0.0, |pts| pts as f64 * time_base_f64);

            if let Some(start_time) = playback_start_time {
                let first = *first_pts.get_or_insert(pts_secs);
                let delay = (pts_secs - first).max(0.0);
                let target_time = start_time + Duration::from_secs_f64(delay);
                let now = Instant::now();
                if target_time > now {
                    std::thread::sleep(target_time - now);
                }
            }

            current_pts_secs = pts_secs;

            let frame = DecodedFrame {
                rgba_data: Arc::new(extract_rgba_data(&rgba_frame)),
                width,
                height,
                pts_secs,
            };

            if event_tx
                .blocking_send(DecoderEvent::FrameReady(frame))
                .is_err()
            {
                return Ok(());
            }

            decode_single_frame = false;
        }

        Ok(())
    }
}

/// Demux and decode steps, separated from FFmpeg's types.
trait PacketDecoder {
    type Frame;

    /// A decoded frame, if the decoder has one ready.
    fn receive(&mut self) -> Option<Self::Frame>;

    /// Sends the next packet. Returns `false` once the input is exhausted.
    fn feed(&mut self) -> bool;

    /// Signals end of input so the decoder releases its buffered frames.
    fn send_eof(&mut self);
}

/// Next frame in decode order, including the frames still buffered in the
/// decoder when the input ends. `None` once the stream is fully drained.
fn pull_frame<D: PacketDecoder>(decoder: &mut D, draining: &mut bool) -> Option<D::Frame> {
    loop {
        if let Some(frame) = decoder.receive() {
            return Some(frame);
        }
        if *draining {
            return None;
        }
        if !decoder.feed() {
            decoder.send_eof();
            *draining = true;
        }
    }
}

struct FfmpegPipeline<'a> {
    input: &'a mut ffmpeg_next::format::context::Input,
    decoder: &'a mut ffmpeg_next::decoder::Video,
    stream_index: usize,
}

impl PacketDecoder for FfmpegPipeline<'_> {
    type Frame = ffmpeg_next::frame::Video;

    fn receive(&mut self) -> Option<Self::Frame> {
        let mut frame = ffmpeg_next::frame::Video::empty();
        self.decoder.receive_frame(&mut frame).ok().map(|()| frame)
    }

    fn feed(&mut self) -> bool {
        let stream_index = self.stream_index;
        let Some((_, packet)) = self
            .input
            .packets()
            .find(|(stream, _)| stream.index() == stream_index)
        else {
            return false;
        };

        if let Err(e) = self.decoder.send_packet(&packet) {
            tracing::debug!(error = %e, "skipping undecodable packet");
        }
        true
    }

    fn send_eof(&mut self) {
        if let Err(e) = self.decoder.send_eof() {
            tracing::debug!(error = %e, "decoder refused end of input");
        }
    }
}

/// Copies the first plane into a tightly packed buffer, dropping row padding.
fn extract_rgba_data(frame: &ffmpeg_next::frame::Video) -> Vec<u8> {
    pack_rows(frame.data(0), frame.stride(0), frame.width(), frame.height())
}

fn pack_rows(data: &[u8], stride: usize, width: u32, height: u32) -> Vec<u8> {
    let row_len = width as usize * 4;
    let mut rgba_bytes = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let row_start = y * stride;
        rgba_bytes.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    rgba_bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decoder_fails_for_nonexistent_file() {
        let result = AsyncDecoder::new("/nonexistent/facemotion.mp4");
        assert!(matches!(
            result,
            Err(Error::Video(VideoError::IoError(_)))
        ));
    }

    #[tokio::test]
    async fn garbage_payload_reports_an_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let video_path = temp_dir.path().join("clip.bin");
        std::fs::write(&video_path, b"{\"error\":\"html page\"}").expect("write");

        let mut decoder = AsyncDecoder::new(&video_path).expect("decoder");
        let event = tokio::time::timeout(Duration::from_secs(5), decoder.recv_event())
            .await
            .expect("event before timeout");

        assert!(matches!(event, Some(DecoderEvent::Error(_))), "got {event:?}");
    }

    /// Decoder with a fixed reorder delay: each frame comes out `delay`
    /// packets after it went in, the rest only after end of input.
    struct DelayedDecoder {
        packets: std::vec::IntoIter<u32>,
        buffered: std::collections::VecDeque<u32>,
        delay: usize,
        eof: bool,
    }

    impl DelayedDecoder {
        fn new(frames: u32, delay: usize) -> Self {
            Self {
                packets: (0..frames).collect::<Vec<_>>().into_iter(),
                buffered: std::collections::VecDeque::new(),
                delay,
                eof: false,
            }
        }
    }

    impl PacketDecoder for DelayedDecoder {
        type Frame = u32;

        fn receive(&mut self) -> Option<u32> {
            if self.eof || self.buffered.len() > self.delay {
                self.buffered.pop_front()
            } else {
                None
            }
        }

        fn feed(&mut self) -> bool {
            match self.packets.next() {
                Some(packet) => {
                    self.buffered.push_back(packet);
                    true
                }
                None => false,
            }
        }

        fn send_eof(&mut self) {
            self.eof = true;
        }
    }

    #[test]
    fn pull_frame_drains_buffered_frames_at_end_of_input() {
        let mut decoder = DelayedDecoder::new(5, 2);
        let mut draining = false;

        let mut frames = Vec::new();
        while let Some(frame) = pull_frame(&mut decoder, &mut draining) {
            frames.push(frame);
        }

        assert_eq!(frames, vec![0, 1, 2, 3, 4]);
        assert!(draining);
        assert_eq!(pull_frame(&mut decoder, &mut draining), None);
    }

    #[test]
    fn pull_frame_on_empty_input_ends_immediately() {
        let mut decoder = DelayedDecoder::new(0, 2);
        let mut draining = false;

        assert_eq!(pull_frame(&mut decoder, &mut draining), None);
        assert!(decoder.eof);
    }

    #[test]
    fn pack_rows_drops_stride_padding() {
        // 1×2 image, stride 8: 4 pixel bytes + 4 padding bytes per row.
        let data = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
        assert_eq!(pack_rows(&data, 8, 1, 2), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn decoded_frame_reports_size() {
        let frame = DecodedFrame {
            rgba_data: Arc::new(vec![0u8; 512 * 512 * 4]),
            width: 512,
            height: 512,
            pts_secs: 0.0,
        };
        assert_eq!(frame.size_bytes(), 512 * 512 * 4);
    }
}
