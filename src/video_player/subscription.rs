// SPDX-License-Identifier: MPL-2.0
//! Iced subscription connecting the decoder to the update loop.

use super::{AsyncDecoder, DecoderCommand, DecoderEvent};
use crate::error::{Error, VideoError};
use iced::futures::SinkExt;
use iced::stream;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Subscription ID for video playback.
/// Each playback session gets a unique ID so a new video restarts the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoPlaybackId(u64);

/// Cloneable handle the player uses to drive the decoder.
#[derive(Clone)]
pub struct DecoderCommandSender {
    video_tx: mpsc::UnboundedSender<DecoderCommand>,
}

impl DecoderCommandSender {
    pub fn send(&self, command: DecoderCommand) -> Result<(), String> {
        self.video_tx
            .send(command)
            .map_err(|_| "video decoder not running".to_string())
    }

    #[cfg(test)]
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<DecoderCommand>) {
        let (video_tx, rx) = mpsc::unbounded_channel();
        (Self { video_tx }, rx)
    }
}

impl std::fmt::Debug for DecoderCommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderCommandSender")
            .field("closed", &self.video_tx.is_closed())
            .finish()
    }
}

/// Messages emitted by the video playback subscription.
#[derive(Debug, Clone)]
pub enum PlaybackMessage {
    /// Decoder spawned; carries the command handle.
    Started(DecoderCommandSender),

    FrameReady {
        rgba_data: Arc<Vec<u8>>,
        width: u32,
        height: u32,
        pts_secs: f64,
    },

    Buffering,

    EndOfStream,

    Error(VideoError),
}

impl From<DecoderEvent> for PlaybackMessage {
    fn from(event: DecoderEvent) -> Self {
        match event {
            DecoderEvent::FrameReady(frame) => PlaybackMessage::FrameReady {
                rgba_data: frame.rgba_data,
                width: frame.width,
                height: frame.height,
                pts_secs: frame.pts_secs,
            },
            DecoderEvent::Buffering => PlaybackMessage::Buffering,
            DecoderEvent::EndOfStream => PlaybackMessage::EndOfStream,
            DecoderEvent::Error(err) => PlaybackMessage::Error(err),
        }
    }
}

enum State {
    Idle,
    Decoding {
        decoder: AsyncDecoder,
        external_cmd_rx: mpsc::UnboundedReceiver<DecoderCommand>,
    },
}

/// Creates a playback subscription for one generated video.
///
/// The first message is `Started` with the command sender. Frames only flow
/// after the player asks for them.
pub fn video_playback(video_path: PathBuf, session_id: u64) -> iced::Subscription<PlaybackMessage> {
    iced::Subscription::run_with_id(
        VideoPlaybackId(session_id),
        stream::channel(100, move |mut output| async move {
            let mut state = State::Idle;

            loop {
                match &mut state {
                    State::Idle => {
                        let (external_cmd_tx, external_cmd_rx) = mpsc::unbounded_channel();

                        let decoder = match AsyncDecoder::new(&video_path) {
                            Ok(decoder) => decoder,
                            Err(err) => {
                                let err = match err {
                                    Error::Video(video) => video,
                                    other => VideoError::Other(other.to_string()),
                                };
                                let _ = output.send(PlaybackMessage::Error(err)).await;
                                break;
                            }
                        };

                        let sender = DecoderCommandSender {
                            video_tx: external_cmd_tx,
                        };
                        let _ = output.send(PlaybackMessage::Started(sender)).await;

                        state = State::Decoding {
                            decoder,
                            external_cmd_rx,
                        };
                    }

                    State::Decoding {
                        decoder,
                        external_cmd_rx,
                    } => {
                        tokio::select! {
                            cmd = external_cmd_rx.recv() => {
                                let Some(command) = cmd else {
                                    // Player dropped its sender.
                                    let _ = decoder.send_command(DecoderCommand::Stop);
                                    break;
                                };
                                let stopping = command == DecoderCommand::Stop;
                                if let Err(err) = decoder.send_command(command) {
                                    let message = match err {
                                        Error::Video(video) => video,
                                        other => VideoError::Other(other.to_string()),
                                    };
                                    let _ = output.send(PlaybackMessage::Error(message)).await;
                                }
                                if stopping {
                                    break;
                                }
                            }

                            event = decoder.recv_event() => {
                                match event {
                                    Some(event) => {
                                        let _ = output.send(PlaybackMessage::from(event)).await;
                                    }
                                    None => break,
                                }
                            }
                        }
                    }
                }
            }

            // Keep the subscription alive but idle.
            std::future::pending::<()>().await;
        }),
    )
}
