// SPDX-License-Identifier: MPL-2.0
//! Playback state of the generated video.
//!
//! The player mirrors `<video controls>`: it opens paused on the first frame,
//! and offers play, pause and replay once the end is reached.

use super::subscription::DecoderCommandSender;
use super::DecoderCommand;
use crate::error::VideoError;
use iced::widget::image;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    /// Waiting for the decoder to start.
    Loading,
    Playing { position_secs: f64 },
    Paused { position_secs: f64 },
    /// Last frame shown. Play restarts from the beginning.
    Ended,
    Error(VideoError),
}

impl PlaybackState {
    pub fn position(&self) -> Option<f64> {
        match self {
            Self::Playing { position_secs } | Self::Paused { position_secs } => {
                Some(*position_secs)
            }
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    pub fn error(&self) -> Option<&VideoError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Drives one playback session of a generated video.
#[derive(Debug)]
pub struct VideoPlayer {
    path: PathBuf,
    session_id: u64,
    state: PlaybackState,
    command_sender: Option<DecoderCommandSender>,
    frame: Option<image::Handle>,
}

impl VideoPlayer {
    /// `session_id` keys the playback subscription; use a fresh one per video.
    pub fn new(path: impl Into<PathBuf>, session_id: u64) -> Self {
        Self {
            path: path.into(),
            session_id,
            state: PlaybackState::Loading,
            command_sender: None,
            frame: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Latest decoded frame, if any.
    pub fn frame(&self) -> Option<&image::Handle> {
        self.frame.as_ref()
    }

    /// Stores the decoder handle and requests the first frame.
    pub fn set_command_sender(&mut self, sender: DecoderCommandSender) {
        self.command_sender = Some(sender);
        self.state = PlaybackState::Paused { position_secs: 0.0 };
        self.send(DecoderCommand::Seek { target_secs: 0.0 });
    }

    pub fn on_frame(&mut self, rgba_data: Arc<Vec<u8>>, width: u32, height: u32, pts_secs: f64) {
        let rgba = Arc::try_unwrap(rgba_data).unwrap_or_else(|shared| (*shared).clone());
        self.frame = Some(image::Handle::from_rgba(width, height, rgba));

        match &mut self.state {
            PlaybackState::Playing { position_secs } | PlaybackState::Paused { position_secs } => {
                *position_secs = pts_secs;
            }
            _ => {}
        }
    }

    pub fn on_end_of_stream(&mut self) {
        if !matches!(self.state, PlaybackState::Error(_)) {
            self.state = PlaybackState::Ended;
        }
    }

    pub fn set_error(&mut self, error: VideoError) {
        tracing::warn!(path = %self.path.display(), error = %error, "playback failed");
        self.state = PlaybackState::Error(error);
    }

    /// Starts or resumes playback. After the end, starts over.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Paused { position_secs } => {
                self.state = PlaybackState::Playing { position_secs };
                self.send(DecoderCommand::Play);
            }
            PlaybackState::Ended => self.replay(),
            _ => {}
        }
    }

    pub fn pause(&mut self) {
        if let PlaybackState::Playing { position_secs } = self.state {
            self.state = PlaybackState::Paused { position_secs };
            self.send(DecoderCommand::Pause);
        }
    }

    pub fn toggle_playback(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Rewinds to the start and plays.
    pub fn replay(&mut self) {
        if self.command_sender.is_none() || matches!(self.state, PlaybackState::Error(_)) {
            return;
        }
        self.state = PlaybackState::Playing { position_secs: 0.0 };
        self.send(DecoderCommand::Seek { target_secs: 0.0 });
        self.send(DecoderCommand::Play);
    }

    fn send(&self, command: DecoderCommand) {
        if let Some(sender) = &self.command_sender {
            if let Err(err) = sender.send(command) {
                tracing::debug!(error = %err, "dropping playback command");
            }
        }
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.send(DecoderCommand::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn started() -> (VideoPlayer, mpsc::UnboundedReceiver<DecoderCommand>) {
        let (sender, rx) = DecoderCommandSender::channel();
        let mut player = VideoPlayer::new("/tmp/facemotion-1.mp4", 1);
        player.set_command_sender(sender);
        (player, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<DecoderCommand>) -> Vec<DecoderCommand> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn new_player_waits_for_decoder() {
        let player = VideoPlayer::new("clip.mp4", 7);
        assert_eq!(player.state(), &PlaybackState::Loading);
        assert!(player.frame().is_none());
        assert_eq!(player.session_id(), 7);
    }

    #[test]
    fn start_opens_paused_on_first_frame() {
        let (player, mut rx) = started();
        assert_eq!(player.state(), &PlaybackState::Paused { position_secs: 0.0 });
        assert_eq!(drain(&mut rx), vec![DecoderCommand::Seek { target_secs: 0.0 }]);
    }

    #[test]
    fn play_and_pause_forward_commands() {
        let (mut player, mut rx) = started();
        drain(&mut rx);

        player.toggle_playback();
        assert!(player.state().is_playing());
        player.on_frame(Arc::new(vec![0; 4]), 1, 1, 1.25);
        player.toggle_playback();

        assert_eq!(player.state(), &PlaybackState::Paused { position_secs: 1.25 });
        assert_eq!(drain(&mut rx), vec![DecoderCommand::Play, DecoderCommand::Pause]);
        assert!(player.frame().is_some());
    }

    #[test]
    fn play_after_end_replays_from_start() {
        let (mut player, mut rx) = started();
        player.play();
        player.on_end_of_stream();
        drain(&mut rx);

        player.play();
        assert_eq!(player.state(), &PlaybackState::Playing { position_secs: 0.0 });
        assert_eq!(
            drain(&mut rx),
            vec![DecoderCommand::Seek { target_secs: 0.0 }, DecoderCommand::Play]
        );
    }

    #[test]
    fn error_is_sticky() {
        let (mut player, mut rx) = started();
        drain(&mut rx);
        player.set_error(VideoError::UnsupportedFormat);
        player.on_end_of_stream();
        player.replay();

        assert_eq!(player.state().error(), Some(&VideoError::UnsupportedFormat));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn dropping_player_stops_decoder() {
        let (player, mut rx) = started();
        drain(&mut rx);
        drop(player);
        assert_eq!(drain(&mut rx), vec![DecoderCommand::Stop]);
    }
}
