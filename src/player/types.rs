//! Player-related small types and handles.
//!
//! Repeat mode, playback state, the command set of the player thread and the
//! playback snapshot shared with the runtime and the listen monitor.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::library::{Track, TrackId};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    #[serde(alias = "none", alias = "no-repeat", alias = "no_loop")]
    Off,
    /// Wrap around to the start of the queue.
    #[serde(alias = "repeat-all", alias = "loop-all", alias = "loop_all")]
    All,
    /// Repeat the current track when it ends.
    #[serde(alias = "repeat-one", alias = "loop-one", alias = "loop_one")]
    One,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Identifies one load of one track. A replay of the same track is a new
/// session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Replace the queue and select `start` (nothing starts playing).
    SetQueue { tracks: Vec<Track>, start: usize },
    /// Play the queue entry at the given index.
    PlayIndex(usize),
    /// Fetch a track from the backend and play it.
    PlayId(TrackId),
    Next,
    Prev,
    Pause,
    Resume,
    TogglePause,
    Stop,
    SeekTo(Duration),
    /// Seek relative to the current position, in milliseconds.
    SeekBy(i64),
    ToggleShuffle,
    SetRepeat(RepeatMode),
    CycleRepeat,
    ToggleFavorite,
    Quit,
}

/// Playback snapshot shared with the runtime and the listen monitor.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Queue index of the loaded track.
    pub index: Option<usize>,
    pub track: Option<Track>,
    pub state: PlaybackState,
    /// Position in the loaded track, as last read from the media layer.
    pub position: Duration,
    /// When `position` was read.
    pub sampled_at: Instant,
    pub session: Option<SessionId>,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub queue_len: usize,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            index: None,
            track: None,
            state: PlaybackState::Stopped,
            position: Duration::ZERO,
            sampled_at: Instant::now(),
            session: None,
            shuffle: false,
            repeat: RepeatMode::Off,
            queue_len: 0,
        }
    }
}

impl PlaybackInfo {
    pub fn playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
