use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::player::RepeatMode;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub listen: ListenSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Initial repeat mode.
    pub repeat: RepeatMode,
    /// "Previous" restarts the current track instead of going back once it has
    /// played for longer than this (milliseconds). 0 disables the restart.
    pub restart_previous_after_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatMode::Off,
            restart_previous_after_ms: 3_000,
        }
    }
}

impl PlaybackSettings {
    pub fn restart_previous_after(&self) -> Duration {
        Duration::from_millis(self.restart_previous_after_ms)
    }
}

/// Tuning for the listen-time play counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    /// Seconds of real listening before a play is counted.
    pub threshold_secs: u64,
    /// How far the position delta may drift from wall-clock time and still
    /// count as playback rather than a seek (milliseconds).
    pub tolerance_ms: u64,
    /// Sampling interval of the listen monitor (milliseconds).
    pub tick_ms: u64,
    /// How many times a failed play report is attempted in total.
    pub report_attempts: u32,
    /// Pause between report attempts (milliseconds).
    pub retry_backoff_ms: u64,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            threshold_secs: 30,
            tolerance_ms: 1_500,
            tick_ms: 1_000,
            report_attempts: 3,
            retry_backoff_ms: 2_000,
        }
    }
}

impl ListenSettings {
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(self.threshold_secs)
    }

    pub fn tolerance(&self) -> Duration {
        Duration::from_millis(self.tolerance_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    Title,
    Artist,
    Album,
    Filename,
    Path,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,

    /// Which fields to use to build `Track.display` and its ordering.
    ///
    /// Example: ["artist", "title"] -> "Artist - Title"
    pub display_fields: Vec<TrackDisplayField>,
    /// Separator used to join `display_fields`.
    pub display_separator: String,

    /// Where play counts and favorites are kept. Defaults to
    /// `$XDG_DATA_HOME/cadenza/plays.toml`.
    pub store_path: Option<PathBuf>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            display_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            display_separator: " - ".to_string(),
            store_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Write daily-rotated log files here instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "cadenza=info,warn".to_string(),
            directory: None,
        }
    }
}
