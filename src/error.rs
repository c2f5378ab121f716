//! Error type shared by the player, library and runtime.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::TrackId;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("no audio output device: {0}")]
    OutputDevice(String),

    #[error("track {0} not found")]
    TrackNotFound(TrackId),

    #[error("no queue entry at index {0}")]
    QueueIndex(usize),

    #[error("nothing loaded")]
    NothingLoaded,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("play store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("player thread is gone")]
    Disconnected,
}

impl From<toml::de::Error> for PlayerError {
    fn from(e: toml::de::Error) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<toml::ser::Error> for PlayerError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
