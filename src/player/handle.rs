use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::warn;

use crate::backend::Backend;
use crate::config::Settings;
use crate::error::{PlayerError, Result};
use crate::library::Track;
use crate::notify::Notifier;

use super::media::MediaPlayer;
use super::thread::{ThreadParts, spawn_player_thread};
use super::types::{PlaybackHandle, PlaybackInfo, PlayerCmd};

/// Owner-side handle of the player thread.
pub struct Player {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the player thread with `tracks` as the initial queue.
    pub fn spawn<M, F>(
        open_media: F,
        tracks: Vec<Track>,
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        settings: &Settings,
    ) -> Result<Self>
    where
        M: MediaPlayer + 'static,
        F: FnOnce() -> Result<M> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_player_thread(
            open_media,
            ThreadParts {
                backend,
                notifier,
                settings: settings.clone(),
                playback: playback.clone(),
            },
            rx,
        )?;

        let player = Self {
            tx,
            playback,
            join: Mutex::new(Some(join)),
        };
        player.send(PlayerCmd::SetQueue { tracks, start: 0 })?;
        Ok(player)
    }

    /// Latest published playback snapshot.
    pub fn snapshot(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<()> {
        self.tx.send(cmd).map_err(|_| PlayerError::Disconnected)
    }

    /// Stop playback and wait for the thread to exit.
    pub fn shutdown(&self) {
        let _ = self.send(PlayerCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                if h.join().is_err() {
                    warn!("player thread panicked");
                }
            }
        }
    }
}
