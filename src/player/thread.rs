use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::backend::Backend;
use crate::config::Settings;
use crate::error::{PlayerError, Result};
use crate::notify::Notifier;

use super::controller::PlaybackController;
use super::media::MediaPlayer;
use super::types::{PlaybackHandle, PlayerCmd};

/// How often the thread wakes up without commands to check for track
/// completion and refresh the published position.
const POLL: Duration = Duration::from_millis(200);

/// Everything the player thread needs besides the media layer.
pub(super) struct ThreadParts {
    pub backend: Arc<dyn Backend>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Settings,
    pub playback: PlaybackHandle,
}

/// Start the player thread. The media layer is built on the thread itself
/// (audio output streams are not `Send`); an error from `open_media` is
/// returned here and no thread is left running.
pub(super) fn spawn_player_thread<M, F>(
    open_media: F,
    parts: ThreadParts,
    rx: Receiver<PlayerCmd>,
) -> Result<JoinHandle<()>>
where
    M: MediaPlayer + 'static,
    F: FnOnce() -> Result<M> + Send + 'static,
{
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);

    let join = thread::Builder::new()
        .name("cadenza-player".to_string())
        .spawn(move || {
            let media = match open_media() {
                Ok(m) => {
                    let _ = ready_tx.send(Ok(()));
                    m
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let ThreadParts {
                backend,
                notifier,
                settings,
                playback,
            } = parts;
            let mut controller =
                PlaybackController::new(media, backend, notifier, &settings, playback);
            run(&mut controller, &rx);
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(join),
        Ok(Err(e)) => {
            let _ = join.join();
            Err(e)
        }
        Err(_) => {
            let _ = join.join();
            Err(PlayerError::Disconnected)
        }
    }
}

fn run<M: MediaPlayer>(controller: &mut PlaybackController<M>, rx: &Receiver<PlayerCmd>) {
    debug!("player thread started");
    let mut last_tick = Instant::now();
    loop {
        match rx.recv_timeout(POLL) {
            Ok(PlayerCmd::Quit) => {
                controller.handle(PlayerCmd::Quit);
                break;
            }
            Ok(cmd) => {
                controller.handle(cmd);
                // A steady stream of commands must not starve completion checks.
                if last_tick.elapsed() >= POLL {
                    controller.tick();
                    last_tick = Instant::now();
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                controller.tick();
                last_tick = Instant::now();
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("player command channel closed");
                controller.stop();
                break;
            }
        }
    }
    debug!("player thread finished");
}
