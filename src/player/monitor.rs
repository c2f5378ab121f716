//! Background listen monitor: one thread per loaded track that samples the
//! playback position, feeds a `ListenTracker` and reports the play once.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::ListenSettings;
use crate::library::TrackId;

use super::listen::{ListenEvent, ListenSample, ListenTracker};
use super::types::{PlaybackHandle, SessionId};

/// Something the monitor can read the playback position from.
pub trait PositionSource: Send + 'static {
    /// Latest sample and the session it belongs to.
    fn sample(&self) -> Option<(SessionId, ListenSample)>;
}

impl PositionSource for PlaybackHandle {
    fn sample(&self) -> Option<(SessionId, ListenSample)> {
        let info = self.lock().ok()?;
        let session = info.session?;
        Some((
            session,
            ListenSample {
                at: info.sampled_at,
                position: info.position,
                playing: info.playing(),
            },
        ))
    }
}

/// Sent back to the player once a play has been reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayCounted {
    pub track: TrackId,
    pub session: SessionId,
    /// Play count after the report.
    pub plays: u64,
}

/// Handle to a running monitor. Dropping it stops the thread.
pub struct ListenMonitor {
    session: SessionId,
    stop: Option<Sender<()>>,
}

impl ListenMonitor {
    pub fn spawn<S: PositionSource>(
        track: TrackId,
        track_duration: Option<Duration>,
        session: SessionId,
        source: S,
        backend: Arc<dyn Backend>,
        counted: Sender<PlayCounted>,
        settings: &ListenSettings,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tick = settings.tick();
        let attempts = settings.report_attempts.max(1);
        let backoff = settings.retry_backoff();
        let mut tracker =
            ListenTracker::new(settings.threshold(), settings.tolerance(), track_duration);

        thread::spawn(move || {
            debug!(%track, %session, threshold = ?tracker.threshold(), "listen monitor started");
            // Baseline from the sample published just before the spawn.
            if let Some((current, sample)) = source.sample() {
                if current == session {
                    tracker.observe(sample);
                }
            }
            loop {
                match stop_rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        debug!(%track, %session, listened = ?tracker.accumulated(), "listen monitor stopped");
                        return;
                    }
                }

                let Some((current, sample)) = source.sample() else {
                    continue;
                };
                // The player may already have moved on before cancelling us.
                if current != session {
                    continue;
                }

                if tracker.observe(sample) == ListenEvent::ThresholdReached {
                    debug!(%track, %session, listened = ?tracker.accumulated(), "listen threshold reached");
                    if let Some(plays) =
                        report_play(backend.as_ref(), &track, session, attempts, backoff)
                    {
                        let _ = counted.send(PlayCounted {
                            track,
                            session,
                            plays,
                        });
                    }
                    return;
                }
            }
        });

        Self {
            session,
            stop: Some(stop_tx),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn cancel(mut self) {
        self.stop.take();
    }
}

impl Drop for ListenMonitor {
    fn drop(&mut self) {
        // Closing the channel wakes the thread with `Disconnected`.
        self.stop.take();
    }
}

fn report_play(
    backend: &dyn Backend,
    track: &TrackId,
    session: SessionId,
    attempts: u32,
    backoff: Duration,
) -> Option<u64> {
    for attempt in 1..=attempts {
        match backend.report_play(track, session) {
            Ok(plays) => {
                info!(%track, %session, plays, "play reported");
                return Some(plays);
            }
            Err(e) if attempt < attempts => {
                warn!(%track, %session, attempt, error = %e, "play report failed, retrying");
                thread::sleep(backoff);
            }
            Err(e) => {
                warn!(%track, %session, attempt, error = %e, "play report failed, giving up");
            }
        }
    }
    None
}
