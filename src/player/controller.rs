//! The playback state machine.
//!
//! `PlaybackController` owns the queue and the media layer and is only ever
//! driven from the player thread. Every loaded track gets a new session and a
//! fresh listen monitor; the previous monitor is dropped on the way.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::{ListenSettings, Settings};
use crate::error::{PlayerError, Result};
use crate::library::{Track, TrackId};
use crate::notify::Notifier;

use super::media::MediaPlayer;
use super::monitor::{ListenMonitor, PlayCounted};
use super::queue::PlayQueue;
use super::types::{PlaybackHandle, PlaybackState, PlayerCmd, RepeatMode, SessionId};

pub struct PlaybackController<M: MediaPlayer> {
    media: M,
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    queue: PlayQueue,
    state: PlaybackState,
    info: PlaybackHandle,
    listen: ListenSettings,
    restart_previous_after: Duration,
    monitor: Option<ListenMonitor>,
    counted_tx: Sender<PlayCounted>,
    counted_rx: Receiver<PlayCounted>,
    session: Option<SessionId>,
    next_session: u64,
    /// Local copy the current track is playing from after a failed load.
    staged: Option<NamedTempFile>,
    rng: StdRng,
}

impl<M: MediaPlayer> PlaybackController<M> {
    pub fn new(
        media: M,
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        settings: &Settings,
        info: PlaybackHandle,
    ) -> Self {
        let (counted_tx, counted_rx) = mpsc::channel();
        let controller = Self {
            media,
            backend,
            notifier,
            queue: PlayQueue::new(settings.playback.shuffle, settings.playback.repeat),
            state: PlaybackState::Stopped,
            info,
            listen: settings.listen.clone(),
            restart_previous_after: settings.playback.restart_previous_after(),
            monitor: None,
            counted_tx,
            counted_rx,
            session: None,
            next_session: 1,
            staged: None,
            rng: StdRng::from_entropy(),
        };
        controller.publish();
        controller
    }

    /// Apply one command. Failures are logged; playback carries on.
    pub fn handle(&mut self, cmd: PlayerCmd) {
        debug!(?cmd, "player command");
        let result = match cmd {
            PlayerCmd::SetQueue { tracks, start } => {
                self.set_queue(tracks, start);
                Ok(())
            }
            PlayerCmd::PlayIndex(i) => self.play_index(i),
            PlayerCmd::PlayId(id) => self.play_id(&id),
            PlayerCmd::Next => self.skip_next().map(drop),
            PlayerCmd::Prev => self.skip_previous().map(drop),
            PlayerCmd::Pause => {
                self.pause();
                Ok(())
            }
            PlayerCmd::Resume => self.resume(),
            PlayerCmd::TogglePause => self.toggle_pause(),
            PlayerCmd::Stop => {
                self.stop();
                Ok(())
            }
            PlayerCmd::SeekTo(pos) => self.seek_to(pos),
            PlayerCmd::SeekBy(millis) => self.seek_by(millis),
            PlayerCmd::ToggleShuffle => {
                self.toggle_shuffle();
                Ok(())
            }
            PlayerCmd::SetRepeat(mode) => {
                self.set_repeat(mode);
                Ok(())
            }
            PlayerCmd::CycleRepeat => {
                self.cycle_repeat();
                Ok(())
            }
            PlayerCmd::ToggleFavorite => self.toggle_favorite().map(drop),
            PlayerCmd::Quit => {
                self.stop();
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(error = %e, "player command failed");
        }
    }

    /// Replace the queue. Whatever was playing stops and its session ends.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: usize) {
        self.end_session();
        self.media.stop();
        self.state = PlaybackState::Stopped;
        self.queue.set_queue(tracks, start);
        info!(len = self.queue.len(), current = ?self.queue.current(), "queue replaced");
        self.publish();
        self.notifier.now_playing(None, PlaybackState::Stopped);
    }

    /// Play `track` from the queue, or as a queue of its own when it is not
    /// part of the current one.
    pub fn play_track(&mut self, track: Track) -> Result<()> {
        match self.queue.position_of(&track.id) {
            Some(i) => self.play_index(i),
            None => {
                self.queue.set_queue(vec![track], 0);
                self.play_index(0)
            }
        }
    }

    pub fn play_id(&mut self, id: &TrackId) -> Result<()> {
        let track = self.backend.fetch_track(id)?;
        self.play_track(track)
    }

    /// Load and start the queue entry at `index` in a new session.
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        let Some(track) = self.queue.get(index).cloned() else {
            return Err(PlayerError::QueueIndex(index));
        };

        self.end_session();
        self.queue.select(index);

        if let Err(e) = self.load_with_fallback(&track) {
            self.media.stop();
            self.state = PlaybackState::Stopped;
            self.publish();
            self.notifier
                .playback_error(&format!("cannot play {}: {e}", track.display));
            self.notifier.now_playing(None, PlaybackState::Stopped);
            return Err(e);
        }

        self.media.play();
        self.state = PlaybackState::Playing;
        let session = SessionId(self.next_session);
        self.next_session += 1;
        self.session = Some(session);
        self.publish();

        self.monitor = Some(ListenMonitor::spawn(
            track.id.clone(),
            track.duration,
            session,
            self.info.clone(),
            self.backend.clone(),
            self.counted_tx.clone(),
            &self.listen,
        ));

        info!(track = %track.id, index, %session, "playing");
        self.notifier.now_playing(Some(&track), PlaybackState::Playing);
        Ok(())
    }

    /// Returns whether anything new started playing.
    pub fn skip_next(&mut self) -> Result<bool> {
        let Some(next) = self.queue.next_index(&mut self.rng) else {
            debug!("next: nothing to skip to");
            return Ok(false);
        };
        self.play_index(next)?;
        Ok(true)
    }

    /// Restarts the current track when it has played past the restart
    /// window, otherwise steps back in the queue.
    pub fn skip_previous(&mut self) -> Result<bool> {
        if self.queue.is_empty() {
            return Ok(false);
        }

        if self.state != PlaybackState::Stopped
            && !self.restart_previous_after.is_zero()
            && self.media.position() > self.restart_previous_after
        {
            self.seek_to(Duration::ZERO)?;
            return Ok(true);
        }

        let Some(prev) = self.queue.go_back() else {
            debug!("previous: already at the start");
            return Ok(false);
        };
        self.play_index(prev)?;
        Ok(true)
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let on = self.queue.toggle_shuffle();
        info!(shuffle = on, "shuffle toggled");
        self.publish();
        on
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.queue.set_repeat(mode);
        info!(%mode, "repeat set");
        self.publish();
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        let mode = self.queue.cycle_repeat();
        info!(%mode, "repeat set");
        self.publish();
        mode
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.media.pause();
        self.state = PlaybackState::Paused;
        self.publish();
        self.notifier
            .now_playing(self.queue.current_track(), PlaybackState::Paused);
    }

    /// Resume a paused track, or start the current queue entry when stopped.
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => {
                self.media.play();
                self.state = PlaybackState::Playing;
                self.publish();
                self.notifier
                    .now_playing(self.queue.current_track(), PlaybackState::Playing);
                Ok(())
            }
            PlaybackState::Stopped => match self.queue.current() {
                Some(i) => self.play_index(i),
                None if !self.queue.is_empty() => self.play_index(0),
                None => Err(PlayerError::NothingLoaded),
            },
        }
    }

    pub fn toggle_pause(&mut self) -> Result<()> {
        if self.state == PlaybackState::Playing {
            self.pause();
            Ok(())
        } else {
            self.resume()
        }
    }

    pub fn stop(&mut self) {
        self.end_session();
        self.media.stop();
        self.staged = None;
        if self.state != PlaybackState::Stopped {
            self.state = PlaybackState::Stopped;
            self.notifier.now_playing(None, PlaybackState::Stopped);
        }
        self.publish();
    }

    /// Seek within the loaded track, clamped to its known duration.
    pub fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.state == PlaybackState::Stopped {
            return Err(PlayerError::NothingLoaded);
        }
        let position = match self.queue.current_track().and_then(|t| t.duration) {
            Some(d) => position.min(d),
            None => position,
        };
        self.media.seek(position)?;
        debug!(?position, "seeked");
        self.publish();
        Ok(())
    }

    /// Seek relative to the current position, in milliseconds.
    pub fn seek_by(&mut self, millis: i64) -> Result<()> {
        let current = self.media.position();
        let offset = Duration::from_millis(millis.unsigned_abs());
        let target = if millis < 0 {
            current.saturating_sub(offset)
        } else {
            current + offset
        };
        self.seek_to(target)
    }

    /// Flip the favorite flag of the current track. Returns the new value.
    pub fn toggle_favorite(&mut self) -> Result<bool> {
        let Some(index) = self.queue.current() else {
            return Err(PlayerError::NothingLoaded);
        };
        let Some(track) = self.queue.get_mut(index) else {
            return Err(PlayerError::QueueIndex(index));
        };
        let favorite = !track.favorite;
        self.backend.set_favorite(&track.id, favorite)?;
        track.favorite = favorite;
        info!(track = %track.id, favorite, "favorite updated");
        self.publish();
        Ok(favorite)
    }

    /// The loaded track played to its end.
    pub fn on_completion(&mut self) -> Result<()> {
        match self.queue.completion_index(&mut self.rng) {
            Some(next) => self.play_index(next),
            None => {
                info!("end of queue");
                self.stop();
                Ok(())
            }
        }
    }

    /// Periodic upkeep: pick up reported plays, auto-advance on completion
    /// and publish the position.
    pub fn tick(&mut self) {
        self.apply_play_counts();
        if self.state == PlaybackState::Playing && self.media.is_finished() {
            if let Err(e) = self.on_completion() {
                warn!(error = %e, "auto-advance failed");
            }
        }
        self.publish();
    }

    /// Copy play counts reported by listen monitors into the queue.
    fn apply_play_counts(&mut self) {
        while let Ok(counted) = self.counted_rx.try_recv() {
            let changed = self.queue.set_play_count(&counted.track, counted.plays);
            debug!(
                track = %counted.track,
                session = %counted.session,
                plays = counted.plays,
                changed,
                "play count updated"
            );
        }
    }

    fn end_session(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            debug!(session = %monitor.session(), "session ended");
            monitor.cancel();
        }
        self.session = None;
    }

    /// Load `track`; when the media layer refuses it, stage a local copy
    /// through the backend and try once more from there.
    fn load_with_fallback(&mut self, track: &Track) -> Result<()> {
        let first = match self.media.load(&track.path, Duration::ZERO) {
            Ok(()) => {
                self.staged = None;
                return Ok(());
            }
            Err(e) => e,
        };

        warn!(track = %track.id, error = %first, "load failed, retrying from a local copy");
        self.notifier.playback_error(&format!(
            "cannot play {} directly ({first}), retrying from a local copy",
            track.display
        ));

        let staged = self.stage_copy(track)?;
        self.media.load(staged.path(), Duration::ZERO)?;
        self.staged = Some(staged);
        Ok(())
    }

    fn stage_copy(&self, track: &Track) -> Result<NamedTempFile> {
        let mut reader = self.backend.open_stream(track)?;
        let suffix = track
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let mut tmp = tempfile::Builder::new()
            .prefix("cadenza-")
            .suffix(&suffix)
            .tempfile()?;
        let copied = io::copy(&mut reader, &mut tmp)?;
        tmp.flush()?;
        debug!(track = %track.id, bytes = copied, path = %tmp.path().display(), "staged local copy");
        Ok(tmp)
    }

    fn publish(&self) {
        let position = self.media.position();
        let sampled_at = Instant::now();
        if let Ok(mut info) = self.info.lock() {
            info.index = self.queue.current();
            info.track = self.queue.current_track().cloned();
            info.state = self.state;
            info.position = position;
            info.sampled_at = sampled_at;
            info.session = self.session;
            info.shuffle = self.queue.shuffle();
            info.repeat = self.queue.repeat();
            info.queue_len = self.queue.len();
        }
    }
}

#[cfg(test)]
mod tests;
