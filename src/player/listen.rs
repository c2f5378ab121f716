//! Listen-time accounting for the play counter.
//!
//! The tracker is fed position samples and only credits time where the
//! playback position advanced roughly as fast as the wall clock. Jumps in
//! either direction are seeks and earn nothing.
//!
//! Paused samples keep the baseline. The first playing sample after a pause
//! is credited with the position delta as long as it is no larger than the
//! wall time since the paused sample, so listening right after a resume is
//! not lost.

use std::time::{Duration, Instant};

use tracing::trace;

/// One reading of the media position.
#[derive(Debug, Clone, Copy)]
pub struct ListenSample {
    /// When the position was read.
    pub at: Instant,
    pub position: Duration,
    pub playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenEvent {
    /// Not playing; nothing is credited.
    Paused,
    /// First sample of the session.
    Baseline,
    /// Genuine playback; total real listening time so far.
    Listening(Duration),
    /// The position jumped; nothing was credited.
    Seek,
    /// The threshold was crossed by this sample. Emitted once.
    ThresholdReached,
    /// The play was already counted.
    Counted,
}

#[derive(Debug)]
pub struct ListenTracker {
    threshold: Duration,
    tolerance: Duration,
    accumulated: Duration,
    last: Option<(Instant, Duration)>,
    /// The previous sample was paused.
    resuming: bool,
    counted: bool,
}

impl ListenTracker {
    /// `threshold` is lowered to half of `track_duration` for tracks too
    /// short to ever reach it.
    pub fn new(threshold: Duration, tolerance: Duration, track_duration: Option<Duration>) -> Self {
        let threshold = match track_duration {
            Some(d) if !d.is_zero() => threshold.min(d / 2),
            _ => threshold,
        };
        Self {
            threshold,
            tolerance,
            accumulated: Duration::ZERO,
            last: None,
            resuming: false,
            counted: false,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn observe(&mut self, sample: ListenSample) -> ListenEvent {
        if self.counted {
            return ListenEvent::Counted;
        }
        let resuming = std::mem::replace(&mut self.resuming, !sample.playing);
        let last = self.last.replace((sample.at, sample.position));
        if !sample.playing {
            return ListenEvent::Paused;
        }
        let Some((last_at, last_pos)) = last else {
            return ListenEvent::Baseline;
        };

        let wall = sample.at.saturating_duration_since(last_at);
        let Some(delta) = sample.position.checked_sub(last_pos) else {
            trace!(from = ?last_pos, to = ?sample.position, "backward seek");
            return ListenEvent::Seek;
        };

        let drift = if delta > wall {
            delta - wall
        } else if resuming {
            // Playback restarted somewhere between the two samples.
            Duration::ZERO
        } else {
            wall - delta
        };
        if drift > self.tolerance {
            trace!(?delta, ?wall, "position jump treated as seek");
            return ListenEvent::Seek;
        }

        self.accumulated += delta;
        if self.accumulated >= self.threshold {
            self.counted = true;
            ListenEvent::ThresholdReached
        } else {
            ListenEvent::Listening(self.accumulated)
        }
    }
}
