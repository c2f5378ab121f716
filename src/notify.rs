//! Now-playing and error notifications.

use crate::library::Track;
use crate::player::PlaybackState;

pub trait Notifier: Send + Sync {
    fn now_playing(&self, track: Option<&Track>, state: PlaybackState);
    /// A user-visible playback problem.
    fn playback_error(&self, message: &str);
}

/// Prints track changes and errors to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn now_playing(&self, track: Option<&Track>, state: PlaybackState) {
        match (track, state) {
            (Some(t), PlaybackState::Playing) => eprintln!("▶ {}", t.display),
            (Some(t), PlaybackState::Paused) => eprintln!("⏸ {}", t.display),
            _ => eprintln!("■ stopped"),
        }
    }

    fn playback_error(&self, message: &str) {
        eprintln!("cadenza: {message}");
    }
}
