//! The media layer the controller drives.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;

pub trait MediaPlayer {
    /// Load `path` paused at `start_at`, replacing whatever was loaded.
    fn load(&mut self, path: &Path, start_at: Duration) -> Result<()>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Unload the current media.
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn position(&self) -> Duration;
    /// Whether the loaded media played to its end.
    fn is_finished(&self) -> bool;
}
