//! Playback core: the play queue, the playback controller and its thread,
//! and the listen-time play counter.

mod controller;
mod handle;
mod listen;
mod media;
mod monitor;
mod queue;
mod sink;
mod thread;
mod types;

pub use handle::Player;
pub use sink::RodioPlayer;
pub use types::{PlaybackInfo, PlaybackState, PlayerCmd, RepeatMode, SessionId};
