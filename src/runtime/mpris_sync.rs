use crate::mpris::MprisHandle;
use crate::player::{PlaybackInfo, PlaybackState, RepeatMode, SessionId};

/// The parts of a playback snapshot MPRIS clients care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MprisKey {
    index: Option<usize>,
    session: Option<SessionId>,
    state: PlaybackState,
    shuffle: bool,
    repeat: RepeatMode,
    favorite: bool,
    plays: Option<u64>,
}

impl MprisKey {
    pub fn of(info: &PlaybackInfo) -> Self {
        Self {
            index: info.index,
            session: info.session,
            state: info.state,
            shuffle: info.shuffle,
            repeat: info.repeat,
            favorite: info.track.as_ref().is_some_and(|t| t.favorite),
            plays: info.track.as_ref().map(|t| t.play_count),
        }
    }
}

pub fn update_mpris(mpris: &MprisHandle, info: &PlaybackInfo) {
    let track = match info.state {
        PlaybackState::Stopped => None,
        _ => info.track.as_ref(),
    };
    mpris.set_track_metadata(info.index, track);
    mpris.set_playback(info.state);
    mpris.set_modes(info.shuffle, info.repeat);
}
