//! The backend the playback core talks to: track lookup, play reporting,
//! stats and favorites.

use std::io::Read;

use crate::error::Result;
use crate::library::{ArtistStats, Track, TrackId};
use crate::player::SessionId;

pub trait Backend: Send + Sync {
    /// Look up a track by id, with its current play count and favorite flag.
    fn fetch_track(&self, id: &TrackId) -> Result<Track>;

    /// Count one play of `id`. Repeated calls for the same `session` count
    /// once. Returns the play count after the call.
    fn report_play(&self, id: &TrackId, session: SessionId) -> Result<u64>;

    fn artist_stats(&self, artist: &str) -> Result<ArtistStats>;

    fn set_favorite(&self, id: &TrackId, favorite: bool) -> Result<()>;

    /// Raw bytes of the track, used to stage a local copy when the media
    /// layer cannot play the track from its original location.
    fn open_stream(&self, track: &Track) -> Result<Box<dyn Read + Send>>;
}
