use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Stable identifier of a track: its library-relative path with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub favorite: bool,
    pub play_count: u64,
    pub display: String,
}

/// Aggregated listening numbers for one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistStats {
    pub artist: String,
    pub tracks: usize,
    pub total_plays: u64,
    pub favorites: usize,
    /// Most played track and its count, when anything was played at all.
    pub top_track: Option<(TrackId, u64)>,
}
