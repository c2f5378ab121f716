use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::{PlayerError, Result};
use crate::player::SessionId;

use super::model::{ArtistStats, Track, TrackId};
use super::store::PlayStore;

/// `Backend` over a scanned music folder and a local play store.
pub struct LibraryBackend {
    inner: Mutex<Inner>,
}

struct Inner {
    tracks: Vec<Track>,
    by_id: HashMap<TrackId, usize>,
    store: PlayStore,
    /// Latest session counted per track. Sessions only grow, so anything at
    /// or below it has been counted already.
    last_reported: HashMap<TrackId, SessionId>,
}

impl Inner {
    fn hydrated(&self, idx: usize) -> Track {
        let mut t = self.tracks[idx].clone();
        let entry = self.store.entry(&t.id);
        t.play_count = entry.plays;
        t.favorite = entry.favorite;
        t
    }
}

impl LibraryBackend {
    pub fn new(tracks: Vec<Track>, store: PlayStore) -> Self {
        let by_id = tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                tracks,
                by_id,
                store,
                last_reported: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PlayerError::Backend("library lock poisoned".to_string()))
    }

    /// All tracks in library order, with counts and favorites filled in.
    pub fn tracks(&self) -> Result<Vec<Track>> {
        let inner = self.lock()?;
        Ok((0..inner.tracks.len()).map(|i| inner.hydrated(i)).collect())
    }
}

#[cfg(test)]
impl LibraryBackend {
    pub(super) fn reported_sessions(&self) -> Vec<(TrackId, SessionId)> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<_> = inner
            .last_reported
            .iter()
            .map(|(id, s)| (id.clone(), *s))
            .collect();
        out.sort();
        out
    }
}

impl Backend for LibraryBackend {
    fn fetch_track(&self, id: &TrackId) -> Result<Track> {
        let inner = self.lock()?;
        let idx = *inner
            .by_id
            .get(id)
            .ok_or_else(|| PlayerError::TrackNotFound(id.clone()))?;
        Ok(inner.hydrated(idx))
    }

    fn report_play(&self, id: &TrackId, session: SessionId) -> Result<u64> {
        let mut inner = self.lock()?;
        if !inner.by_id.contains_key(id) {
            return Err(PlayerError::TrackNotFound(id.clone()));
        }

        let duplicate = inner
            .last_reported
            .get(id)
            .is_some_and(|last| *last >= session);
        let plays = if !duplicate {
            inner.last_reported.insert(id.clone(), session);
            let plays = inner.store.record_play(id);
            info!(track = %id, %session, plays, "play counted");
            plays
        } else {
            debug!(track = %id, %session, "play already counted for this session");
            inner.store.entry(id).plays
        };

        // Saving again on a duplicate report lets a retry persist a count
        // whose first save failed.
        inner.store.save()?;
        Ok(plays)
    }

    fn artist_stats(&self, artist: &str) -> Result<ArtistStats> {
        let inner = self.lock()?;
        let wanted = artist.trim().to_lowercase();

        let mut stats = ArtistStats {
            artist: artist.trim().to_string(),
            tracks: 0,
            total_plays: 0,
            favorites: 0,
            top_track: None,
        };

        for (i, t) in inner.tracks.iter().enumerate() {
            let Some(a) = t.artist.as_deref() else {
                continue;
            };
            if a.to_lowercase() != wanted {
                continue;
            }
            let t = inner.hydrated(i);
            stats.tracks += 1;
            stats.total_plays += t.play_count;
            if t.favorite {
                stats.favorites += 1;
            }
            let better = match &stats.top_track {
                Some((_, best)) => t.play_count > *best,
                None => t.play_count > 0,
            };
            if better {
                stats.top_track = Some((t.id.clone(), t.play_count));
            }
        }

        if stats.tracks == 0 {
            return Err(PlayerError::Backend(format!("no tracks by {artist:?}")));
        }
        Ok(stats)
    }

    fn set_favorite(&self, id: &TrackId, favorite: bool) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.by_id.contains_key(id) {
            return Err(PlayerError::TrackNotFound(id.clone()));
        }
        inner.store.set_favorite(id, favorite);
        inner.store.save()
    }

    fn open_stream(&self, track: &Track) -> Result<Box<dyn Read + Send>> {
        let file = File::open(&track.path).map_err(|source| PlayerError::Open {
            path: track.path.clone(),
            source,
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}
