use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::library::{LibraryBackend, PlayStore, Track, scan};

/// Scan `dir` and open the play store. Returns the backend and the tracks
/// with their stored counts and favorites, in queue order.
pub fn open_library(dir: &Path, settings: &Settings) -> Result<(Arc<LibraryBackend>, Vec<Track>)> {
    let tracks = scan(dir, &settings.library);
    info!(dir = %dir.display(), tracks = tracks.len(), "library scanned");

    let store = match settings.store_path() {
        Some(path) => PlayStore::open(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "cannot read play store, counts will not persist");
            PlayStore::in_memory()
        }),
        None => {
            warn!("no data directory, play counts will not persist");
            PlayStore::in_memory()
        }
    };

    let backend = Arc::new(LibraryBackend::new(tracks, store));
    let tracks = backend.tracks()?;
    Ok((backend, tracks))
}
