//! Play counts and favorites, persisted as a small TOML file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::model::TrackId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    #[serde(default)]
    pub plays: u64,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    tracks: BTreeMap<String, TrackEntry>,
}

/// In-memory play store, optionally backed by a file.
#[derive(Debug, Default)]
pub struct PlayStore {
    path: Option<PathBuf>,
    data: StoreFile,
}

impl PlayStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let data = match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = data.tracks.len(), "play store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    pub fn entry(&self, id: &TrackId) -> TrackEntry {
        self.data.tracks.get(id.as_str()).cloned().unwrap_or_default()
    }

    /// Bump the play count of `id` and return the new count.
    pub fn record_play(&mut self, id: &TrackId) -> u64 {
        let e = self.data.tracks.entry(id.as_str().to_string()).or_default();
        e.plays += 1;
        e.plays
    }

    pub fn set_favorite(&mut self, id: &TrackId, favorite: bool) {
        self.data
            .tracks
            .entry(id.as_str().to_string())
            .or_default()
            .favorite = favorite;
    }

    /// Write the store back to disk (no-op for in-memory stores). The file is
    /// replaced atomically.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let text = toml::to_string(&self.data)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
