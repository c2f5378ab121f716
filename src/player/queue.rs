//! The play queue: an ordered list of tracks, a current index and the
//! shuffle/repeat flags that decide where skipping goes.

use rand::Rng;

use crate::library::{Track, TrackId};

use super::types::RepeatMode;

#[derive(Debug, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    current: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,
    /// Indices left behind by shuffled skips, most recent last.
    history: Vec<usize>,
}

impl PlayQueue {
    pub fn new(shuffle: bool, repeat: RepeatMode) -> Self {
        Self {
            shuffle,
            repeat,
            ..Self::default()
        }
    }

    /// Replace the queue. `start` is clamped to the first entry when out of
    /// range; an empty queue has no current index.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: usize) {
        self.current = if tracks.is_empty() {
            None
        } else if start < tracks.len() {
            Some(start)
        } else {
            Some(0)
        };
        self.tracks = tracks;
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Record a new play count on every entry of `id`. Returns how many
    /// entries changed.
    pub fn set_play_count(&mut self, id: &TrackId, plays: u64) -> usize {
        let mut changed = 0;
        for t in self.tracks.iter_mut().filter(|t| &t.id == id) {
            if t.play_count != plays {
                t.play_count = plays;
                changed += 1;
            }
        }
        changed
    }

    /// Make `index` current. Shuffled moves are remembered so that
    /// `go_back` can walk back through them.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        if self.shuffle {
            if let Some(cur) = self.current.filter(|&c| c != index) {
                self.history.push(cur);
            }
        }
        self.current = Some(index);
        true
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.history.clear();
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    /// Where a manual "next" goes. Manual skips never repeat the current
    /// track, even under `RepeatMode::One`.
    pub fn next_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        let Some(cur) = self.current else {
            return Some(0);
        };

        if self.shuffle && len > 1 {
            // Draw from the other len-1 slots so the current one is never hit.
            let pick = rng.gen_range(0..len - 1);
            return Some(if pick >= cur { pick + 1 } else { pick });
        }

        if cur + 1 < len {
            Some(cur + 1)
        } else if self.repeat == RepeatMode::All {
            Some(0)
        } else {
            None
        }
    }

    /// Step back for a manual "previous" and return the new current index.
    /// While shuffling this retraces earlier shuffled skips; otherwise it moves
    /// one entry up, wrapping only under `RepeatMode::All`.
    pub fn go_back(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        let target = match self.current {
            None => Some(0),
            Some(cur) => self.back_from(cur, len),
        };
        if target.is_some() {
            self.current = target;
        }
        target
    }

    fn back_from(&mut self, cur: usize, len: usize) -> Option<usize> {
        if self.shuffle {
            while let Some(prev) = self.history.pop() {
                if prev < len && prev != cur {
                    return Some(prev);
                }
            }
        }

        if cur > 0 {
            Some(cur - 1)
        } else if self.repeat == RepeatMode::All {
            Some(len - 1)
        } else {
            None
        }
    }

    /// Where playback goes when the current track ends on its own. `None`
    /// means stop.
    pub fn completion_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match (self.repeat, self.current) {
            (RepeatMode::One, Some(cur)) if cur < self.tracks.len() => Some(cur),
            _ => self.next_index(rng),
        }
    }
}
