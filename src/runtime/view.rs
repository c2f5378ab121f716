use std::fmt::Write;
use std::time::Duration;

use crate::library::{ArtistStats, Track};
use crate::player::{PlaybackInfo, PlaybackState};

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

pub fn format_status(info: &PlaybackInfo) -> String {
    let modes = format!(
        "shuffle {}, repeat {}",
        if info.shuffle { "on" } else { "off" },
        info.repeat
    );
    let track = match (&info.track, info.state) {
        (Some(t), PlaybackState::Playing | PlaybackState::Paused) => t,
        _ => return format!("stopped ({modes})"),
    };

    let state = if info.state == PlaybackState::Paused {
        "paused"
    } else {
        "playing"
    };
    let mut out = format!("{state}: {}", track.display);
    match track.duration {
        Some(total) => {
            let _ = write!(
                out,
                " [{} / {}]",
                format_duration(info.position),
                format_duration(total)
            );
        }
        None => {
            let _ = write!(out, " [{}]", format_duration(info.position));
        }
    }
    if track.favorite {
        out.push_str(" ♥");
    }
    let _ = write!(out, " plays {} ({modes})", track.play_count);
    out
}

/// One line per track, numbered from 1, the current entry marked.
pub fn format_queue(tracks: &[Track], current: Option<usize>) -> String {
    if tracks.is_empty() {
        return "queue is empty".to_string();
    }
    let width = tracks.len().to_string().len();
    let mut out = String::new();
    for (i, t) in tracks.iter().enumerate() {
        let marker = if current == Some(i) { '>' } else { ' ' };
        let fav = if t.favorite { " ♥" } else { "" };
        let _ = writeln!(
            out,
            "{marker} {:>width$}. {}{fav} ({} plays)",
            i + 1,
            t.display,
            t.play_count
        );
    }
    out.pop();
    out
}

pub fn format_stats(stats: &ArtistStats) -> String {
    let mut out = format!(
        "{}: {} tracks, {} plays, {} favorites",
        stats.artist, stats.tracks, stats.total_plays, stats.favorites
    );
    if let Some((ref id, plays)) = stats.top_track {
        let _ = write!(out, "; most played {id} ({plays})");
    }
    out
}
