//! Line commands read from stdin.

use std::time::Duration;

use crate::library::TrackId;
use crate::mpris::ControlCmd;
use crate::player::RepeatMode;

pub const HELP: &str = "\
commands:
  list                 show the queue
  play [N]             play entry N of the list, or resume
  open ID              play a library track by id (its relative path)
  pause | resume | toggle | stop
  next | prev
  seek +S | -S         seek relative, in seconds
  seek S | M:SS        seek to a position
  shuffle              toggle shuffle
  repeat [off|one|all] set or cycle the repeat mode
  fav                  toggle favorite on the current track
  stats ARTIST         listening numbers for an artist
  status               what is playing
  help | quit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ControlCmd>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "q" | "quit" | "exit" => ControlCmd::Quit,
        "play" | "p" if rest.is_empty() => ControlCmd::Play,
        "play" | "p" => ControlCmd::PlayIndex(parse_entry(rest)?),
        "open" if rest.is_empty() => return Err("open needs a track id".to_string()),
        "open" => ControlCmd::PlayId(TrackId::new(rest)),
        "pause" => ControlCmd::Pause,
        "resume" => ControlCmd::Play,
        "toggle" => ControlCmd::PlayPause,
        "stop" => ControlCmd::Stop,
        "next" | "n" => ControlCmd::Next,
        "prev" | "previous" | "b" => ControlCmd::Prev,
        "seek" => parse_seek(rest)?,
        "shuffle" => ControlCmd::ToggleShuffle,
        "repeat" if rest.is_empty() => ControlCmd::Repeat(None),
        "repeat" => match RepeatMode::parse(rest) {
            Some(mode) => ControlCmd::Repeat(Some(mode)),
            None => return Err(format!("unknown repeat mode {rest:?} (off, one, all)")),
        },
        "fav" | "favorite" => ControlCmd::ToggleFavorite,
        "stats" if rest.is_empty() => return Err("stats needs an artist name".to_string()),
        "stats" => ControlCmd::Stats(rest.to_string()),
        "list" | "ls" => ControlCmd::List,
        "status" => ControlCmd::Status,
        "help" | "?" => ControlCmd::Help,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(Some(cmd))
}

/// Lists are numbered from 1.
fn parse_entry(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("not a list entry: {s:?}")),
    }
}

fn parse_seek(s: &str) -> Result<ControlCmd, String> {
    if s.is_empty() {
        return Err("seek needs a target".to_string());
    }
    if let Some(rest) = s.strip_prefix('+') {
        return parse_secs(rest).map(|n| ControlCmd::SeekBy(n * 1_000));
    }
    if let Some(rest) = s.strip_prefix('-') {
        return parse_secs(rest).map(|n| ControlCmd::SeekBy(-n * 1_000));
    }
    parse_timestamp(s)
        .map(ControlCmd::SeekTo)
        .ok_or_else(|| format!("bad seek target {s:?}"))
}

fn parse_secs(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| (0..=i64::MAX / 1_000).contains(n))
        .ok_or_else(|| format!("bad number of seconds {s:?}"))
}

/// `S`, `M:SS` or `H:MM:SS`.
fn parse_timestamp(s: &str) -> Option<Duration> {
    let mut total: u64 = 0;
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    for (i, part) in parts.iter().enumerate() {
        let n: u64 = part.parse().ok()?;
        if i > 0 && n >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(n)?;
    }
    Some(Duration::from_secs(total))
}
