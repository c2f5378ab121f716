use std::path::PathBuf;
use std::time::Duration;

use super::command::parse_command;
use super::event_loop::player_cmd;
use super::mpris_sync::MprisKey;
use super::view::{format_duration, format_queue, format_stats, format_status};
use crate::library::{ArtistStats, Track, TrackId};
use crate::mpris::ControlCmd;
use crate::player::{PlaybackInfo, PlaybackState, PlayerCmd, RepeatMode};

fn track(title: &str) -> Track {
    Track {
        id: TrackId::new(format!("{title}.flac")),
        path: PathBuf::from(format!("/music/{title}.flac")),
        title: title.to_string(),
        artist: Some("Band".to_string()),
        album: None,
        duration: Some(Duration::from_secs(185)),
        favorite: false,
        play_count: 2,
        display: format!("Band - {title}"),
    }
}

#[test]
fn parses_playback_commands() {
    assert_eq!(parse_command("  "), Ok(None));
    assert_eq!(parse_command("play"), Ok(Some(ControlCmd::Play)));
    assert_eq!(parse_command("play 3"), Ok(Some(ControlCmd::PlayIndex(2))));
    assert_eq!(parse_command("NEXT"), Ok(Some(ControlCmd::Next)));
    assert_eq!(parse_command("prev"), Ok(Some(ControlCmd::Prev)));
    assert_eq!(parse_command("toggle"), Ok(Some(ControlCmd::PlayPause)));
    assert_eq!(parse_command("resume"), Ok(Some(ControlCmd::Play)));
    assert_eq!(parse_command("quit"), Ok(Some(ControlCmd::Quit)));
    assert!(parse_command("play 0").is_err());
    assert!(parse_command("play x").is_err());
    assert!(parse_command("dance").is_err());
}

#[test]
fn parses_seek_targets() {
    assert_eq!(
        parse_command("seek +10"),
        Ok(Some(ControlCmd::SeekBy(10_000)))
    );
    assert_eq!(
        parse_command("seek -5"),
        Ok(Some(ControlCmd::SeekBy(-5_000)))
    );
    assert_eq!(
        parse_command("seek 90"),
        Ok(Some(ControlCmd::SeekTo(Duration::from_secs(90))))
    );
    assert_eq!(
        parse_command("seek 1:30"),
        Ok(Some(ControlCmd::SeekTo(Duration::from_secs(90))))
    );
    assert_eq!(
        parse_command("seek 1:02:03"),
        Ok(Some(ControlCmd::SeekTo(Duration::from_secs(3723))))
    );
    assert!(parse_command("seek").is_err());
    assert!(parse_command("seek 1:75").is_err());
    assert!(parse_command("seek +-3").is_err());
    assert!(parse_command("seek +99999999999999999").is_err());
}

#[test]
fn open_takes_the_rest_of_the_line_as_a_track_id() {
    assert_eq!(
        parse_command("open Artist/Some Album/01 Intro.flac"),
        Ok(Some(ControlCmd::PlayId(TrackId::new(
            "Artist/Some Album/01 Intro.flac"
        ))))
    );
    assert!(parse_command("open").is_err());
}

#[test]
fn parses_modes_and_queries() {
    assert_eq!(parse_command("shuffle"), Ok(Some(ControlCmd::ToggleShuffle)));
    assert_eq!(parse_command("repeat"), Ok(Some(ControlCmd::Repeat(None))));
    assert_eq!(
        parse_command("repeat one"),
        Ok(Some(ControlCmd::Repeat(Some(RepeatMode::One))))
    );
    assert!(parse_command("repeat twice").is_err());
    assert_eq!(parse_command("fav"), Ok(Some(ControlCmd::ToggleFavorite)));
    assert_eq!(
        parse_command("stats  The Band "),
        Ok(Some(ControlCmd::Stats("The Band".to_string())))
    );
    assert!(parse_command("stats").is_err());
    assert_eq!(parse_command("list"), Ok(Some(ControlCmd::List)));
}

#[test]
fn control_commands_map_to_player_commands() {
    assert!(matches!(player_cmd(&ControlCmd::Play), Some(PlayerCmd::Resume)));
    assert!(matches!(
        player_cmd(&ControlCmd::PlayPause),
        Some(PlayerCmd::TogglePause)
    ));
    assert!(matches!(
        player_cmd(&ControlCmd::Repeat(None)),
        Some(PlayerCmd::CycleRepeat)
    ));
    assert!(matches!(
        player_cmd(&ControlCmd::Repeat(Some(RepeatMode::All))),
        Some(PlayerCmd::SetRepeat(RepeatMode::All))
    ));
    assert!(matches!(
        player_cmd(&ControlCmd::PlayIndex(4)),
        Some(PlayerCmd::PlayIndex(4))
    ));
    assert!(matches!(
        player_cmd(&ControlCmd::PlayId(TrackId::new("a.mp3"))),
        Some(PlayerCmd::PlayId(id)) if id == TrackId::new("a.mp3")
    ));
    assert!(matches!(
        player_cmd(&ControlCmd::SeekBy(-1_500)),
        Some(PlayerCmd::SeekBy(-1_500))
    ));
    assert!(player_cmd(&ControlCmd::Quit).is_none());
    assert!(player_cmd(&ControlCmd::Status).is_none());
}

#[test]
fn mpris_key_changes_with_the_play_count() {
    let mut info = PlaybackInfo {
        index: Some(0),
        state: PlaybackState::Playing,
        track: Some(track("Song")),
        ..PlaybackInfo::default()
    };
    let before = MprisKey::of(&info);
    info.position = Duration::from_secs(40);
    assert_eq!(MprisKey::of(&info), before);

    if let Some(t) = info.track.as_mut() {
        t.play_count += 1;
    }
    assert_ne!(MprisKey::of(&info), before);
}

#[test]
fn formats_durations() {
    assert_eq!(format_duration(Duration::from_secs(5)), "0:05");
    assert_eq!(format_duration(Duration::from_secs(185)), "3:05");
    assert_eq!(format_duration(Duration::from_secs(3723)), "1:02:03");
}

#[test]
fn status_shows_track_position_and_modes() {
    let stopped = PlaybackInfo::default();
    assert_eq!(format_status(&stopped), "stopped (shuffle off, repeat off)");

    let mut t = track("Song");
    t.favorite = true;
    let info = PlaybackInfo {
        index: Some(0),
        track: Some(t),
        state: PlaybackState::Paused,
        position: Duration::from_secs(61),
        shuffle: true,
        repeat: RepeatMode::All,
        ..PlaybackInfo::default()
    };
    assert_eq!(
        format_status(&info),
        "paused: Band - Song [1:01 / 3:05] ♥ plays 2 (shuffle on, repeat all)"
    );
}

#[test]
fn queue_listing_marks_the_current_entry() {
    let tracks = vec![track("A"), track("B")];
    let out = format_queue(&tracks, Some(1));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, ["  1. Band - A (2 plays)", "> 2. Band - B (2 plays)"]);
    assert_eq!(format_queue(&[], None), "queue is empty");
}

#[test]
fn stats_line_names_the_top_track() {
    let stats = ArtistStats {
        artist: "Band".to_string(),
        tracks: 3,
        total_plays: 7,
        favorites: 1,
        top_track: Some((TrackId::new("Band/A.flac"), 5)),
    };
    assert_eq!(
        format_stats(&stats),
        "Band: 3 tracks, 7 plays, 1 favorites; most played Band/A.flac (5)"
    );
}
