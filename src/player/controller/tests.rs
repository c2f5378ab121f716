use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::player::types::PlaybackInfo;
use crate::library::ArtistStats;

#[derive(Default)]
struct MediaState {
    loaded: Option<PathBuf>,
    playing: bool,
    position: Duration,
    finished: bool,
    fail_paths: Vec<PathBuf>,
    fail_all: bool,
    loads: Vec<PathBuf>,
    seeks: Vec<Duration>,
}

#[derive(Clone, Default)]
struct FakeMedia(Arc<Mutex<MediaState>>);

impl FakeMedia {
    fn state(&self) -> std::sync::MutexGuard<'_, MediaState> {
        self.0.lock().unwrap()
    }
}

impl MediaPlayer for FakeMedia {
    fn load(&mut self, path: &Path, start_at: Duration) -> Result<()> {
        let mut s = self.state();
        s.loads.push(path.to_path_buf());
        if s.fail_all || s.fail_paths.iter().any(|p| p == path) {
            return Err(PlayerError::Decode {
                path: path.to_path_buf(),
                message: "unsupported".to_string(),
            });
        }
        s.loaded = Some(path.to_path_buf());
        s.position = start_at;
        s.playing = false;
        s.finished = false;
        Ok(())
    }

    fn play(&mut self) {
        let mut s = self.state();
        if s.loaded.is_some() {
            s.playing = true;
        }
    }

    fn pause(&mut self) {
        self.state().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state();
        s.loaded = None;
        s.playing = false;
        s.position = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let mut s = self.state();
        if s.loaded.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        s.position = position;
        s.seeks.push(position);
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state().position
    }

    fn is_finished(&self) -> bool {
        self.state().finished
    }
}

#[derive(Default)]
struct FakeBackend {
    library: Vec<Track>,
    favorites: Mutex<HashMap<TrackId, bool>>,
    plays: Mutex<HashMap<TrackId, u64>>,
}

impl Backend for FakeBackend {
    fn fetch_track(&self, id: &TrackId) -> Result<Track> {
        self.library
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| PlayerError::TrackNotFound(id.clone()))
    }

    fn report_play(&self, id: &TrackId, _session: SessionId) -> Result<u64> {
        let mut plays = self.plays.lock().unwrap();
        let n = plays.entry(id.clone()).or_default();
        *n += 1;
        Ok(*n)
    }

    fn artist_stats(&self, artist: &str) -> Result<ArtistStats> {
        Err(PlayerError::Backend(format!("no stats for {artist}")))
    }

    fn set_favorite(&self, id: &TrackId, favorite: bool) -> Result<()> {
        self.favorites.lock().unwrap().insert(id.clone(), favorite);
        Ok(())
    }

    fn open_stream(&self, _track: &Track) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(b"audio bytes".to_vec())))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    events: Mutex<Vec<(Option<TrackId>, PlaybackState)>>,
}

impl Notifier for RecordingNotifier {
    fn now_playing(&self, track: Option<&Track>, state: PlaybackState) {
        self.events
            .lock()
            .unwrap()
            .push((track.map(|t| t.id.clone()), state));
    }

    fn playback_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

fn track(n: usize) -> Track {
    let id = format!("track{n}.mp3");
    Track {
        id: TrackId::new(&id),
        path: PathBuf::from(format!("/music/{id}")),
        title: format!("Track {n}"),
        artist: Some("Artist".to_string()),
        album: None,
        duration: Some(Duration::from_secs(180)),
        favorite: false,
        play_count: 0,
        display: format!("Artist - Track {n}"),
    }
}

fn tracks(n: usize) -> Vec<Track> {
    (0..n).map(track).collect()
}

fn quiet_settings() -> Settings {
    let mut s = Settings::default();
    // Keep listen monitors idle; they are exercised in the player tests.
    s.listen.tick_ms = 60_000;
    s
}

impl<M: MediaPlayer> PlaybackController<M> {
    fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    fn published(&self) -> PlaybackInfo {
        self.info.lock().unwrap().clone()
    }

    fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn session(&self) -> Option<SessionId> {
        self.session
    }
}

struct Harness {
    media: FakeMedia,
    backend: Arc<FakeBackend>,
    notifier: Arc<RecordingNotifier>,
    controller: PlaybackController<FakeMedia>,
}

fn harness_with(settings: Settings, backend: FakeBackend) -> Harness {
    let media = FakeMedia::default();
    let backend = Arc::new(backend);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = PlaybackController::new(
        media.clone(),
        backend.clone(),
        notifier.clone(),
        &settings,
        PlaybackHandle::default(),
    )
    .with_rng(StdRng::seed_from_u64(7));
    Harness {
        media,
        backend,
        notifier,
        controller,
    }
}

fn harness() -> Harness {
    harness_with(quiet_settings(), FakeBackend::default())
}

#[test]
fn skip_next_past_end_without_repeat_is_a_noop() {
    let mut h = harness();
    h.controller.set_queue(tracks(3), 0);
    h.controller.play_index(2).unwrap();
    let loads = h.media.state().loads.len();

    assert!(!h.controller.skip_next().unwrap());
    assert_eq!(h.controller.queue().current(), Some(2));
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert_eq!(h.media.state().loads.len(), loads);
}

#[test]
fn skip_next_with_repeat_all_wraps_to_first() {
    let mut h = harness();
    h.controller.set_queue(tracks(3), 0);
    h.controller.set_repeat(RepeatMode::All);
    h.controller.play_index(2).unwrap();

    assert!(h.controller.skip_next().unwrap());
    assert_eq!(h.controller.queue().current(), Some(0));
}

#[test]
fn manual_skip_ignores_repeat_one() {
    let mut h = harness();
    h.controller.set_queue(tracks(3), 0);
    h.controller.set_repeat(RepeatMode::One);
    h.controller.play_index(0).unwrap();

    assert!(h.controller.skip_next().unwrap());
    assert_eq!(h.controller.queue().current(), Some(1));
}

#[test]
fn empty_queue_makes_skips_noops() {
    let mut h = harness();
    h.controller.set_queue(Vec::new(), 0);

    assert!(!h.controller.skip_next().unwrap());
    assert!(!h.controller.skip_previous().unwrap());
    assert!(matches!(
        h.controller.resume(),
        Err(PlayerError::NothingLoaded)
    ));
    assert!(h.media.state().loads.is_empty());
}

#[test]
fn shuffle_never_reselects_the_current_track() {
    let mut h = harness();
    h.controller.set_queue(tracks(4), 0);
    assert!(h.controller.toggle_shuffle());
    h.controller.play_index(0).unwrap();

    for _ in 0..200 {
        let before = h.controller.queue().current();
        assert!(h.controller.skip_next().unwrap());
        assert_ne!(h.controller.queue().current(), before);
    }
}

#[test]
fn shuffled_previous_retraces_the_skips() {
    let mut h = harness();
    h.controller.set_queue(tracks(6), 0);
    h.controller.toggle_shuffle();
    h.controller.play_index(0).unwrap();

    let mut visited = vec![0];
    for _ in 0..3 {
        h.controller.skip_next().unwrap();
        visited.push(h.controller.queue().current().unwrap());
    }

    visited.pop();
    while let Some(expected) = visited.pop() {
        assert!(h.controller.skip_previous().unwrap());
        assert_eq!(h.controller.queue().current(), Some(expected));
    }
}

#[test]
fn previous_restarts_a_track_that_played_for_a_while() {
    let mut h = harness();
    h.controller.set_queue(tracks(3), 0);
    h.controller.play_index(1).unwrap();

    h.media.state().position = Duration::from_secs(10);
    assert!(h.controller.skip_previous().unwrap());
    assert_eq!(h.controller.queue().current(), Some(1));
    assert_eq!(h.media.state().seeks, vec![Duration::ZERO]);

    h.media.state().position = Duration::from_secs(1);
    assert!(h.controller.skip_previous().unwrap());
    assert_eq!(h.controller.queue().current(), Some(0));

    // At the top of a non-repeating queue there is nowhere to go.
    assert!(!h.controller.skip_previous().unwrap());
    assert_eq!(h.controller.queue().current(), Some(0));
}

#[test]
fn completion_with_repeat_one_replays_in_a_new_session() {
    let mut h = harness();
    h.controller.set_queue(tracks(2), 0);
    h.controller.set_repeat(RepeatMode::One);
    h.controller.play_index(0).unwrap();
    let first = h.controller.session().unwrap();

    h.media.state().finished = true;
    h.controller.tick();

    assert_eq!(h.controller.queue().current(), Some(0));
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    let second = h.controller.session().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        h.controller.published().session,
        Some(second)
    );
}

#[test]
fn completion_at_end_of_non_repeating_queue_stops() {
    let mut h = harness();
    h.controller.set_queue(tracks(2), 0);
    h.controller.play_index(0).unwrap();

    h.media.state().finished = true;
    h.controller.tick();
    assert_eq!(h.controller.queue().current(), Some(1));
    assert_eq!(h.controller.state(), PlaybackState::Playing);

    h.media.state().finished = true;
    h.controller.tick();
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert_eq!(h.controller.session(), None);
    assert!(h.media.state().loaded.is_none());
}

#[test]
fn pause_and_resume_are_published() {
    let mut h = harness();
    h.controller.set_queue(tracks(2), 0);
    h.controller.play_index(0).unwrap();
    let session = h.controller.session();

    h.controller.pause();
    assert_eq!(h.controller.state(), PlaybackState::Paused);
    assert!(!h.media.state().playing);
    assert!(!h.controller.published().playing());

    h.controller.toggle_pause().unwrap();
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert!(h.media.state().playing);
    // Resuming continues the same session.
    assert_eq!(h.controller.session(), session);
}

#[test]
fn resume_when_stopped_starts_the_selected_entry() {
    let mut h = harness();
    h.controller.set_queue(tracks(3), 2);
    h.controller.resume().unwrap();
    assert_eq!(h.controller.queue().current(), Some(2));
    assert_eq!(h.controller.state(), PlaybackState::Playing);
}

#[test]
fn failed_load_retries_from_a_staged_copy() {
    let mut h = harness();
    h.media.state().fail_paths.push(PathBuf::from("/music/track0.mp3"));
    h.controller.set_queue(tracks(1), 0);

    h.controller.play_index(0).unwrap();

    let s = h.media.state();
    assert_eq!(s.loads.len(), 2);
    let staged = s.loaded.clone().unwrap();
    assert_ne!(staged, PathBuf::from("/music/track0.mp3"));
    assert_eq!(staged.extension().and_then(|e| e.to_str()), Some("mp3"));
    assert_eq!(std::fs::read(&staged).unwrap(), b"audio bytes");
    drop(s);

    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert_eq!(h.notifier.errors.lock().unwrap().len(), 1);
}

#[test]
fn failed_fallback_stops_and_reports() {
    let mut h = harness();
    h.media.state().fail_all = true;
    h.controller.set_queue(tracks(1), 0);

    assert!(h.controller.play_index(0).is_err());
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert_eq!(h.controller.session(), None);
    assert_eq!(h.notifier.errors.lock().unwrap().len(), 2);
}

#[test]
fn play_id_plays_a_track_outside_the_queue_on_its_own() {
    let backend = FakeBackend {
        library: vec![track(9)],
        ..FakeBackend::default()
    };
    let mut h = harness_with(quiet_settings(), backend);
    h.controller.set_queue(tracks(3), 0);

    h.controller.play_id(&TrackId::new("track9.mp3")).unwrap();
    assert_eq!(h.controller.queue().len(), 1);
    assert_eq!(
        h.controller.queue().current_track().map(|t| t.id.clone()),
        Some(TrackId::new("track9.mp3"))
    );
    assert!(h.controller.play_id(&TrackId::new("missing.mp3")).is_err());
}

#[test]
fn play_track_selects_an_existing_queue_entry() {
    let mut h = harness();
    h.controller.set_queue(tracks(3), 0);
    h.controller.play_track(track(2)).unwrap();
    assert_eq!(h.controller.queue().len(), 3);
    assert_eq!(h.controller.queue().current(), Some(2));
}

#[test]
fn set_queue_stops_playback_and_ends_the_session() {
    let mut h = harness();
    h.controller.set_queue(tracks(2), 0);
    h.controller.play_index(1).unwrap();
    assert!(h.controller.session().is_some());

    h.controller.set_queue(tracks(4), 3);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert_eq!(h.controller.session(), None);
    assert_eq!(h.controller.queue().current(), Some(3));

    let info = h.controller.published();
    assert_eq!(info.queue_len, 4);
    assert_eq!(info.session, None);
}

#[test]
fn seek_by_is_clamped_to_the_track() {
    let mut h = harness();
    h.controller.set_queue(tracks(1), 0);
    h.controller.play_index(0).unwrap();

    h.controller.seek_by(-30_000).unwrap();
    h.controller.seek_by(500_000).unwrap();
    assert_eq!(
        h.media.state().seeks,
        vec![Duration::ZERO, Duration::from_secs(180)]
    );

    h.controller.stop();
    assert!(matches!(
        h.controller.seek_by(5_000),
        Err(PlayerError::NothingLoaded)
    ));
}

#[test]
fn seek_by_keeps_sub_second_offsets() {
    let mut h = harness();
    h.controller.set_queue(tracks(1), 0);
    h.controller.play_index(0).unwrap();
    h.media.state().position = Duration::from_secs(10);

    h.controller.seek_by(-500).unwrap();
    h.controller.seek_by(1_900).unwrap();
    assert_eq!(
        h.media.state().seeks,
        vec![Duration::from_millis(9_500), Duration::from_millis(11_400)]
    );
}

#[test]
fn reported_plays_show_up_in_the_published_track() {
    let mut settings = Settings::default();
    settings.listen.threshold_secs = 1;
    settings.listen.tolerance_ms = 400;
    settings.listen.tick_ms = 20;
    let mut h = harness_with(settings, FakeBackend::default());
    let mut queue = tracks(2);
    // The same track queued twice; both entries carry the count.
    queue.push(track(0));
    h.controller.set_queue(queue, 0);
    h.controller.play_index(0).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while h.controller.published().track.map(|t| t.play_count) != Some(1) {
        assert!(Instant::now() < deadline, "play count never refreshed");
        h.media.state().position += Duration::from_millis(50);
        h.controller.tick();
        thread::sleep(Duration::from_millis(50));
    }

    let id = TrackId::new("track0.mp3");
    assert_eq!(h.backend.plays.lock().unwrap().get(&id), Some(&1));
    assert_eq!(h.controller.queue().get(2).unwrap().play_count, 1);
    assert_eq!(h.controller.queue().get(1).unwrap().play_count, 0);
}

#[test]
fn toggle_favorite_goes_through_the_backend() {
    let mut h = harness();
    h.controller.set_queue(tracks(1), 0);
    h.controller.play_index(0).unwrap();

    assert!(h.controller.toggle_favorite().unwrap());
    assert_eq!(
        h.backend
            .favorites
            .lock()
            .unwrap()
            .get(&TrackId::new("track0.mp3")),
        Some(&true)
    );
    let info = h.controller.published();
    assert!(info.track.unwrap().favorite);

    assert!(!h.controller.toggle_favorite().unwrap());
}

#[test]
fn notifier_sees_track_changes() {
    let mut h = harness();
    h.controller.set_queue(tracks(2), 0);
    h.controller.play_index(0).unwrap();
    h.controller.skip_next().unwrap();
    h.controller.stop();

    let events = h.notifier.events.lock().unwrap();
    let last_three: Vec<_> = events.iter().rev().take(3).cloned().collect();
    assert_eq!(
        last_three,
        vec![
            (None, PlaybackState::Stopped),
            (Some(TrackId::new("track1.mp3")), PlaybackState::Playing),
            (Some(TrackId::new("track0.mp3")), PlaybackState::Playing),
        ]
    );
}
