//! `MediaPlayer` on top of a `rodio` output stream.
//!
//! Each load opens and decodes the file into a fresh paused `Sink`. Seeking
//! rebuilds the sink and skips into the file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use crate::error::{PlayerError, Result};

use super::media::MediaPlayer;

pub struct RodioPlayer {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    /// Where the current sink started in the file.
    seek_base: Duration,
    paused: bool,
}

impl RodioPlayer {
    pub fn open_default() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::OutputDevice(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped; keep the console clean.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            path: None,
            seek_base: Duration::ZERO,
            paused: true,
        })
    }

    /// Create a paused `Sink` for `path` that starts playback at `start_at`.
    fn create_sink_at(&self, path: &Path, start_at: Duration) -> Result<Sink> {
        let file = File::open(path).map_err(|source| PlayerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| PlayerError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }
}

impl MediaPlayer for RodioPlayer {
    fn load(&mut self, path: &Path, start_at: Duration) -> Result<()> {
        let sink = self.create_sink_at(path, start_at)?;
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.path = Some(path.to_path_buf());
        self.seek_base = start_at;
        self.paused = true;
        debug!(path = %path.display(), ?start_at, "media loaded");
        Ok(())
    }

    fn play(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
            self.paused = true;
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.path = None;
        self.seek_base = Duration::ZERO;
        self.paused = true;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(PlayerError::NothingLoaded);
        };
        let was_paused = self.paused;
        self.load(&path, position)?;
        if !was_paused {
            self.play();
        }
        Ok(())
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map_or(Duration::ZERO, |s| self.seek_base + s.get_pos())
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !self.paused && s.empty())
    }
}
