//! `rodio` implementation of the audio backend.
//!
//! Remote chants are downloaded into memory (bounded by the load timeout and a
//! size cap) and decoded from a cursor; local paths are read from disk.

use std::fs;
use std::io::{Cursor, Read};
use std::time::Duration;

use lofty::prelude::AudioFile;
use lofty::probe::Probe;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::config::PlaybackSettings;
use crate::error::{Error, Result};

use super::backend::{AudioBackend, Sound};

pub struct RodioBackend {
    stream: OutputStream,
    http_client: ureq::Agent,
    max_bytes: u64,
}

impl RodioBackend {
    /// Open the default output device. Must be called on the thread that will
    /// own the backend.
    pub fn open_default(settings: &PlaybackSettings) -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::resource("default audio output", e))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            http_client: http_agent(settings),
            max_bytes: settings.max_download_mb.saturating_mul(1024 * 1024),
        })
    }
}

/// Agent for chant downloads; the whole request is bounded by the load timeout.
pub(super) fn http_agent(settings: &PlaybackSettings) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_millis(settings.load_timeout_ms))
        .build()
}

/// Read a chant into memory. `http(s)` locators are downloaded (at most
/// `max_bytes`), anything else is a local path with an optional `file://`.
pub(super) fn fetch(agent: &ureq::Agent, locator: &str, max_bytes: u64) -> Result<Vec<u8>> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        let response = agent
            .get(locator)
            .call()
            .map_err(|e| Error::resource(locator, e))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| Error::resource(locator, e))?;
        if bytes.len() as u64 > max_bytes {
            return Err(Error::resource(locator, "download exceeds size limit"));
        }
        Ok(bytes)
    } else {
        let path = locator.strip_prefix("file://").unwrap_or(locator);
        fs::read(path).map_err(|e| Error::resource(locator, e))
    }
}

impl AudioBackend for RodioBackend {
    type Sound = RodioSound;

    fn open(&mut self, locator: &str) -> Result<RodioSound> {
        let bytes = fetch(&self.http_client, locator, self.max_bytes)?;
        let probed = probe_duration(&bytes);

        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| Error::resource(locator, e))?;
        let duration = source.total_duration().or(probed);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        log::debug!("decoded {locator} (duration {duration:?})");
        Ok(RodioSound { sink, duration })
    }
}

/// Container-level duration, for formats the decoder cannot size up front.
fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration()).filter(|d| !d.is_zero())
}

pub struct RodioSound {
    sink: Sink,
    duration: Option<Duration>,
}

impl Sound for RodioSound {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.sink
            .try_seek(position)
            .map_err(|e| Error::resource("active chant", e))
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
