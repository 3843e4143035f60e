//! The playback controller: one owned sound, one transport state machine.
//!
//! ```text
//! Idle --load--> Loading --ready--> Playing <--pause/play--> Paused
//! Loading --error--> Idle
//! {Playing, Paused} --stop--> Stopped --> Idle
//! {Playing, Paused} --finish--> Idle
//! ```
//!
//! Loading always releases the previous sound first, so there is never more
//! than one resource alive. All outcomes are reported as [`PlaybackEvent`]s in
//! the order they happen; once `Released` or `Finished` is sent for a chant,
//! nothing else about it follows.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::catalog::Track;
use crate::config::SeekResume;
use crate::error::Result;

use super::backend::{AudioBackend, Sound};
use super::types::{AudioCmd, PlaybackEvent, PlaybackStatus, TransportState};

struct Active<S> {
    track: Track,
    sound: S,
}

pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    active: Option<Active<B::Sound>>,
    state: TransportState,
    position_ms: u64,
    duration_ms: u64,
    seek_in_flight: bool,
    resume_after_seek: bool,
    seek_resume: SeekResume,
    events: Sender<PlaybackEvent>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B, seek_resume: SeekResume, events: Sender<PlaybackEvent>) -> Self {
        Self {
            backend,
            active: None,
            state: TransportState::Idle,
            position_ms: 0,
            duration_ms: 0,
            seek_in_flight: false,
            resume_after_seek: false,
            seek_resume,
            events,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.active.as_ref().map(|a| &a.track)
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn seek_in_flight(&self) -> bool {
        self.seek_in_flight
    }

    fn emit(&self, event: PlaybackEvent) {
        // The receiver only goes away during shutdown.
        let _ = self.events.send(event);
    }

    fn set_state(&mut self, state: TransportState, track: Option<String>) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.emit(PlaybackEvent::State { track, state });
    }

    fn active_name(&self) -> Option<String> {
        self.active.as_ref().map(|a| a.track.name.clone())
    }

    fn status(&self, did_finish: bool) -> Option<PlaybackStatus> {
        let active = self.active.as_ref()?;
        Some(PlaybackStatus {
            track: active.track.name.clone(),
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            is_playing: self.state == TransportState::Playing,
            did_finish,
        })
    }

    /// Dispatch one command from the audio thread.
    pub fn apply(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load(track) => {
                // Failures were already reported as `LoadFailed`.
                let _ = self.load(track);
            }
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::TogglePause => self.toggle(),
            AudioCmd::BeginSeek => self.begin_seek(),
            AudioCmd::SeekTo(ms) => self.seek_to(ms),
            AudioCmd::Stop => self.stop(),
            AudioCmd::Quit { fade_out_ms } => self.shutdown(fade_out_ms),
        }
    }

    /// Release the current sound, then open `track` and start playing it.
    pub fn load(&mut self, track: Track) -> Result<()> {
        self.release();
        self.set_state(TransportState::Loading, Some(track.name.clone()));

        let mut sound = match self.backend.open(&track.url) {
            Ok(sound) => sound,
            Err(e) => {
                log::warn!("failed to load {:?}: {e}", track.name);
                self.set_state(TransportState::Idle, Some(track.name.clone()));
                self.emit(PlaybackEvent::LoadFailed {
                    track,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        sound.play();
        self.position_ms = 0;
        self.duration_ms = sound.duration().map_or(0, |d| d.as_millis() as u64);
        self.seek_in_flight = false;
        log::info!("playing {:?} ({} ms)", track.name, self.duration_ms);

        let name = track.name.clone();
        self.emit(PlaybackEvent::Loaded {
            track: track.clone(),
            duration_ms: self.duration_ms,
        });
        self.active = Some(Active { track, sound });
        self.set_state(TransportState::Playing, Some(name));
        if let Some(status) = self.status(false) {
            self.emit(PlaybackEvent::Status(status));
        }
        Ok(())
    }

    pub fn play(&mut self) {
        let Some(active) = self.active.as_mut() else {
            log::warn!("play requested with nothing loaded");
            return;
        };
        if self.state == TransportState::Playing {
            return;
        }
        active.sound.play();
        let name = self.active_name();
        self.set_state(TransportState::Playing, name);
    }

    pub fn pause(&mut self) {
        let Some(active) = self.active.as_mut() else {
            log::warn!("pause requested with nothing loaded");
            return;
        };
        // A pause during a seek gesture outlives the seek.
        self.resume_after_seek = false;
        if self.state == TransportState::Paused {
            return;
        }
        active.sound.pause();
        let name = self.active_name();
        self.set_state(TransportState::Paused, name);
    }

    pub fn toggle(&mut self) {
        if self.state == TransportState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Start a seek gesture. Position updates stop until [`seek_to`](Self::seek_to).
    pub fn begin_seek(&mut self) {
        if self.active.is_none() {
            log::warn!("seek requested with nothing loaded");
            return;
        }
        if self.seek_in_flight {
            return;
        }
        self.seek_in_flight = true;
        self.resume_after_seek = match self.seek_resume {
            SeekResume::Always => true,
            SeekResume::Preserve => self.state == TransportState::Playing,
        };
    }

    /// Jump to `position_ms`, clamped to the chant's length.
    pub fn seek_to(&mut self, position_ms: u64) {
        if self.active.is_none() {
            log::warn!("seek requested with nothing loaded");
            return;
        }
        self.begin_seek();

        let target = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };

        if let Some(active) = self.active.as_mut() {
            match active.sound.seek(Duration::from_millis(target)) {
                Ok(()) => self.position_ms = target,
                Err(e) => log::warn!("seek in {:?} failed: {e}", active.track.name),
            }
        }

        if self.resume_after_seek {
            self.play();
        }
        self.seek_in_flight = false;
        self.resume_after_seek = false;

        if let Some(name) = self.active_name() {
            self.emit(PlaybackEvent::SeekCompleted {
                track: name,
                position_ms: self.position_ms,
            });
        }
        if let Some(status) = self.status(false) {
            self.emit(PlaybackEvent::Status(status));
        }
    }

    /// Halt output, then release the resource.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.sound.stop();
            let name = self.active_name();
            self.set_state(TransportState::Stopped, name);
        }
        self.release();
    }

    /// Drop the loaded sound, if any, and return to `Idle`. Idempotent.
    pub fn release(&mut self) {
        self.position_ms = 0;
        self.duration_ms = 0;
        self.seek_in_flight = false;
        self.resume_after_seek = false;

        let Some(mut active) = self.active.take() else {
            self.set_state(TransportState::Idle, None);
            return;
        };
        active.sound.stop();
        let Active { track, sound } = active;
        drop(sound);
        log::debug!("released {:?}", track.name);

        let name = track.name.clone();
        self.emit(PlaybackEvent::Released { track });
        self.set_state(TransportState::Idle, Some(name));
    }

    /// Refresh position/duration from the decoder. Called on the poll interval.
    ///
    /// Emits a status while playing, unless a seek gesture is in progress.
    /// Detects the end of the chant in any state.
    pub fn poll(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.sound.is_finished() {
            self.finish();
            return;
        }
        if self.seek_in_flight {
            return;
        }

        self.position_ms = active.sound.position().as_millis() as u64;
        if self.duration_ms == 0 {
            if let Some(d) = active.sound.duration() {
                self.duration_ms = d.as_millis() as u64;
            }
        }
        if self.duration_ms > 0 {
            self.position_ms = self.position_ms.min(self.duration_ms);
        }

        if self.state == TransportState::Playing {
            if let Some(status) = self.status(false) {
                self.emit(PlaybackEvent::Status(status));
            }
        }
    }

    fn finish(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if self.duration_ms > 0 {
            self.position_ms = self.duration_ms;
        }
        self.emit(PlaybackEvent::Status(PlaybackStatus {
            track: active.track.name.clone(),
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            is_playing: false,
            did_finish: true,
        }));

        let Active { track, sound } = active;
        drop(sound);
        log::info!("finished {:?}", track.name);

        let name = track.name.clone();
        self.emit(PlaybackEvent::Finished { track });
        self.position_ms = 0;
        self.duration_ms = 0;
        self.seek_in_flight = false;
        self.set_state(TransportState::Idle, Some(name));
    }

    /// Fade the active chant out over `fade_out_ms`, then release it.
    pub fn shutdown(&mut self, fade_out_ms: u64) {
        if let Some(active) = self.active.as_mut() {
            if fade_out_ms > 0 && self.state == TransportState::Playing {
                let steps: u64 = 20;
                let step_ms = (fade_out_ms / steps).max(1);
                active.sound.set_volume(1.0);
                for step in 1..=steps {
                    let t = step as f32 / steps as f32;
                    active.sound.set_volume(1.0 - t);
                    thread::sleep(Duration::from_millis(step_ms));
                }
            }
            active.sound.set_volume(0.0);
        }
        self.release();
    }
}
