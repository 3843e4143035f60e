//! On-screen transport state: what the player panel shows, and the scrub gesture.
//!
//! A scrub holds `seek_in_flight` from the first keypress until the controller
//! acknowledges the resulting seek. While it is held, polled positions are
//! ignored and the panel shows the gesture value instead.

use std::time::{Duration, Instant};

use crate::audio::{AudioCmd, PlaybackEvent, TransportState};
use crate::config::TimeField;

#[derive(Debug, Default)]
pub struct TransportView {
    track: Option<String>,
    state: TransportState,
    position_ms: u64,
    duration_ms: u64,
    seek_in_flight: bool,
    /// Position the user is scrubbing towards.
    scrub_target: u64,
    last_scrub: Option<Instant>,
    /// `SeekTo` was sent for the current gesture; waiting for `SeekCompleted`.
    committed: bool,
}

impl TransportView {
    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn seek_in_flight(&self) -> bool {
        self.seek_in_flight
    }

    /// Position to render: the gesture value while scrubbing, otherwise the
    /// last reported one.
    pub fn position_ms(&self) -> u64 {
        if self.seek_in_flight {
            self.scrub_target
        } else {
            self.position_ms
        }
    }

    /// Progress in `[0, 1]`, or zero when the length is unknown.
    pub fn ratio(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms() as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    fn is_current(&self, name: &str) -> bool {
        self.track.as_deref() == Some(name)
    }

    fn reset(&mut self) {
        self.track = None;
        self.position_ms = 0;
        self.duration_ms = 0;
        self.seek_in_flight = false;
        self.scrub_target = 0;
        self.last_scrub = None;
        self.committed = false;
    }

    pub fn apply(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::State { track, state } => {
                self.state = *state;
                match state {
                    TransportState::Idle => {
                        if track.is_none() || track.as_deref() == self.track.as_deref() {
                            self.reset();
                        }
                    }
                    TransportState::Loading => {
                        self.reset();
                        self.track = track.clone();
                    }
                    _ => {
                        if track.is_some() {
                            self.track = track.clone();
                        }
                    }
                }
            }
            PlaybackEvent::Loaded { track, duration_ms } => {
                self.reset();
                self.track = Some(track.name.clone());
                self.duration_ms = *duration_ms;
            }
            PlaybackEvent::Status(status) => {
                if !self.is_current(&status.track) {
                    return;
                }
                if status.duration_ms > 0 {
                    self.duration_ms = status.duration_ms;
                }
                if !self.seek_in_flight {
                    self.position_ms = status.position_ms;
                }
            }
            PlaybackEvent::SeekCompleted { track, position_ms } => {
                if !self.is_current(track) {
                    return;
                }
                self.position_ms = *position_ms;
                // An ack for an earlier gesture must not end the one in progress.
                if self.committed {
                    self.seek_in_flight = false;
                    self.committed = false;
                    self.last_scrub = None;
                }
            }
            PlaybackEvent::LoadFailed { track, .. }
            | PlaybackEvent::Finished { track }
            | PlaybackEvent::Released { track } => {
                if self.is_current(&track.name) {
                    self.reset();
                }
            }
        }
    }

    /// Move the scrub position by `delta_ms`. Returns `BeginSeek` when this
    /// keypress starts a new gesture.
    pub fn scrub(&mut self, delta_ms: i64, now: Instant) -> Option<AudioCmd> {
        if self.track.is_none()
            || !matches!(self.state, TransportState::Playing | TransportState::Paused)
        {
            return None;
        }

        let starting = !self.seek_in_flight || self.committed;
        if !self.seek_in_flight {
            self.scrub_target = self.position_ms;
        }
        self.seek_in_flight = true;
        self.committed = false;
        self.last_scrub = Some(now);

        let moved = self.scrub_target as i64 + delta_ms;
        let upper = if self.duration_ms > 0 {
            self.duration_ms as i64
        } else {
            i64::MAX
        };
        self.scrub_target = moved.clamp(0, upper) as u64;

        starting.then_some(AudioCmd::BeginSeek)
    }

    /// Release the gesture now.
    pub fn commit(&mut self) -> Option<AudioCmd> {
        if !self.seek_in_flight || self.committed {
            return None;
        }
        self.committed = true;
        Some(AudioCmd::SeekTo(self.scrub_target))
    }

    /// Release the gesture once no scrub key arrived for `delay`.
    pub fn commit_if_idle(&mut self, now: Instant, delay: Duration) -> Option<AudioCmd> {
        let last = self.last_scrub?;
        if now.saturating_duration_since(last) < delay {
            return None;
        }
        self.commit()
    }

    /// Time readout, e.g. `1:05 / 3:20`.
    pub fn time_text(&self, fields: &[TimeField], separator: &str) -> String {
        let position = self.position_ms();
        fields
            .iter()
            .filter_map(|field| match field {
                TimeField::Elapsed => Some(format_time(position)),
                TimeField::Total => (self.duration_ms > 0).then(|| format_time(self.duration_ms)),
                TimeField::Remaining => (self.duration_ms > 0)
                    .then(|| format!("-{}", format_time(self.duration_ms.saturating_sub(position)))),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Format milliseconds as `m:ss`.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
