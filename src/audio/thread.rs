use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::SeekResume;
use crate::error::Result;

use super::backend::AudioBackend;
use super::controller::PlaybackController;
use super::types::{AudioCmd, PlaybackEvent};

/// Spawn the thread that owns the playback controller.
///
/// The backend is built on the audio thread itself since output streams are
/// not `Send`. Commands are applied strictly in arrival order, so a release
/// always completes before the next load starts.
pub(super) fn spawn_audio_thread<B, F>(
    make_backend: F,
    rx: Receiver<AudioCmd>,
    events: Sender<PlaybackEvent>,
    seek_resume: SeekResume,
    poll_interval: Duration,
) -> std::io::Result<JoinHandle<()>>
where
    B: AudioBackend + 'static,
    F: FnOnce() -> Result<B> + Send + 'static,
{
    thread::Builder::new()
        .name("nidra-audio".to_string())
        .spawn(move || {
            let backend = match make_backend() {
                Ok(b) => b,
                Err(e) => {
                    log::error!("audio output unavailable: {e}");
                    reject_loads(rx, events, e.to_string());
                    return;
                }
            };

            let mut controller = PlaybackController::new(backend, seek_resume, events);
            let mut last_poll = Instant::now();

            loop {
                let wait = poll_interval.saturating_sub(last_poll.elapsed());
                match rx.recv_timeout(wait) {
                    Ok(AudioCmd::Quit { fade_out_ms }) => {
                        if let Some(track) = controller.active_track() {
                            log::info!(
                                "quit while {} {:?} at {}/{} ms{}",
                                controller.state().label(),
                                track.name,
                                controller.position_ms(),
                                controller.duration_ms(),
                                if controller.seek_in_flight() { " (seeking)" } else { "" },
                            );
                        }
                        controller.shutdown(fade_out_ms);
                        break;
                    }
                    Ok(cmd) => controller.apply(cmd),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        controller.release();
                        break;
                    }
                }

                if last_poll.elapsed() >= poll_interval {
                    controller.poll();
                    last_poll = Instant::now();
                }
            }
        })
}

/// Without an output device every load fails; keep answering so the UI
/// never sits in `Loading`.
fn reject_loads(rx: Receiver<AudioCmd>, events: Sender<PlaybackEvent>, reason: String) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCmd::Load(track) => {
                let _ = events.send(PlaybackEvent::LoadFailed {
                    track,
                    reason: reason.clone(),
                });
            }
            AudioCmd::Quit { .. } => break,
            _ => {}
        }
    }
}
