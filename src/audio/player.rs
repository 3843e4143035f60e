use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::PlaybackSettings;
use crate::error::Result;

use super::backend::AudioBackend;
use super::sink::RodioBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, PlaybackEvent};

/// Handle to the audio thread. Commands are fire-and-forget; outcomes come
/// back on the event channel given at construction.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Player on the default output device.
    pub fn new(settings: &PlaybackSettings, events: Sender<PlaybackEvent>) -> std::io::Result<Self> {
        let backend_settings = settings.clone();
        Self::with_backend(
            move || RodioBackend::open_default(&backend_settings),
            settings,
            events,
        )
    }

    pub fn with_backend<B, F>(
        make_backend: F,
        settings: &PlaybackSettings,
        events: Sender<PlaybackEvent>,
    ) -> std::io::Result<Self>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let audio_handle = spawn_audio_thread(
            make_backend,
            rx,
            events,
            settings.seek_resume,
            Duration::from_millis(settings.poll_interval_ms.max(1)),
        )?;

        Ok(Self {
            tx,
            join: Mutex::new(Some(audio_handle)),
        })
    }

    pub fn send(&self, cmd: AudioCmd) -> std::result::Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Fade out, release the chant and wait for the audio thread to exit.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
