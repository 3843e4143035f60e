//! Audio-related small types: transport state, commands and events.

use crate::catalog::Track;

/// Playback lifecycle phase of the active chant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Fetching and decoding a chant.
    Loading,
    Playing,
    Paused,
    /// Output halted; the resource is about to be released.
    Stopped,
}

impl TransportState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Release whatever is loaded, then load and start this chant.
    Load(Track),
    Play,
    Pause,
    TogglePause,
    /// A seek gesture started; position updates are held back until `SeekTo`.
    BeginSeek,
    /// Jump to the given offset (milliseconds), ending any seek gesture.
    SeekTo(u64),
    /// Stop playback and release the loaded chant.
    Stop,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Periodic snapshot of the active chant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    /// Name of the chant this status belongs to.
    pub track: String,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
    pub did_finish: bool,
}

/// Everything the controller reports back, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Transport state changed. `track` is the chant it applies to, if any.
    State {
        track: Option<String>,
        state: TransportState,
    },
    Loaded {
        track: Track,
        duration_ms: u64,
    },
    LoadFailed {
        track: Track,
        reason: String,
    },
    Status(PlaybackStatus),
    SeekCompleted {
        track: String,
        position_ms: u64,
    },
    /// The chant played to the end. Sent once per loaded resource.
    Finished {
        track: Track,
    },
    /// The resource was released; no further events mention it.
    Released {
        track: Track,
    },
}
