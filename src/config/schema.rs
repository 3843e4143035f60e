use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::Language;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/nidra/config.toml` or `~/.config/nidra/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NIDRA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub donation: DonationSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the chant server, without a trailing slash.
    pub url: String,
    pub connect_timeout_ms: u64,
    /// Read/write timeout for API calls (catalog, auth, upload).
    pub request_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://192.168.1.3:3000".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often position/duration are refreshed while a chant is loaded.
    pub poll_interval_ms: u64,
    /// Upper bound on fetching + decoding a chant before it counts as failed.
    pub load_timeout_ms: u64,
    /// Largest remote chant accepted, in megabytes.
    pub max_download_mb: u64,
    /// Whether playback resumes after a seek.
    pub seek_resume: SeekResume,
    /// When selecting a chant requires a stored sign-in token.
    pub sign_in_policy: SignInPolicy,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            load_timeout_ms: 15_000,
            max_download_mb: 64,
            seek_resume: SeekResume::Preserve,
            sign_in_policy: SignInPolicy::AfterFirstPlay,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeekResume {
    /// Resume only if the chant was playing when the seek gesture began.
    #[serde(alias = "preserve-state", alias = "preserve_state")]
    Preserve,
    /// Always resume playback once the seek lands.
    #[serde(alias = "always-resume", alias = "always_resume")]
    Always,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignInPolicy {
    /// Never ask for sign-in before playing.
    Never,
    /// The first chant plays freely; later selections need a token.
    #[serde(alias = "after_first_play", alias = "first-play")]
    AfterFirstPlay,
    /// Every selection needs a token.
    Always,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Milliseconds moved per `H` / `L` scrub step.
    pub scrub_step_ms: u64,
    /// Idle time after the last scrub step before the seek is committed.
    pub seek_commit_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_step_ms: 5_000,
            seek_commit_ms: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Language selected at startup.
    pub default_language: Language,
    /// Show the "would you like to donate?" prompt on startup.
    pub donation_prompt: bool,
    /// Which time fields to show next to the progress bar, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,
    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ YOGA NIDRA ~ ".to_string(),
            default_language: Language::En,
            donation_prompt: true,
            time_fields: vec![TimeField::Elapsed, TimeField::Total],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DonationSettings {
    /// Preset amounts offered on the donation view.
    pub preset_amounts: Vec<String>,
}

impl Default for DonationSettings {
    fn default() -> Self {
        Self {
            preset_amounts: vec![
                "200rs".into(),
                "500rs".into(),
                "1000rs".into(),
                "2000rs".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where the sign-in token is kept. Defaults to the XDG data dir.
    pub session_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    /// Log file. Defaults to the XDG state dir.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
