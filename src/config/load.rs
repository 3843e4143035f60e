use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `NIDRA__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NIDRA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.server.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("server.url must be an http(s) URL, got {url:?}"));
        }
        if self.playback.poll_interval_ms == 0 {
            return Err("playback.poll_interval_ms must be >= 1".to_string());
        }
        if self.playback.load_timeout_ms == 0 {
            return Err("playback.load_timeout_ms must be >= 1".to_string());
        }
        if self.controls.scrub_step_ms == 0 {
            return Err("controls.scrub_step_ms must be >= 1".to_string());
        }
        if self.donation.preset_amounts.iter().any(|a| a.trim().is_empty()) {
            return Err("donation.preset_amounts must not contain blank entries".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `NIDRA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NIDRA_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/nidra/config.toml`
/// or `~/.config/nidra/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("nidra").join("config.toml"))
}

/// `$XDG_DATA_HOME/nidra/session.toml`, or `~/.local/share/nidra/session.toml`.
pub fn default_session_path() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join("nidra").join("session.toml"))
}

/// `$XDG_STATE_HOME/nidra/nidra.log`, or `~/.local/state/nidra/nidra.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("nidra").join("nidra.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var).filter(|v| !v.is_empty()) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
