use super::load::{default_config_path, default_session_path, resolve_config_path};
use super::schema::*;
use crate::catalog::Language;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_nidra_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("NIDRA_CONFIG_PATH", "/tmp/nidra-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/nidra-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("nidra")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("nidra")
            .join("config.toml")
    );
}

#[test]
fn default_session_path_uses_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");
    assert_eq!(
        default_session_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/nidra/session.toml")
    );

    let _g2 = EnvGuard::remove("XDG_DATA_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_session_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/nidra/session.toml")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_policy_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[server]
url = "https://chants.example.org"
request_timeout_ms = 4000

[playback]
poll_interval_ms = 250
seek_resume = "always-resume"
sign_in_policy = "always"
quit_fade_out_ms = 0

[controls]
scrub_step_ms = 10000

[ui]
header_text = "hello"
default_language = "hindi"
donation_prompt = false
time_fields = ["elapsed", "remaining"]
time_separator = " | "

[donation]
preset_amounts = ["101rs", "501rs"]
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NIDRA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("NIDRA__PLAYBACK__POLL_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.server.url, "https://chants.example.org");
    assert_eq!(s.server.request_timeout_ms, 4000);
    assert_eq!(s.server.connect_timeout_ms, 5000);
    assert_eq!(s.playback.poll_interval_ms, 250);
    assert_eq!(s.playback.seek_resume, SeekResume::Always);
    assert_eq!(s.playback.sign_in_policy, SignInPolicy::Always);
    assert_eq!(s.playback.quit_fade_out_ms, 0);
    assert_eq!(s.playback.load_timeout_ms, 15_000);
    assert_eq!(s.controls.scrub_step_ms, 10_000);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.default_language, Language::Hi);
    assert!(!s.ui.donation_prompt);
    assert_eq!(s.ui.time_fields, vec![TimeField::Elapsed, TimeField::Remaining]);
    assert_eq!(s.ui.time_separator, " | ");
    assert_eq!(s.donation.preset_amounts, vec!["101rs", "501rs"]);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
poll_interval_ms = 1000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NIDRA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("NIDRA__PLAYBACK__POLL_INTERVAL_MS", "200");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.poll_interval_ms, 200);
}

#[test]
fn defaults_match_the_reference_server_behavior() {
    let s = Settings::default();
    assert_eq!(s.playback.poll_interval_ms, 1000);
    assert_eq!(s.playback.seek_resume, SeekResume::Preserve);
    assert_eq!(s.playback.sign_in_policy, SignInPolicy::AfterFirstPlay);
    assert_eq!(s.donation.preset_amounts.len(), 4);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_non_http_server_and_zero_intervals() {
    let mut s = Settings::default();
    s.server.url = "ftp://nope".into();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.poll_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.donation.preset_amounts.push("  ".into());
    assert!(s.validate().is_err());
}
