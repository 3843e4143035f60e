use std::fs::{self, OpenOptions};
use std::str::FromStr;

use crate::config;

/// Route `log` output to a file; stderr belongs to the terminal UI.
///
/// Logging is best effort: if the file cannot be opened the app runs without it.
pub fn init(settings: &config::LoggingSettings) {
    let level = log::LevelFilter::from_str(settings.level.trim()).unwrap_or_else(|_| {
        eprintln!(
            "nidra: unknown log level {:?}, using info",
            settings.level
        );
        log::LevelFilter::Info
    });
    if level == log::LevelFilter::Off {
        return;
    }

    let Some(path) = settings.file.clone().or_else(config::default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("nidra: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let mut clog = colog::default_builder();
    clog.filter(None, level)
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(file)));
    if clog.try_init().is_err() {
        return;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));
}
