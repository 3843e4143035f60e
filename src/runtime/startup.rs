use std::path::PathBuf;

use crate::app::App;
use crate::config;
use crate::session::TokenStore;

use super::network::Network;

/// Session file from config, falling back to the XDG data dir.
pub fn token_store(settings: &config::Settings) -> TokenStore {
    let path = settings
        .storage
        .session_path
        .clone()
        .or_else(config::default_session_path)
        .unwrap_or_else(|| PathBuf::from("nidra-session.toml"));
    let store = TokenStore::new(path);
    log::debug!("session file: {}", store.path().display());
    store
}

/// Kick off the first catalog fetch for the configured language.
pub fn request_initial_catalog(app: &mut App, network: &Network) {
    let language = app.change_language(app.catalog.language());
    network.fetch_catalog(language);
}
