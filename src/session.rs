//! Persisted sign-in token.
//!
//! The token is opaque: it is written once after a successful sign-in and
//! only ever checked for presence. There is no expiry or refresh.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Token kept in a small TOML file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, if any. A missing or unreadable file means "signed out".
    pub fn token(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("cannot read session file {}: {e}", self.path.display());
                return None;
            }
        };
        match toml::from_str::<SessionFile>(&raw) {
            Ok(file) => file.token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::warn!("ignoring malformed session file {}: {e}", self.path.display());
                None
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            token: Some(token.to_string()),
        };
        let body = toml::to_string(&file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, body)?;
        Ok(())
    }

    /// Forget the token. Succeeds when nothing was stored.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
