//! Error taxonomy shared by the playback core and its collaborators.
//!
//! Nothing here is fatal: network and validation errors end up as alerts,
//! resource errors reset the controller to `Idle`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Fetch or transport failure talking to the chant server.
    #[error("{0}")]
    Network(String),

    /// An audio locator could not be fetched or decoded.
    #[error("could not load {locator}: {reason}")]
    Resource { locator: String, reason: String },

    /// Local input check failed; no request was issued.
    #[error("{message}")]
    Validation {
        title: &'static str,
        message: &'static str,
    },

    /// Reading or writing local state (session file, screenshot).
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl Error {
    pub fn resource(locator: &str, reason: impl ToString) -> Self {
        Self::Resource {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Title used when the error is shown as an alert.
    pub fn alert_title(&self) -> &'static str {
        match self {
            Self::Network(_) => "Error",
            Self::Resource { .. } => "Playback error",
            Self::Validation { title, .. } => title,
            Self::Storage(_) => "Error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
