//! Application module: the view model used by the TUI and runtime.
//!
//! `App` lives in `app::model`; the player panel state and scrub gesture live
//! in `app::transport`.

mod form;
mod model;
mod transport;

pub use form::TextForm;
pub use model::*;

#[cfg(test)]
mod tests;
