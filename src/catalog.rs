//! Chant catalog: the language-keyed list of tracks fetched from the server.
//!
//! The catalog is never merged or cached; every successful fetch replaces the
//! whole list, and a failed fetch leaves the previous list in place.

mod model;

pub use model::*;
