//! Single-resource audio playback.
//!
//! `PlaybackController` owns at most one loaded chant and turns transport
//! commands into backend calls and [`PlaybackEvent`]s. [`AudioPlayer`] runs a
//! controller on its own thread and is what the rest of the app talks to.

mod backend;
mod controller;
mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;
