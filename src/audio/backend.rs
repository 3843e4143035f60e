//! Seam between the controller and the platform decoder.

use std::time::Duration;

use crate::error::Result;

/// One loaded, decodable audio unit. Dropping it frees the resource.
pub trait Sound {
    fn play(&mut self);
    fn pause(&mut self);
    /// Halt output. The sound stays allocated until dropped.
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Duration;
    /// Total length, when the decoder knows it.
    fn duration(&self) -> Option<Duration>;
    /// The decoder ran out of samples.
    fn is_finished(&self) -> bool;
}

/// Turns a locator into a paused [`Sound`].
pub trait AudioBackend {
    type Sound: Sound;

    fn open(&mut self, locator: &str) -> Result<Self::Sound>;
}
