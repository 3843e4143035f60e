use crate::audio::PlaybackEvent;
use crate::mpris::MprisHandle;

/// Mirror one controller event into the MPRIS state.
pub fn sync_event(mpris: &MprisHandle, event: &PlaybackEvent) {
    match event {
        PlaybackEvent::State { state, .. } => mpris.set_playback(*state),
        PlaybackEvent::Loaded { track, duration_ms } => mpris.set_track(Some(track), *duration_ms),
        PlaybackEvent::LoadFailed { .. }
        | PlaybackEvent::Finished { .. }
        | PlaybackEvent::Released { .. } => mpris.set_track(None, 0),
        PlaybackEvent::Status(_) | PlaybackEvent::SeekCompleted { .. } => {}
    }
}
