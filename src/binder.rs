//! Maps chant-list selections onto playback commands.
//!
//! Selecting the chant that is already active toggles it; selecting any other
//! chant replaces it (the controller releases the old resource before loading
//! the new one). The sign-in policy can turn a selection into a redirect.

use crate::audio::{AudioCmd, PlaybackEvent};
use crate::catalog::Track;
use crate::config::SignInPolicy;

/// What a selection turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Same chant as the active one: play/pause it in place.
    Toggle,
    /// A different chant: replace the active one.
    Load(Track),
    /// The policy requires a stored token first.
    SignInRequired,
}

impl Selection {
    /// Command for the audio thread, if any.
    pub fn command(&self) -> Option<AudioCmd> {
        match self {
            Self::Toggle => Some(AudioCmd::TogglePause),
            Self::Load(track) => Some(AudioCmd::Load(track.clone())),
            Self::SignInRequired => None,
        }
    }
}

#[derive(Debug)]
pub struct TrackBinder {
    policy: SignInPolicy,
    /// Chant last handed to the controller and not yet released.
    active: Option<Track>,
    has_played: bool,
}

impl TrackBinder {
    pub fn new(policy: SignInPolicy) -> Self {
        Self {
            policy,
            active: None,
            has_played: false,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_ref().map(|t| t.name.as_str())
    }

    fn is_active(&self, track: &Track) -> bool {
        self.active.as_ref().is_some_and(|a| a.same_identity(track))
    }

    pub fn select(&mut self, track: &Track, signed_in: bool) -> Selection {
        if self.is_active(track) {
            return Selection::Toggle;
        }

        let gated = match self.policy {
            SignInPolicy::Never => false,
            SignInPolicy::AfterFirstPlay => self.has_played && !signed_in,
            SignInPolicy::Always => !signed_in,
        };
        if gated {
            log::info!("sign-in required before playing {:?}", track.name);
            return Selection::SignInRequired;
        }

        self.active = Some(track.clone());
        Selection::Load(track.clone())
    }

    /// Whether finishing a chant should send the user to sign in.
    pub fn sign_in_after_finish(&self, signed_in: bool) -> bool {
        self.policy != SignInPolicy::Never && !signed_in
    }

    /// Keep the active chant in step with what the controller reports.
    pub fn observe(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::Loaded { track, .. } => {
                self.active = Some(track.clone());
                self.has_played = true;
            }
            PlaybackEvent::LoadFailed { track, .. }
            | PlaybackEvent::Finished { track }
            | PlaybackEvent::Released { track } => {
                if self.is_active(track) {
                    self.active = None;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chant(name: &str) -> Track {
        Track {
            name: name.into(),
            url: format!("https://x/{name}.mp3"),
            image: None,
        }
    }

    fn loaded(name: &str) -> PlaybackEvent {
        PlaybackEvent::Loaded {
            track: chant(name),
            duration_ms: 1_000,
        }
    }

    #[test]
    fn same_chant_toggles_instead_of_reloading() {
        let mut b = TrackBinder::new(SignInPolicy::Never);
        assert_eq!(b.select(&chant("om"), false), Selection::Load(chant("om")));
        b.observe(&loaded("om"));
        assert_eq!(b.select(&chant("om"), false), Selection::Toggle);
        assert!(matches!(
            Selection::Toggle.command(),
            Some(AudioCmd::TogglePause)
        ));
    }

    #[test]
    fn different_chant_replaces_active() {
        let mut b = TrackBinder::new(SignInPolicy::Never);
        b.select(&chant("om"), false);
        b.observe(&loaded("om"));
        assert_eq!(b.select(&chant("peace"), false), Selection::Load(chant("peace")));
        assert_eq!(b.active(), Some("peace"));

        // The late release of the old chant must not clear the new one.
        b.observe(&PlaybackEvent::Released { track: chant("om") });
        assert_eq!(b.active(), Some("peace"));
    }

    #[test]
    fn after_first_play_policy_gates_second_chant() {
        let mut b = TrackBinder::new(SignInPolicy::AfterFirstPlay);
        assert!(matches!(b.select(&chant("om"), false), Selection::Load(_)));
        b.observe(&loaded("om"));

        // Pausing the playing chant is still allowed.
        assert_eq!(b.select(&chant("om"), false), Selection::Toggle);
        assert_eq!(b.select(&chant("peace"), false), Selection::SignInRequired);
        assert!(Selection::SignInRequired.command().is_none());
        assert!(matches!(b.select(&chant("peace"), true), Selection::Load(_)));
    }

    #[test]
    fn failed_first_load_does_not_count_as_played() {
        let mut b = TrackBinder::new(SignInPolicy::AfterFirstPlay);
        b.select(&chant("om"), false);
        b.observe(&PlaybackEvent::LoadFailed {
            track: chant("om"),
            reason: "404".into(),
        });
        assert_eq!(b.active(), None);
        assert!(matches!(b.select(&chant("peace"), false), Selection::Load(_)));
    }

    #[test]
    fn always_policy_requires_token_for_any_selection() {
        let mut b = TrackBinder::new(SignInPolicy::Always);
        assert_eq!(b.select(&chant("om"), false), Selection::SignInRequired);
        assert!(matches!(b.select(&chant("om"), true), Selection::Load(_)));
    }

    #[test]
    fn finish_clears_active_and_may_prompt_sign_in() {
        let mut b = TrackBinder::new(SignInPolicy::AfterFirstPlay);
        b.select(&chant("om"), false);
        b.observe(&loaded("om"));
        b.observe(&PlaybackEvent::Finished { track: chant("om") });
        assert_eq!(b.active(), None);
        assert!(b.sign_in_after_finish(false));
        assert!(!b.sign_in_after_finish(true));
        assert!(!TrackBinder::new(SignInPolicy::Never).sign_in_after_finish(false));
    }
}
