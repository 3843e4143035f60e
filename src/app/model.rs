//! Application model: the active view, the chant list and everything the
//! views edit. Pure state; the runtime performs the I/O it asks for.

use std::path::PathBuf;

use crate::audio::{AudioCmd, PlaybackEvent};
use crate::binder::{Selection, TrackBinder};
use crate::catalog::{Catalog, Language, Track};
use crate::config::Settings;
use crate::donation::{DonationForm, UploadForm};
use crate::error::{Error, Result};
use crate::remote::SignUpRequest;

use super::form::TextForm;
use super::transport::TransportView;

pub const SIGN_IN_EMAIL: usize = 0;
pub const SIGN_IN_PASSWORD: usize = 1;

pub const SIGN_UP_EMAIL: usize = 0;
pub const SIGN_UP_NAME: usize = 1;
pub const SIGN_UP_CONTACT: usize = 2;
pub const SIGN_UP_PASSWORD: usize = 3;

pub const UPLOAD_EMAIL: usize = 0;
pub const UPLOAD_SCREENSHOT: usize = 1;

/// Which view is on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    SignIn,
    SignUp,
    Donation,
    Upload,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => " chants ",
            Self::SignIn => " sign in ",
            Self::SignUp => " sign up ",
            Self::Donation => " donate ",
            Self::Upload => " upload payment ",
        }
    }
}

/// Modal message; blocks input until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

pub struct App {
    pub screen: Screen,
    pub catalog: Catalog,
    pub selected: usize,
    pub transport: TransportView,
    binder: TrackBinder,
    signed_in: bool,
    alert: Option<Alert>,
    /// Welcome prompt asking for a donation, shown once at startup.
    pub donation_prompt: bool,
    pub sign_in: TextForm,
    pub sign_up: TextForm,
    pub donation: DonationForm,
    pub upload: TextForm,
    upload_amount: String,
    /// A form request is in flight; submitting again is ignored.
    pub busy: bool,
}

impl App {
    pub fn new(settings: &Settings, signed_in: bool) -> Self {
        Self {
            screen: Screen::Home,
            catalog: Catalog::new(settings.ui.default_language),
            selected: 0,
            transport: TransportView::default(),
            binder: TrackBinder::new(settings.playback.sign_in_policy),
            signed_in,
            alert: None,
            donation_prompt: settings.ui.donation_prompt,
            sign_in: TextForm::new(&[("Email", false), ("Password", true)]),
            sign_up: TextForm::new(&[
                ("Email", false),
                ("Name", false),
                ("Contact", false),
                ("Password", true),
            ]),
            donation: DonationForm::new(settings.donation.preset_amounts.clone()),
            upload: TextForm::new(&[("Email", false), ("Screenshot path", false)]),
            upload_amount: String::new(),
            busy: false,
        }
    }

    pub fn signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn active_track(&self) -> Option<&str> {
        self.binder.active()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn show_error(&mut self, err: &Error) {
        self.show_alert(err.alert_title(), err.to_string());
    }

    /// Returns whether an alert was open.
    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn navigate(&mut self, screen: Screen) {
        if self.screen != screen {
            log::debug!("navigate {:?} -> {:?}", self.screen, screen);
        }
        self.screen = screen;
    }

    pub fn upload_amount(&self) -> &str {
        &self.upload_amount
    }

    // Chant list

    pub fn selected_track(&self) -> Option<&Track> {
        self.catalog.get(self.selected)
    }

    pub fn next(&mut self) {
        let len = self.catalog.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn prev(&mut self) {
        let len = self.catalog.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Ask for the catalog in `language`. The caller fetches the returned
    /// language; the list and cursor stay put until the response lands.
    pub fn change_language(&mut self, language: Language) -> Language {
        self.catalog.request(language);
        language
    }

    pub fn on_catalog(&mut self, language: Language, result: Result<Vec<Track>>) {
        match self.catalog.apply(language, result) {
            Ok(true) => {
                // Keep the cursor on the playing chant when it is still listed.
                self.selected = self
                    .binder
                    .active()
                    .and_then(|name| self.catalog.position_of(name))
                    .unwrap_or(0);
            }
            Ok(false) => log::debug!("dropping stale catalog for {:?}", language.code()),
            Err(e) => self.show_error(&e),
        }
    }

    /// Select the chant under the cursor. Returns the command for the audio
    /// thread, or `None` when the selection was redirected to sign-in.
    pub fn select_current(&mut self) -> Option<AudioCmd> {
        let track = self.selected_track()?.clone();
        let selection = self.binder.select(&track, self.signed_in);
        if selection == Selection::SignInRequired {
            self.navigate(Screen::SignIn);
        }
        selection.command()
    }

    pub fn on_playback(&mut self, event: &PlaybackEvent) {
        self.binder.observe(event);
        self.transport.apply(event);

        match event {
            PlaybackEvent::LoadFailed { track, reason } => {
                log::warn!("cannot play {:?}: {reason}", track.name);
                self.show_error(&Error::resource(&track.url, reason));
            }
            PlaybackEvent::Finished { track } => {
                log::info!("{:?} finished", track.name);
                if self.binder.sign_in_after_finish(self.signed_in) {
                    self.navigate(Screen::SignIn);
                }
            }
            _ => {}
        }
    }

    // Session

    /// Email and password from the sign-in form.
    pub fn sign_in_request(&self) -> (String, String) {
        (
            self.sign_in.value(SIGN_IN_EMAIL).to_string(),
            self.sign_in.value(SIGN_IN_PASSWORD).to_string(),
        )
    }

    pub fn on_signed_in(&mut self) {
        self.signed_in = true;
        self.sign_in.clear();
        self.show_alert("Success", "Sign-in successful");
        self.navigate(Screen::Home);
    }

    pub fn on_signed_out(&mut self) {
        self.signed_in = false;
        self.show_alert("Signed out", "Your session was cleared.");
    }

    pub fn sign_up_request(&self) -> SignUpRequest {
        SignUpRequest {
            email: self.sign_up.value(SIGN_UP_EMAIL).to_string(),
            name: self.sign_up.value(SIGN_UP_NAME).to_string(),
            contact: self.sign_up.value(SIGN_UP_CONTACT).to_string(),
            password: self.sign_up.value(SIGN_UP_PASSWORD).to_string(),
        }
    }

    pub fn on_signed_up(&mut self) {
        self.sign_up.clear();
        self.navigate(Screen::SignIn);
    }

    // Donation

    pub fn accept_donation_prompt(&mut self) {
        self.donation_prompt = false;
        self.navigate(Screen::Donation);
    }

    pub fn decline_donation_prompt(&mut self) {
        self.donation_prompt = false;
    }

    /// Validate the amount and move on to the upload view.
    pub fn confirm_donation(&mut self) {
        match self.donation.amount() {
            Ok(amount) => {
                log::info!("donation amount {amount}");
                self.upload_amount = amount;
                self.upload.clear();
                self.navigate(Screen::Upload);
            }
            Err(e) => self.show_error(&e),
        }
    }

    /// Email and screenshot to upload, or `None` after alerting.
    pub fn upload_request(&mut self) -> Option<(String, PathBuf)> {
        let form = UploadForm {
            email: self.upload.value(UPLOAD_EMAIL).to_string(),
            screenshot: self.upload.value(UPLOAD_SCREENSHOT).to_string(),
            ..UploadForm::new(self.upload_amount.clone())
        };
        match form.screenshot_path() {
            Ok(path) => {
                log::info!("uploading payment screenshot for {}", form.amount);
                Some((form.email, path))
            }
            Err(e) => {
                self.show_error(&e);
                None
            }
        }
    }

    pub fn on_uploaded(&mut self, result: Result<String>) {
        match result {
            Ok(message) => {
                self.show_alert("Upload Successful", message);
                self.upload.clear();
                self.navigate(Screen::Home);
            }
            Err(e) => self.show_alert("Upload Failed", e.to_string()),
        }
    }
}
