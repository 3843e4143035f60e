use super::transport::{TransportView, format_time};
use super::*;
use crate::audio::{AudioCmd, PlaybackEvent, PlaybackStatus, TransportState};
use crate::catalog::{Language, Track};
use crate::config::{Settings, SignInPolicy, TimeField};
use crate::error::Error;
use std::time::{Duration, Instant};

fn t(name: &str) -> Track {
    Track {
        name: name.into(),
        url: format!("https://x/{}.mp3", name.to_ascii_lowercase().replace(' ', "-")),
        image: None,
    }
}

fn app_with(tracks: Vec<Track>) -> App {
    let mut settings = Settings::default();
    settings.ui.donation_prompt = false;
    let mut app = App::new(&settings, false);
    app.change_language(Language::En);
    app.on_catalog(Language::En, Ok(tracks));
    app
}

fn status(name: &str, position_ms: u64, duration_ms: u64) -> PlaybackEvent {
    PlaybackEvent::Status(PlaybackStatus {
        track: name.into(),
        position_ms,
        duration_ms,
        is_playing: true,
        did_finish: false,
    })
}

/// Feed the event sequence the controller emits for a successful load.
fn start(view: &mut TransportView, track: &Track, duration_ms: u64) {
    for event in [
        PlaybackEvent::State {
            track: Some(track.name.clone()),
            state: TransportState::Loading,
        },
        PlaybackEvent::Loaded {
            track: track.clone(),
            duration_ms,
        },
        PlaybackEvent::State {
            track: Some(track.name.clone()),
            state: TransportState::Playing,
        },
        status(&track.name, 0, duration_ms),
    ] {
        view.apply(&event);
    }
}

#[test]
fn next_prev_wrap_around_catalog() {
    let mut app = app_with(vec![t("Om Chant"), t("Peace Chant"), t("Gayatri")]);
    assert_eq!(app.selected, 0);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    assert_eq!(app.selected_track().map(|t| t.name.as_str()), Some("Peace Chant"));
}

#[test]
fn catalog_failure_keeps_previous_list_and_alerts() {
    let mut app = app_with(vec![t("Om Chant")]);
    app.change_language(Language::Hi);
    app.on_catalog(
        Language::Hi,
        Err(Error::Network("Error fetching music. Please try again.".into())),
    );

    assert_eq!(app.catalog.len(), 1);
    assert_eq!(app.catalog.language(), Language::En);
    let alert = app.alert().unwrap();
    assert_eq!(alert.title, "Error");
    assert_eq!(alert.message, "Error fetching music. Please try again.");
    assert!(app.dismiss_alert());
    assert!(!app.dismiss_alert());
}

#[test]
fn superseded_catalog_response_is_dropped() {
    let mut app = app_with(vec![]);
    app.change_language(Language::En);
    app.change_language(Language::Hi);
    app.on_catalog(Language::En, Ok(vec![t("Om Chant")]));
    assert!(app.catalog.is_empty());
    assert!(app.alert().is_none());

    app.on_catalog(Language::Hi, Ok(vec![t("Shanti Path")]));
    assert_eq!(app.catalog.len(), 1);
}

#[test]
fn selecting_active_chant_toggles_and_other_chant_needs_sign_in() {
    let mut app = app_with(vec![t("Om Chant"), t("Peace Chant")]);

    let cmd = app.select_current();
    assert!(matches!(cmd, Some(AudioCmd::Load(ref track)) if track.name == "Om Chant"));
    app.on_playback(&PlaybackEvent::Loaded {
        track: t("Om Chant"),
        duration_ms: 60_000,
    });
    assert_eq!(app.active_track(), Some("Om Chant"));

    assert!(matches!(app.select_current(), Some(AudioCmd::TogglePause)));

    app.next();
    assert!(app.select_current().is_none());
    assert_eq!(app.screen, Screen::SignIn);
}

#[test]
fn never_policy_allows_switching_without_sign_in() {
    let mut settings = Settings::default();
    settings.playback.sign_in_policy = SignInPolicy::Never;
    let mut app = App::new(&settings, false);
    app.change_language(Language::En);
    app.on_catalog(Language::En, Ok(vec![t("Om Chant"), t("Peace Chant")]));

    app.select_current();
    app.on_playback(&PlaybackEvent::Loaded {
        track: t("Om Chant"),
        duration_ms: 1_000,
    });
    app.next();
    assert!(matches!(app.select_current(), Some(AudioCmd::Load(_))));
    assert_eq!(app.screen, Screen::Home);
}

#[test]
fn finishing_while_signed_out_navigates_to_sign_in() {
    let mut app = app_with(vec![t("Om Chant")]);
    app.select_current();
    app.on_playback(&PlaybackEvent::Loaded {
        track: t("Om Chant"),
        duration_ms: 1_000,
    });
    app.on_playback(&PlaybackEvent::Finished { track: t("Om Chant") });
    assert_eq!(app.screen, Screen::SignIn);
    assert_eq!(app.active_track(), None);
}

#[test]
fn load_failure_alerts_with_playback_error() {
    let mut app = app_with(vec![t("Om Chant")]);
    app.select_current();
    app.on_playback(&PlaybackEvent::LoadFailed {
        track: t("Om Chant"),
        reason: "404 Not Found".into(),
    });
    assert_eq!(app.alert().unwrap().title, "Playback error");
    assert_eq!(app.active_track(), None);
}

#[test]
fn donation_without_amount_stays_on_donation_view() {
    let mut app = app_with(vec![]);
    app.accept_donation_prompt();
    assert_eq!(app.screen, Screen::Donation);

    app.confirm_donation();
    assert_eq!(app.screen, Screen::Donation);
    assert_eq!(
        app.alert().unwrap().message,
        "Please select or enter an amount to donate."
    );

    app.dismiss_alert();
    app.donation.select_preset(1);
    app.confirm_donation();
    assert_eq!(app.screen, Screen::Upload);
    assert_eq!(app.upload_amount(), "500rs");
}

#[test]
fn upload_without_screenshot_alerts_and_sends_nothing() {
    let mut app = app_with(vec![]);
    app.navigate(Screen::Upload);
    assert!(app.upload_request().is_none());
    assert_eq!(app.alert().unwrap().title, "No image selected");
}

#[test]
fn upload_result_is_shown_verbatim() {
    let mut app = app_with(vec![]);
    app.navigate(Screen::Upload);
    app.on_uploaded(Err(Error::Network(
        "Failed to upload payment screenshot".into(),
    )));
    assert_eq!(app.alert().unwrap().title, "Upload Failed");
    assert_eq!(app.screen, Screen::Upload);

    app.on_uploaded(Ok("Upload Successful".into()));
    assert_eq!(app.alert().unwrap().message, "Upload Successful");
    assert_eq!(app.screen, Screen::Home);
}

#[test]
fn sign_in_form_keeps_password_verbatim() {
    let mut app = app_with(vec![]);
    for c in " a@b.c ".chars() {
        app.sign_in.push(c);
    }
    app.sign_in.focus_next();
    for c in "pw ".chars() {
        app.sign_in.push(c);
    }
    assert_eq!(
        app.sign_in_request(),
        ("a@b.c".to_string(), "pw ".to_string())
    );

    app.on_signed_in();
    assert!(app.signed_in());
    assert_eq!(app.sign_in.value(SIGN_IN_EMAIL), "");
    assert_eq!(app.screen, Screen::Home);
}

#[test]
fn status_follows_active_chant_only() {
    let mut view = TransportView::default();
    start(&mut view, &t("Om Chant"), 60_000);
    view.apply(&status("Om Chant", 3_000, 60_000));
    assert_eq!(view.position_ms(), 3_000);

    view.apply(&status("Peace Chant", 9_000, 90_000));
    assert_eq!(view.position_ms(), 3_000);
    assert_eq!(view.time_text(&[TimeField::Total], " / "), "1:00");
    assert_eq!(view.state(), TransportState::Playing);
}

#[test]
fn scrub_holds_position_until_seek_is_acknowledged() {
    let mut view = TransportView::default();
    start(&mut view, &t("Om Chant"), 60_000);
    view.apply(&status("Om Chant", 10_000, 60_000));

    let t0 = Instant::now();
    assert!(matches!(view.scrub(5_000, t0), Some(AudioCmd::BeginSeek)));
    assert!(view.seek_in_flight());
    assert_eq!(view.position_ms(), 15_000);

    view.apply(&status("Om Chant", 11_000, 60_000));
    assert_eq!(view.position_ms(), 15_000);

    assert!(view.scrub(5_000, t0 + Duration::from_millis(100)).is_none());
    assert_eq!(view.position_ms(), 20_000);

    let delay = Duration::from_millis(600);
    assert!(view.commit_if_idle(t0 + Duration::from_millis(300), delay).is_none());
    assert!(matches!(
        view.commit_if_idle(t0 + Duration::from_millis(800), delay),
        Some(AudioCmd::SeekTo(20_000))
    ));
    assert!(view.commit().is_none());

    // Still held until the controller confirms.
    view.apply(&status("Om Chant", 11_500, 60_000));
    assert!(view.seek_in_flight());
    assert_eq!(view.position_ms(), 20_000);

    view.apply(&PlaybackEvent::SeekCompleted {
        track: "Om Chant".into(),
        position_ms: 20_000,
    });
    assert!(!view.seek_in_flight());
    view.apply(&status("Om Chant", 21_000, 60_000));
    assert_eq!(view.position_ms(), 21_000);
}

#[test]
fn earlier_ack_does_not_end_new_gesture() {
    let mut view = TransportView::default();
    start(&mut view, &t("Om Chant"), 60_000);

    let now = Instant::now();
    view.scrub(10_000, now);
    assert!(matches!(view.commit(), Some(AudioCmd::SeekTo(10_000))));
    assert!(matches!(view.scrub(5_000, now), Some(AudioCmd::BeginSeek)));

    view.apply(&PlaybackEvent::SeekCompleted {
        track: "Om Chant".into(),
        position_ms: 10_000,
    });
    assert!(view.seek_in_flight());
    assert_eq!(view.position_ms(), 15_000);
}

#[test]
fn scrub_clamps_to_chant_length_and_needs_a_chant() {
    let mut view = TransportView::default();
    assert!(view.scrub(5_000, Instant::now()).is_none());

    start(&mut view, &t("Om Chant"), 60_000);
    view.scrub(-90_000, Instant::now());
    assert_eq!(view.position_ms(), 0);
    view.scrub(600_000, Instant::now());
    assert_eq!(view.position_ms(), 60_000);
    assert_eq!(view.ratio(), 1.0);
}

#[test]
fn release_resets_the_panel() {
    let mut view = TransportView::default();
    start(&mut view, &t("Om Chant"), 60_000);
    view.scrub(1_000, Instant::now());
    view.apply(&PlaybackEvent::Released { track: t("Om Chant") });
    view.apply(&PlaybackEvent::State {
        track: Some("Om Chant".into()),
        state: TransportState::Idle,
    });
    assert_eq!(view.track(), None);
    assert!(!view.seek_in_flight());
    assert_eq!(view.state(), TransportState::Idle);
    assert_eq!(view.position_ms(), 0);
}

#[test]
fn time_text_uses_configured_fields() {
    let mut view = TransportView::default();
    start(&mut view, &t("Om Chant"), 200_000);
    view.apply(&status("Om Chant", 65_000, 200_000));

    assert_eq!(
        view.time_text(&[TimeField::Elapsed, TimeField::Total], " / "),
        "1:05 / 3:20"
    );
    assert_eq!(view.time_text(&[TimeField::Remaining], " "), "-2:15");
    assert_eq!(format_time(0), "0:00");
    assert_eq!(format_time(3_599_999), "59:59");
}
