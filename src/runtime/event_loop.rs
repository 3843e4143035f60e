use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Screen};
use crate::audio::{AudioCmd, AudioPlayer, PlaybackEvent};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::session::TokenStore;
use crate::ui;

use super::mpris_sync::sync_event;
use super::network::{NetEvent, Network};

/// Long-lived collaborators driven by the event loop.
pub struct Services<'a> {
    pub settings: &'a config::Settings,
    pub audio_player: &'a AudioPlayer,
    pub mpris: &'a MprisHandle,
    pub network: &'a Network,
    pub session: &'a TokenStore,
}

impl Services<'_> {
    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.audio_player.send(cmd) {
            log::error!("audio thread is gone: {e}");
        }
    }

    /// Fade out and stop the audio thread. Always returns `true` (quit).
    fn quit(&self) -> bool {
        log::info!("quitting");
        self.audio_player.quit_softly(Duration::from_millis(
            self.settings.playback.quit_fade_out_ms,
        ));
        true
    }
}

/// Everything that reports back to the UI thread.
pub struct Inbox {
    pub playback: Receiver<PlaybackEvent>,
    pub control: Receiver<ControlCmd>,
    pub network: Receiver<NetEvent>,
}

/// Main terminal event loop: drains controller, network and MPRIS channels,
/// draws, then handles one key. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    services: &Services,
    app: &mut App,
    inbox: &Inbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let seek_commit = Duration::from_millis(services.settings.controls.seek_commit_ms);

    loop {
        while let Ok(event) = inbox.playback.try_recv() {
            sync_event(services.mpris, &event);
            app.on_playback(&event);
        }
        while let Ok(event) = inbox.network.try_recv() {
            handle_net_event(event, services, app);
        }
        if let Some(cmd) = app.transport.commit_if_idle(Instant::now(), seek_commit) {
            services.send(cmd);
        }

        terminal.draw(|f| ui::draw(f, app, &services.settings.ui, &services.settings.controls))?;

        while let Ok(cmd) = inbox.control.try_recv() {
            if handle_control_cmd(cmd, services) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, services, app) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_control_cmd(cmd: ControlCmd, services: &Services) -> bool {
    let audio_cmd = match cmd {
        ControlCmd::Quit => return services.quit(),
        ControlCmd::Play => AudioCmd::Play,
        ControlCmd::Pause => AudioCmd::Pause,
        ControlCmd::PlayPause => AudioCmd::TogglePause,
        ControlCmd::Stop => AudioCmd::Stop,
    };
    services.send(audio_cmd);
    false
}

fn handle_net_event(event: NetEvent, services: &Services, app: &mut App) {
    match event {
        NetEvent::Catalog { language, result } => app.on_catalog(language, result),
        NetEvent::SignIn(result) => {
            app.busy = false;
            match result.and_then(|token| services.session.store(&token)) {
                Ok(()) => {
                    log::info!("signed in");
                    app.on_signed_in();
                }
                Err(e) => app.show_error(&e),
            }
        }
        NetEvent::SignUp(result) => {
            app.busy = false;
            match result {
                Ok(message) => {
                    log::info!("{message}");
                    app.on_signed_up();
                }
                Err(e) => app.show_error(&e),
            }
        }
        NetEvent::Upload(result) => {
            app.busy = false;
            app.on_uploaded(result);
        }
    }
}

/// Returns `true` when the app should exit.
fn handle_key_event(key: KeyEvent, services: &Services, app: &mut App) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return services.quit();
    }

    // Modals swallow everything until dismissed.
    if app.alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return false;
    }
    if app.donation_prompt {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.accept_donation_prompt(),
            KeyCode::Char('n') | KeyCode::Esc => app.decline_donation_prompt(),
            _ => {}
        }
        return false;
    }

    match app.screen {
        Screen::Home => return handle_home_key(key, services, app),
        Screen::SignIn | Screen::SignUp | Screen::Upload => handle_form_key(key, services, app),
        Screen::Donation => handle_donation_key(key, app),
    }
    false
}

fn handle_home_key(key: KeyEvent, services: &Services, app: &mut App) -> bool {
    let step = services.settings.controls.scrub_step_ms.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => return services.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            // Enter confirms a pending scrub before it selects anything.
            if let Some(cmd) = app.transport.commit() {
                services.send(cmd);
            } else if let Some(cmd) = app.select_current() {
                services.send(cmd);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => services.send(AudioCmd::TogglePause),
        KeyCode::Char('s') => services.send(AudioCmd::Stop),
        KeyCode::Char('L') | KeyCode::Right => {
            if let Some(cmd) = app.transport.scrub(step, Instant::now()) {
                services.send(cmd);
            }
        }
        KeyCode::Char('H') | KeyCode::Left => {
            if let Some(cmd) = app.transport.scrub(-step, Instant::now()) {
                services.send(cmd);
            }
        }
        KeyCode::Char(']') => {
            let language = app.change_language(app.catalog.requested().next());
            services.network.fetch_catalog(language);
        }
        KeyCode::Char('[') => {
            let language = app.change_language(app.catalog.requested().prev());
            services.network.fetch_catalog(language);
        }
        KeyCode::Char('r') => {
            let language = app.change_language(app.catalog.requested());
            services.network.fetch_catalog(language);
        }
        KeyCode::Char('i') => app.navigate(Screen::SignIn),
        KeyCode::Char('u') => app.navigate(Screen::SignUp),
        KeyCode::Char('d') => app.navigate(Screen::Donation),
        KeyCode::Char('o') => match services.session.clear() {
            Ok(()) => app.on_signed_out(),
            Err(e) => app.show_error(&e),
        },
        _ => {}
    }
    false
}

fn handle_form_key(key: KeyEvent, services: &Services, app: &mut App) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (app.screen, key.code) {
        (Screen::SignIn, KeyCode::Char('u')) if ctrl => return app.navigate(Screen::SignUp),
        (Screen::SignUp, KeyCode::Char('l')) if ctrl => return app.navigate(Screen::SignIn),
        _ => {}
    }

    match key.code {
        KeyCode::Esc => app.navigate(Screen::Home),
        KeyCode::Enter => submit_form(services, app),
        code => {
            let form = match app.screen {
                Screen::SignIn => &mut app.sign_in,
                Screen::SignUp => &mut app.sign_up,
                _ => &mut app.upload,
            };
            match code {
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.pop(),
                KeyCode::Char(c) if !ctrl => form.push(c),
                _ => {}
            }
        }
    }
}

fn submit_form(services: &Services, app: &mut App) {
    if app.busy {
        return;
    }
    match app.screen {
        Screen::SignIn => {
            let (email, password) = app.sign_in_request();
            app.busy = true;
            services.network.sign_in(email, password);
        }
        Screen::SignUp => {
            let request = app.sign_up_request();
            app.busy = true;
            services.network.sign_up(request);
        }
        Screen::Upload => {
            if let Some((email, screenshot)) = app.upload_request() {
                app.busy = true;
                services.network.upload_payment(email, screenshot);
            }
        }
        Screen::Home | Screen::Donation => {}
    }
}

fn handle_donation_key(key: KeyEvent, app: &mut App) {
    let count = app.donation.presets().len();
    match key.code {
        KeyCode::Esc => app.navigate(Screen::Home),
        KeyCode::Enter => app.confirm_donation(),
        KeyCode::Right | KeyCode::Tab if count > 0 => {
            let next = app.donation.selected().map_or(0, |i| (i + 1) % count);
            app.donation.select_preset(next);
        }
        KeyCode::Left | KeyCode::BackTab if count > 0 => {
            let prev = app
                .donation
                .selected()
                .map_or(count - 1, |i| (i + count - 1) % count);
            app.donation.select_preset(prev);
        }
        KeyCode::Backspace => app.donation.pop_custom_char(),
        KeyCode::Char(c) => app.donation.push_custom_char(c),
        _ => {}
    }
}
