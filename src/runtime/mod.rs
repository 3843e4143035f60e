use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{AudioPlayer, PlaybackEvent};
use crate::mpris::ControlCmd;
use crate::remote::ApiClient;

mod event_loop;
mod logging;
mod mpris_sync;
mod network;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.logging);
    log::info!("nidra starting, server {}", settings.server.url);

    let session = startup::token_store(&settings);
    let mut app = App::new(&settings, session.is_signed_in());

    let (playback_tx, playback_rx) = mpsc::channel::<PlaybackEvent>();
    let audio_player = AudioPlayer::new(&settings.playback, playback_tx)?;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let (net_tx, net_rx) = mpsc::channel::<network::NetEvent>();
    let network = network::Network::new(ApiClient::new(&settings.server), net_tx);
    startup::request_initial_catalog(&mut app, &network);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let services = event_loop::Services {
            settings: &settings,
            audio_player: &audio_player,
            mpris: &mpris,
            network: &network,
            session: &session,
        };
        let inbox = event_loop::Inbox {
            playback: playback_rx,
            control: control_rx,
            network: net_rx,
        };
        event_loop::run(&mut terminal, &services, &mut app, &inbox)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        log::error!("event loop failed: {e}");
    }
    run_result
}
