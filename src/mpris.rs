//! MPRIS service so desktop media keys and `playerctl` can drive the player.
//!
//! The D-Bus side runs on its own thread with an `async-io` executor. The UI
//! thread writes now-playing state into [`MprisHandle`]; changes are announced
//! to the bus as `PropertiesChanged` on the next tick.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::audio::TransportState;
use crate::catalog::Track;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.nidra";
const TICK: Duration = Duration::from_millis(250);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: TransportState,
    title: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<ObjectPath<'static>>,
    /// Bumped for every loaded chant so track ids stay unique.
    generation: u64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: TransportState) {
        if let Ok(mut s) = self.state.lock() {
            if s.playback == playback {
                return;
            }
            s.playback = playback;
        }
        let _ = self.notify.send(());
    }

    /// Publish the now-playing chant, or clear it with `None`.
    pub fn set_track(&self, track: Option<&Track>, duration_ms: u64) {
        if let Ok(mut s) = self.state.lock() {
            match track {
                Some(track) => {
                    s.generation += 1;
                    s.title = Some(track.name.clone());
                    s.url = Some(track.url.clone());
                    s.art_url = track.image.clone();
                    s.length_micros = (duration_ms > 0).then(|| duration_ms as i64 * 1000);
                    s.track_id = ObjectPath::try_from(format!(
                        "{OBJECT_PATH}/track/{}",
                        s.generation
                    ))
                    .ok();
                }
                None => {
                    s.title = None;
                    s.url = None;
                    s.art_url = None;
                    s.length_micros = None;
                    s.track_id = None;
                }
            }
        }
        let _ = self.notify.send(());
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "nidra"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["http".to_string(), "https".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned<'a>(value: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(value.into()).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            TransportState::Playing => "Playing",
            TransportState::Paused => "Paused",
            TransportState::Idle | TransportState::Loading | TransportState::Stopped => "Stopped",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = s.track_id.clone().and_then(owned) {
            map.insert("mpris:trackid".to_string(), id);
        }
        let fields = [
            ("xesam:title", &s.title),
            ("xesam:url", &s.url),
            ("mpris:artUrl", &s.art_url),
        ];
        for (key, value) in fields {
            if let Some(v) = value.clone().and_then(owned) {
                map.insert(key.to_string(), v);
            }
        }
        if let Some(len) = s.length_micros.and_then(owned) {
            map.insert("mpris:length".to_string(), len);
        }
        map
    }
}

async fn announce_changes(player: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let emitter = player.signal_emitter();
    let iface = player.get().await;
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    log::info!("MPRIS service registered as {BUS_NAME}");

    loop {
        Timer::after(TICK).await;
        let mut changed = false;
        loop {
            match notify.try_recv() {
                Ok(()) => changed = true,
                Err(mpsc::TryRecvError::Empty) => break,
                // UI gone; the process is exiting.
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if changed {
            if let Err(e) = announce_changes(&player).await {
                log::debug!("MPRIS: failed to emit PropertiesChanged: {e}");
            }
        }
    }
}

/// Start the MPRIS thread. Failing to reach the session bus only disables
/// media-key support.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("nidra-mpris".into())
        .spawn(move || {
            if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
                log::warn!("MPRIS unavailable: {e}");
            }
        });
    if let Err(e) = spawned {
        log::warn!("MPRIS thread failed to start: {e}");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}
