use anyhow::Result;
use log::{error, info, warn};
use notify::{RecursiveMode, Watcher};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::{
    io::{BufRead, BufReader, Write},
    os::unix::net::{UnixListener, UnixStream},
    sync::{Arc, Mutex, mpsc},
    thread,
    time::Duration,
};

use super::pipeline::run_pipeline;
use super::runtime::socket_path;
use crate::config::{DaemonConfigState, Profile};

pub fn run_daemon() -> Result<()> {
    // socket
    let sock = socket_path()?;
    if sock.exists() {
        let _ = std::fs::remove_file(&sock);
    }
    let listener = UnixListener::bind(&sock)?;
    info!("daemon: listening on {}", sock.display());

    // state
    let mut state = DaemonState::new()?;
    info!("daemon: active profile '{}'", state.cfg.active_name);

    let (tx_req, rx_req) = mpsc::channel::<IpcMsg>();

    // gesture thread
    let mut gesture_thread = GestureThread::start(state.cfg.profile.clone())?;

    // auto-reload when a profile file changes on disk
    let tx_watch = tx_req.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                if event.kind.is_modify() || event.kind.is_create() {
                    let _ = tx_watch.send(IpcMsg::Reload);
                }
            }
            Err(e) => warn!("profile watcher error: {e}"),
        }
    })?;
    if let Err(e) = watcher.watch(&state.cfg.profiles_dir, RecursiveMode::NonRecursive) {
        warn!(
            "cannot watch {}: {e}; hot reload disabled",
            state.cfg.profiles_dir.display()
        );
    }

    // clean shutdown on SIGINT/SIGTERM
    let tx_sig = tx_req.clone();
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::spawn(move || {
        if signals.forever().next().is_some() {
            let _ = tx_sig.send(IpcMsg::Shutdown);
        }
    });

    // accept loop
    listener.set_nonblocking(true)?;
    loop {
        if let Ok((stream, _)) = listener.accept() {
            let tx = tx_req.clone();
            let st_snapshot = state.clone_shallow();
            thread::spawn(move || {
                if let Err(e) = handle_client(stream, st_snapshot, tx) {
                    error!("ipc client error: {e}");
                }
            });
        }

        while let Ok(msg) = rx_req.try_recv() {
            match msg {
                IpcMsg::Reload => {
                    if let Err(e) = state.cfg.reload() {
                        error!("reload failed, keeping last good profile: {e}");
                    } else {
                        gesture_thread.update_profile(state.cfg.profile.clone());
                        info!("profile reloaded");
                    }
                }
                IpcMsg::UseProfile(name) => {
                    if let Err(e) = state.cfg.set_active(&name) {
                        error!("use profile failed: {e}");
                    } else {
                        gesture_thread.update_profile(state.cfg.profile.clone());
                        info!("switched active profile to {}", state.cfg.active_name);
                    }
                }
                IpcMsg::Shutdown => {
                    info!("daemon: shutting down");
                    let _ = std::fs::remove_file(&sock);
                    return Ok(());
                }
            }
        }

        thread::sleep(Duration::from_millis(5));
    }
}

fn handle_client(
    mut stream: UnixStream,
    st: DaemonState,
    tx_req: mpsc::Sender<IpcMsg>,
) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim().is_empty() {
        return Ok(());
    }
    let req: serde_json::Value = serde_json::from_str(&line)?;
    let op = req.get("op").and_then(|v| v.as_str()).unwrap_or("");

    let resp = match op {
        "status" => serde_json::json!({"ok": true, "data": {
            "enabled": st.enabled,
            "active_profile": st.cfg.active_name,
            "socket": socket_path()?,
            "devices": st.cfg.detected_devices,
        }}),
        "reload" => {
            let _ = tx_req.send(IpcMsg::Reload);
            serde_json::json!({"ok": true, "data": {"active_profile": st.cfg.active_name}})
        }
        "use" => {
            let name = req.get("profile").and_then(|v| v.as_str()).unwrap_or("");
            let _ = tx_req.send(IpcMsg::UseProfile(name.to_string()));
            serde_json::json!({"ok": true, "data": {"active_profile": name}})
        }
        "list" => {
            let list = st.cfg.list_profiles();
            serde_json::json!({"ok": true, "data": {"profiles": list, "active": st.cfg.active_name}})
        }
        "doctor" => {
            let report = st.cfg.doctor_report();
            serde_json::json!({"ok": true, "data": report})
        }
        "shutdown" => {
            let _ = tx_req.send(IpcMsg::Shutdown);
            serde_json::json!({"ok": true, "data": "shutting down"})
        }
        _ => serde_json::json!({"ok": false, "error": format!("unknown op: {op}")}),
    };

    writeln!(stream, "{resp}")?;
    Ok(())
}

struct DaemonState {
    pub enabled: bool,
    pub cfg: DaemonConfigState,
}

impl DaemonState {
    fn new() -> Result<Self> {
        let cfg = DaemonConfigState::load_or_install_default()?;
        Ok(Self { enabled: true, cfg })
    }
    fn clone_shallow(&self) -> Self {
        Self {
            enabled: self.enabled,
            cfg: self.cfg.clone(),
        }
    }
}

enum IpcMsg {
    Reload,
    UseProfile(String),
    Shutdown,
}

/// Shared profile snapshot for the pipeline thread; the generation counter
/// lets the pipeline detect changes without comparing whole profiles.
pub(super) struct ProfileSlot {
    pub generation: u64,
    pub profile: Profile,
}

struct GestureThread {
    slot: Arc<Mutex<ProfileSlot>>,
    _thread: thread::JoinHandle<()>,
}

impl GestureThread {
    fn start(profile: Profile) -> Result<Self> {
        let slot = Arc::new(Mutex::new(ProfileSlot {
            generation: 0,
            profile,
        }));
        let slot_clone = slot.clone();
        let handle = thread::spawn(move || {
            if let Err(e) = run_pipeline(slot_clone) {
                error!("gesture pipeline failed: {e}");
            }
        });
        Ok(Self {
            slot,
            _thread: handle,
        })
    }

    fn update_profile(&mut self, new_profile: Profile) {
        if let Ok(mut s) = self.slot.lock() {
            s.generation += 1;
            s.profile = new_profile;
        }
    }
}

// client helper
pub fn client_request(req: serde_json::Value) -> Result<serde_json::Value> {
    let sock = socket_path()?;
    if !sock.exists() {
        return Err(anyhow::anyhow!(
            "swipectl daemon is not running (socket missing at {})",
            sock.display()
        ));
    }
    let mut stream = UnixStream::connect(sock)?;
    let line = serde_json::to_string(&req)? + "\n";
    stream.write_all(line.as_bytes())?;
    let mut reader = BufReader::new(stream);
    let mut resp = String::new();
    reader.read_line(&mut resp)?;
    let v: serde_json::Value = serde_json::from_str(&resp)?;
    Ok(v)
}
