//! Gesture recognition and action dispatch.
//!
//! The engine is an explicit object constructed with injected ports; the
//! host feeds it a serial stream of gesture events plus timer ticks and it
//! answers with a disposition per event. It owns at most one swipe session,
//! one pinch session and one fling task at a time, and never blocks or
//! panics across this boundary.

pub mod action;
pub mod dispatch;
pub mod exec;
pub mod fling;
pub mod geom;
pub mod hold;
mod pinch;
pub mod ports;
mod swipe;
pub mod velocity;
pub mod zone;

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use action::Bindings;
use dispatch::{ActionCtx, ActionExecutor, Dispatcher};
use fling::{FlingStep, FlingTask};
use hold::HoldDetector;
use pinch::PinchSession;
use ports::{InputInjector, WindowSystem};
use swipe::SwipeSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Begin,
    Update,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    Swipe { dx: f64, dy: f64 },
    Pinch { scale: f64 },
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    pub kind: GestureKind,
    pub fingers: u8,
    pub time_ms: u64,
}

/// What the host should do with the raw event after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Handled,
    PassThrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub edge_size: f64,
    pub top_edge_size: f64,
    pub gesture_threshold: f64,
    pub cancel_threshold: f64,
    pub acceleration: f64,
    pub pinch_in_scale: f64,
    pub pinch_out_scale: f64,
    pub hold_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            edge_size: 32.0,
            top_edge_size: 64.0,
            gesture_threshold: 32.0,
            cancel_threshold: 8.0,
            acceleration: 1.0,
            pinch_in_scale: 0.7,
            pinch_out_scale: 1.5,
            hold_ms: hold::HOLD_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureToggles {
    pub enable_move: bool,
    pub enable_resize: bool,
    pub enable_fullscreen: bool,
    pub enable_maximized_snap: bool,
    pub enable_move_snap: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            enable_move: true,
            enable_resize: true,
            enable_fullscreen: true,
            enable_maximized_snap: true,
            enable_move_snap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Finger count carrying window gestures; the other count stays with
    /// the host's native workspace gestures.
    pub window_fingers: u8,
    pub use_active_window: bool,
    pub tap_hold: bool,
    pub pinch_enabled: bool,
    pub thresholds: Thresholds,
    pub toggles: FeatureToggles,
    pub bindings: Bindings,
    pub blacklist: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_fingers: 3,
            use_active_window: false,
            tap_hold: true,
            pinch_enabled: true,
            thresholds: Thresholds::default(),
            toggles: FeatureToggles::default(),
            bindings: Bindings::default(),
            blacklist: Vec::new(),
        }
    }
}

pub struct Engine {
    cfg: EngineConfig,
    ws: Rc<RefCell<dyn WindowSystem>>,
    injector: Rc<RefCell<dyn InputInjector>>,
    dispatcher: Dispatcher,
    swipe: Option<SwipeSession>,
    pinch: Option<PinchSession>,
    hold: HoldDetector,
    fling: Option<FlingTask>,
}

impl Engine {
    pub fn new(
        cfg: EngineConfig,
        ws: Rc<RefCell<dyn WindowSystem>>,
        injector: Rc<RefCell<dyn InputInjector>>,
        executor: Box<dyn ActionExecutor>,
    ) -> Self {
        let mut dispatcher = Dispatcher::new(cfg.bindings, executor);
        dispatcher.configure(&cfg);
        Self {
            cfg,
            ws,
            injector,
            dispatcher,
            swipe: None,
            pinch: None,
            hold: HoldDetector::new(),
            fling: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn set_config(&mut self, cfg: EngineConfig) {
        self.dispatcher.configure(&cfg);
        self.cfg = cfg;
    }

    /// Pure predicate for host dispatch: should this raw event be routed
    /// into the engine at all? Host glue wires this into whatever
    /// interception mechanism it uses.
    pub fn claims(&self, kind: &GestureKind, fingers: u8) -> bool {
        match kind {
            GestureKind::Swipe { .. } => fingers == self.cfg.window_fingers,
            GestureKind::Hold => self.cfg.tap_hold && fingers == self.cfg.window_fingers,
            GestureKind::Pinch { .. } => self.cfg.pinch_enabled && (3..=4).contains(&fingers),
        }
    }

    /// Feed one event. Unclaimed or malformed events pass through
    /// untouched; nothing here returns an error or panics.
    pub fn handle(&mut self, ev: &GestureEvent) -> Disposition {
        if !self.claims(&ev.kind, ev.fingers) {
            return Disposition::PassThrough;
        }
        match (ev.kind, ev.phase) {
            (GestureKind::Swipe { .. }, GesturePhase::Begin) => {
                self.swipe_begin(ev.fingers, ev.time_ms)
            }
            (GestureKind::Swipe { dx, dy }, GesturePhase::Update) => {
                self.swipe_update(dx, dy, ev.time_ms)
            }
            (GestureKind::Swipe { .. }, GesturePhase::End) => self.swipe_end(ev.time_ms, false),
            (GestureKind::Swipe { .. }, GesturePhase::Cancel) => self.swipe_end(ev.time_ms, true),
            (GestureKind::Pinch { .. }, GesturePhase::Begin) => {
                self.pinch_begin(ev.fingers, ev.time_ms)
            }
            (GestureKind::Pinch { scale }, GesturePhase::Update) => {
                self.pinch_update(scale, ev.time_ms)
            }
            (GestureKind::Pinch { .. }, GesturePhase::End) => self.pinch_end(ev.time_ms, false),
            (GestureKind::Pinch { .. }, GesturePhase::Cancel) => self.pinch_end(ev.time_ms, true),
            (GestureKind::Hold, GesturePhase::Begin) => {
                self.hold.begin(ev.time_ms, self.cfg.thresholds.hold_ms);
                Disposition::Handled
            }
            (GestureKind::Hold, GesturePhase::End | GesturePhase::Cancel) => {
                self.hold.release();
                Disposition::Handled
            }
            (GestureKind::Hold, GesturePhase::Update) => Disposition::Handled,
        }
    }

    /// Timer pulse: advances the fling simulation, fires the tap-hold
    /// debounce and drives key repeat. The host calls this on a short
    /// cadence (the fling tick is 4 ms).
    pub fn tick(&mut self, now_ms: u64) {
        self.advance_fling(now_ms);
        self.poll_hold(now_ms);
        self.dispatcher.tick(now_ms);
    }

    fn poll_hold(&mut self, now_ms: u64) {
        if !self.hold.fired(now_ms) {
            return;
        }
        let mut ws_ref = self.ws.borrow_mut();
        let ws = &mut *ws_ref;
        let window = if self.cfg.use_active_window {
            ws.focused_window()
        } else {
            let pointer = ws.pointer_position();
            ws.window_at(pointer)
        };
        let Some(window) = window else { return };
        if let Some(class) = ws.wm_class(window) {
            if self.cfg.blacklist.iter().any(|b| b == &class) {
                return;
            }
        }
        let flags = ws.flags(window);
        if flags.movable && !flags.maximized.any() && !flags.fullscreen {
            debug!("hold claimed window {window:?}");
            self.hold.set_claim(window, now_ms);
        }
    }

    pub(crate) fn enqueue_fling(
        &mut self,
        action: action::Action,
        ctx: ActionCtx,
        progress: f64,
        velocity: f64,
        now_ms: u64,
    ) {
        // only one motion at a time: force the old task to its outcome
        if let Some(prev) = self.fling.take() {
            let p = prev.progress();
            self.dispatcher.resolve(prev.action, &prev.ctx, true, p);
        }
        debug!("fling enqueued at progress {progress:.3} velocity {velocity:.5}");
        self.fling = Some(FlingTask::new(action, ctx, progress, velocity, now_ms));
    }

    fn advance_fling(&mut self, now_ms: u64) {
        loop {
            let step = match self.fling.as_mut() {
                Some(task) if task.due(now_ms) => task.step(),
                _ => break,
            };
            match step {
                FlingStep::Tick(p) => {
                    if let Some(task) = &self.fling {
                        let (action, ctx) = (task.action, task.ctx);
                        self.dispatcher.update_direct(action, &ctx, p);
                    }
                }
                FlingStep::Done(p) => {
                    if let Some(task) = self.fling.take() {
                        self.dispatcher.resolve(task.action, &task.ctx, true, p);
                    }
                    break;
                }
            }
        }
    }
}
