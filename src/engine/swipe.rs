//! The swipe session state machine.
//!
//! One session runs per touch sequence: classified into a zone at begin,
//! advanced on every update, resolved at end. Modes are a closed set; a
//! session is never in two modes at once.

use log::debug;

use super::action::{Outcome, Trigger};
use super::dispatch::{ActionCtx, Dispatcher};
use super::fling;
use super::geom::{Point, Rect};
use super::ports::{Maximized, WindowId, WindowSystem};
use super::velocity::VelocityTracker;
use super::zone::{self, EdgeZone, ResizeEdges, ZoneOptions};
use super::{Disposition, Engine, EngineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Secondary horizontal direction layered on a committed primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Snap {
    Left,
    Right,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Undetermined,
    Moving { snap: Option<Snap> },
    Resizing { edges: ResizeEdges },
    Committed { dir: Direction, combo: Option<Side> },
}

pub(crate) struct SwipeSession {
    pub(crate) window: WindowId,
    pub(crate) fingers: u8,
    pub(crate) start_pos: Point,
    pub(crate) delta: (f64, f64),
    pub(crate) monitor: i32,
    pub(crate) work_area: Rect,
    pub(crate) start_frame: Rect,
    pub(crate) has_geometry: bool,
    pub(crate) active_window_mode: bool,
    pub(crate) mode: Mode,
    pub(crate) velocity: VelocityTracker,
    pub(crate) last_progress: f64,
}

impl SwipeSession {
    fn ctx(&self, time_ms: u64) -> ActionCtx {
        ActionCtx {
            window: Some(self.window),
            monitor: self.monitor,
            time_ms,
        }
    }

    fn outcome(dir: Direction, combo: Option<Side>) -> Outcome {
        match (dir, combo) {
            (Direction::Up, None) => Outcome::Up,
            (Direction::Up, Some(Side::Left)) => Outcome::UpLeft,
            (Direction::Up, Some(Side::Right)) => Outcome::UpRight,
            (Direction::Down, None) => Outcome::Down,
            (Direction::Down, Some(Side::Left)) => Outcome::DownLeft,
            (Direction::Down, Some(Side::Right)) => Outcome::DownRight,
            (Direction::Left, _) => Outcome::Left,
            (Direction::Right, _) => Outcome::Right,
        }
    }

    /// Travel along the committed direction, positive toward the commit.
    fn travel(&self, dir: Direction) -> f64 {
        match dir {
            Direction::Left => -self.delta.0,
            Direction::Right => self.delta.0,
            Direction::Up => -self.delta.1,
            Direction::Down => self.delta.1,
        }
    }
}

/// Progress of a committed direction: travel past a small trigger point,
/// normalized against a ramp an order of magnitude past the threshold.
pub(crate) fn swipe_progress(travel: f64, threshold: f64) -> f64 {
    let trigger = threshold / 4.0 + 1.0;
    let target = trigger + threshold * 10.0;
    ((travel - trigger).max(0.0) / target).clamp(0.0, 1.0)
}

impl Engine {
    pub(crate) fn swipe_begin(&mut self, fingers: u8, time_ms: u64) -> Disposition {
        if self.swipe.is_some() {
            // a begin without a matching end; drop the stray session
            self.abort_swipe();
        }

        let claimed = self.hold.take_claim(time_ms);
        let cfg = self.cfg.clone();
        let mut ws_ref = self.ws.borrow_mut();
        let ws = &mut *ws_ref;

        let pointer = ws.pointer_position();
        let (window, forced) = match claimed.filter(|w| ws.is_valid(*w)) {
            Some(w) => (w, true),
            None => {
                let found = if cfg.use_active_window {
                    ws.focused_window()
                } else {
                    ws.window_at(pointer)
                };
                match found {
                    Some(w) => (w, false),
                    None => return Disposition::PassThrough,
                }
            }
        };

        if let Some(class) = ws.wm_class(window) {
            if cfg.blacklist.iter().any(|b| b == &class) {
                debug!("window class '{class}' is blacklisted; passing through");
                return Disposition::PassThrough;
            }
        }

        let flags = ws.flags(window);
        let frame = ws.frame_rect(window);
        let work_area = ws.work_area(window);
        let has_geometry = frame.is_some() && work_area.is_some();
        let frame = frame.unwrap_or_default();
        let work_area = work_area.unwrap_or_default();
        let monitor = ws.monitor_id(window);

        ws.activate(window);

        let allow_move = cfg.toggles.enable_move && flags.movable && has_geometry;
        let allow_resize = cfg.toggles.enable_resize
            && !cfg.use_active_window
            && flags.resizable
            && flags.movable
            && has_geometry;

        let zone = zone::classify(
            pointer,
            &frame,
            cfg.thresholds.edge_size,
            cfg.thresholds.top_edge_size,
            ZoneOptions {
                allow_resize,
                allow_move,
                maximized: flags.maximized.any(),
            },
        );

        let mode = match zone {
            EdgeZone::Move => Mode::Moving { snap: None },
            EdgeZone::Resize(edges) => Mode::Resizing { edges },
            EdgeZone::Undetermined => {
                if forced && allow_move {
                    // a hold claim turns an interior start into a move
                    Mode::Moving { snap: None }
                } else {
                    Mode::Undetermined
                }
            }
        };

        debug!("swipe session open: window={window:?} mode={mode:?}");
        self.swipe = Some(SwipeSession {
            window,
            fingers,
            start_pos: pointer,
            delta: (0.0, 0.0),
            monitor,
            work_area,
            start_frame: frame,
            has_geometry,
            active_window_mode: cfg.use_active_window,
            mode,
            velocity: VelocityTracker::new(),
            last_progress: 0.0,
        });
        Disposition::Handled
    }

    pub(crate) fn swipe_update(&mut self, dx: f64, dy: f64, time_ms: u64) -> Disposition {
        let window = match &self.swipe {
            Some(s) => s.window,
            None => return Disposition::PassThrough,
        };
        if !self.ws.borrow_mut().is_valid(window) {
            debug!("target window vanished mid-session; aborting");
            self.abort_swipe();
            return Disposition::Handled;
        }

        let cfg = self.cfg.clone();
        let accel = cfg.thresholds.acceleration;
        let Some(session) = self.swipe.as_mut() else {
            return Disposition::PassThrough;
        };
        session.delta.0 += dx * accel;
        session.delta.1 += dy * accel;

        match session.mode {
            Mode::Moving { .. } => {
                if !session.active_window_mode {
                    let _ = self.injector.borrow_mut().move_pointer(dx, dy);
                }
                update_moving(session, &cfg, &mut *self.ws.borrow_mut());
            }
            Mode::Resizing { edges } => {
                if !session.active_window_mode {
                    let pdx = if edges.left || edges.right { dx } else { 0.0 };
                    let pdy = if edges.top || edges.bottom { dy } else { 0.0 };
                    let _ = self.injector.borrow_mut().move_pointer(pdx, pdy);
                }
                update_resizing(session, edges, &mut *self.ws.borrow_mut());
            }
            Mode::Undetermined => {
                if try_commit(session, &cfg, &mut *self.ws.borrow_mut()) {
                    committed_feedback(
                        session,
                        &cfg,
                        &mut *self.ws.borrow_mut(),
                        &mut self.dispatcher,
                        time_ms,
                    );
                }
            }
            Mode::Committed { dir, .. } => {
                update_committed(
                    session,
                    dir,
                    &cfg,
                    &mut *self.ws.borrow_mut(),
                    &mut self.dispatcher,
                    time_ms,
                );
            }
        }
        Disposition::Handled
    }

    pub(crate) fn swipe_end(&mut self, time_ms: u64, cancelled: bool) -> Disposition {
        let Some(mut session) = self.swipe.take() else {
            return Disposition::PassThrough;
        };
        self.ws.borrow_mut().hide_tile_preview();

        if !self.ws.borrow_mut().is_valid(session.window) {
            self.dispatcher.cancel_active();
            return Disposition::Handled;
        }

        let mode = session.mode;
        match mode {
            Mode::Moving { snap } => {
                if !cancelled && self.cfg.toggles.enable_move_snap {
                    self.apply_move_snap(&session, snap);
                }
            }
            Mode::Resizing { .. } => {}
            Mode::Undetermined => {
                self.dispatcher.cancel_active();
            }
            Mode::Committed { .. } => {
                if cancelled {
                    self.dispatcher.cancel_active();
                } else if let Some((action, ctx)) = self.dispatcher.take_active() {
                    let progress = session.last_progress;
                    let velocity = session.velocity.velocity(time_ms);
                    if progress < 1.0 && velocity > fling::MIN_VELOCITY {
                        self.enqueue_fling(action, ctx, progress, velocity, time_ms);
                    } else {
                        // a committed direction is a full gesture even when
                        // the travel never walked the progress ramp
                        self.dispatcher.resolve(action, &ctx, true, 1.0);
                    }
                }
            }
        }
        Disposition::Handled
    }

    fn apply_move_snap(&mut self, session: &SwipeSession, snap: Option<Snap>) {
        let Some(snap) = snap else { return };
        let mut ws_ref = self.ws.borrow_mut();
        let ws = &mut *ws_ref;
        // put the frame back where the drag started before snapping
        ws.move_frame(session.window, session.start_frame.x, session.start_frame.y);
        match snap {
            Snap::Top => {
                if ws.flags(session.window).can_maximize {
                    ws.maximize(session.window);
                }
            }
            Snap::Left => {
                let _ = self.injector.borrow_mut().key_chord("SUPER+LEFT");
            }
            Snap::Right => {
                let _ = self.injector.borrow_mut().key_chord("SUPER+RIGHT");
            }
        }
    }

    pub(crate) fn abort_swipe(&mut self) {
        if self.swipe.take().is_some() {
            self.ws.borrow_mut().hide_tile_preview();
            self.dispatcher.cancel_active();
        }
    }
}

fn update_moving(session: &mut SwipeSession, cfg: &EngineConfig, ws: &mut dyn WindowSystem) {
    let x = session.start_frame.x + session.delta.0;
    let y = session.start_frame.y + session.delta.1;
    ws.move_frame(session.window, x, y);

    if !cfg.toggles.enable_move_snap || !session.has_geometry {
        return;
    }
    let edge = cfg.thresholds.edge_size;
    let wa = session.work_area;
    let px = session.start_pos.x + session.delta.0;
    let py = session.start_pos.y + session.delta.1;

    let snap = if px >= wa.x && px <= wa.x + edge {
        Some(Snap::Left)
    } else if px <= wa.right() && px >= wa.right() - edge {
        Some(Snap::Right)
    } else if py >= wa.y - edge && py <= wa.y + edge {
        Some(Snap::Top)
    } else {
        None
    };

    match snap {
        Some(Snap::Left) => {
            ws.show_tile_preview(
                session.window,
                Rect::new(wa.x, wa.y, wa.w / 2.0, wa.h),
                session.monitor,
            );
        }
        Some(Snap::Right) => {
            ws.show_tile_preview(
                session.window,
                Rect::new(wa.x + wa.w / 2.0, wa.y, wa.w / 2.0, wa.h),
                session.monitor,
            );
        }
        Some(Snap::Top) => {
            ws.show_tile_preview(session.window, wa, session.monitor);
        }
        None => ws.hide_tile_preview(),
    }
    session.mode = Mode::Moving { snap };
}

fn update_resizing(session: &mut SwipeSession, edges: ResizeEdges, ws: &mut dyn WindowSystem) {
    let mut rect = session.start_frame;
    if edges.bottom {
        rect.h += session.delta.1;
    } else if edges.top {
        rect.y += session.delta.1;
        rect.h -= session.delta.1;
    }
    if edges.right {
        rect.w += session.delta.0;
    } else if edges.left {
        rect.x += session.delta.0;
        rect.w -= session.delta.0;
    }
    let rect = rect.clamped_to(&session.work_area);
    ws.move_resize_frame(session.window, rect);
}

/// Threshold check in Undetermined mode. Returns true when a direction
/// committed this update.
fn try_commit(session: &mut SwipeSession, cfg: &EngineConfig, ws: &mut dyn WindowSystem) -> bool {
    let threshold = cfg.thresholds.gesture_threshold;
    let (mx, my) = session.delta;
    if mx.abs() < threshold && my.abs() < threshold {
        return false;
    }

    let dir = if mx.abs() > my.abs() {
        if mx < -threshold {
            Some(Direction::Left)
        } else if mx > threshold && workspace_has_prev(ws, session.window) {
            Some(Direction::Right)
        } else {
            None
        }
    } else if my < -threshold {
        Some(Direction::Up)
    } else if my > threshold {
        let flags = ws.flags(session.window);
        if flags.fullscreen || flags.maximized.any() {
            Some(Direction::Down)
        } else {
            // pulling a normal window down is just a move
            if cfg.toggles.enable_move && flags.movable && session.has_geometry {
                session.mode = Mode::Moving { snap: None };
            }
            None
        }
    } else {
        None
    };

    let Some(dir) = dir else { return false };
    session.mode = Mode::Committed { dir, combo: None };
    session.delta = (0.0, 0.0);
    session.velocity.reset();
    session.last_progress = 0.0;
    debug!("swipe committed {dir:?}");
    true
}

fn workspace_has_prev(ws: &mut dyn WindowSystem, window: WindowId) -> bool {
    ws.workspace_index(window).map(|i| i > 0).unwrap_or(true)
}

fn update_committed(
    session: &mut SwipeSession,
    dir: Direction,
    cfg: &EngineConfig,
    ws: &mut dyn WindowSystem,
    dispatcher: &mut Dispatcher,
    time_ms: u64,
) {
    let threshold = cfg.thresholds.gesture_threshold;
    let cancel = cfg.thresholds.cancel_threshold;
    let wide = threshold * 2.0;

    // reversal past the cancel threshold drops the commit
    if session.travel(dir) < -cancel {
        debug!("swipe {dir:?} cancelled by reversal");
        ws.hide_tile_preview();
        dispatcher.cancel_active();
        session.mode = Mode::Undetermined;
        session.velocity.reset();
        session.last_progress = 0.0;
        return;
    }

    let mut combo = None;
    match dir {
        Direction::Up | Direction::Down => {
            let allowed = match dir {
                Direction::Up => {
                    let flags = ws.flags(session.window);
                    cfg.toggles.enable_maximized_snap
                        && !flags.fullscreen
                        && flags.maximized != Maximized::Both
                }
                _ => true,
            };
            if allowed {
                if session.delta.0 <= -wide {
                    combo = Some(Side::Left);
                } else if session.delta.0 >= wide {
                    combo = Some(Side::Right);
                }
                // keep the horizontal excursion just past the combo
                // boundary so letting go of the combo stays responsive
                session.delta.0 = session.delta.0.clamp(-(wide + 5.0), wide + 5.0);
            }
        }
        Direction::Left | Direction::Right => {
            if session.delta.1.abs() >= wide {
                // the vertical axis now dominates; restart detection with
                // the excursion pre-seeded past the threshold
                debug!("swipe {dir:?} redirected to vertical");
                ws.hide_tile_preview();
                dispatcher.cancel_active();
                session.mode = Mode::Undetermined;
                session.delta = (0.0, session.delta.1.signum() * (wide + 5.0));
                session.velocity.reset();
                session.last_progress = 0.0;
                if try_commit(session, cfg, ws) {
                    committed_feedback(session, cfg, ws, dispatcher, time_ms);
                }
                return;
            }
        }
    }

    session.mode = Mode::Committed { dir, combo };
    committed_feedback(session, cfg, ws, dispatcher, time_ms);
}

fn committed_feedback(
    session: &mut SwipeSession,
    cfg: &EngineConfig,
    ws: &mut dyn WindowSystem,
    dispatcher: &mut Dispatcher,
    time_ms: u64,
) {
    let Mode::Committed { dir, combo } = session.mode else {
        return;
    };
    let progress = swipe_progress(session.travel(dir), cfg.thresholds.gesture_threshold);
    session
        .velocity
        .push(time_ms, progress - session.last_progress);
    session.last_progress = progress;

    dispatcher.update(
        Trigger::Swipe {
            fingers: session.fingers,
            outcome: SwipeSession::outcome(dir, combo),
        },
        session.ctx(time_ms),
        progress,
    );

    if !session.has_geometry {
        return;
    }
    let wa = session.work_area;
    let frame = session.start_frame;
    let rect = match (dir, combo) {
        (Direction::Up, Some(Side::Left)) => Rect::new(wa.x, wa.y, wa.w / 2.0, wa.h),
        (Direction::Up, Some(Side::Right)) => {
            Rect::new(wa.x + wa.w / 2.0, wa.y, wa.w / 2.0, wa.h)
        }
        (Direction::Up, None) => wa,
        (Direction::Down, _) => Rect::new(
            wa.x + wa.w / 4.0,
            wa.y + wa.h / 4.0,
            wa.w / 2.0,
            wa.h / 2.0,
        ),
        (Direction::Left, _) => {
            Rect::new(wa.x + wa.w - frame.w, frame.y, frame.w, frame.h)
        }
        (Direction::Right, _) => Rect::new(wa.x, frame.y, frame.w, frame.h),
    };
    ws.show_tile_preview(session.window, rect, session.monitor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_zero_inside_trigger_zone() {
        assert_eq!(swipe_progress(0.0, 32.0), 0.0);
        assert_eq!(swipe_progress(8.0, 32.0), 0.0);
    }

    #[test]
    fn progress_ramps_past_trigger_and_saturates() {
        let threshold = 32.0;
        let trigger = threshold / 4.0 + 1.0;
        let target = trigger + threshold * 10.0;
        let mid = swipe_progress(trigger + target / 2.0, threshold);
        assert!((mid - 0.5).abs() < 1e-9, "got {mid}");
        assert_eq!(swipe_progress(trigger + target, threshold), 1.0);
        assert_eq!(swipe_progress(trigger + target * 3.0, threshold), 1.0);
    }

    #[test]
    fn travel_is_signed_toward_commit() {
        let session = SwipeSession {
            window: WindowId(1),
            fingers: 3,
            start_pos: Point::default(),
            delta: (-10.0, 20.0),
            monitor: 0,
            work_area: Rect::default(),
            start_frame: Rect::default(),
            has_geometry: false,
            active_window_mode: false,
            mode: Mode::Undetermined,
            velocity: VelocityTracker::new(),
            last_progress: 0.0,
        };
        assert_eq!(session.travel(Direction::Left), 10.0);
        assert_eq!(session.travel(Direction::Right), -10.0);
        assert_eq!(session.travel(Direction::Down), 20.0);
        assert_eq!(session.travel(Direction::Up), -20.0);
    }
}
