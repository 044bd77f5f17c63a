//! Binding resolution and the three-phase invocation protocol.
//!
//! Every action goes through exactly two call shapes: `update(progress)`
//! any number of times while the gesture is live, and `resolve(committed,
//! progress)` exactly once per activation. The dispatcher owns the "at most
//! one live activation" bookkeeping; clearing the cached activation on
//! first resolution is what makes re-entrant resolves no-ops.

use log::trace;

use super::action::{Action, Bindings, Trigger};
use super::ports::WindowId;

/// Session context an executor may need to apply an effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionCtx {
    pub window: Option<WindowId>,
    pub monitor: i32,
    pub time_ms: u64,
}

/// Receives the protocol. Real effects, previews and any visual feedback
/// all live behind this seam; the engine only ever emits progress.
pub trait ActionExecutor {
    /// Replaces the previous preview for `action`; must stay free of
    /// window mutations.
    fn update(&mut self, action: Action, ctx: &ActionCtx, progress: f64);
    /// Terminal call. `committed == false` reverts any preview; committed
    /// with progress under the action's commit threshold is an implicit
    /// cancel.
    fn resolve(&mut self, action: Action, ctx: &ActionCtx, committed: bool, progress: f64);
    /// Timer pulse for executors with time-driven behavior (key repeat).
    fn tick(&mut self, _now_ms: u64) {}
    /// Configuration changed; executors pick up the toggles they honor.
    fn on_config(&mut self, _cfg: &super::EngineConfig) {}
}

pub struct Dispatcher {
    bindings: Bindings,
    executor: Box<dyn ActionExecutor>,
    active: Option<(Action, ActionCtx)>,
}

impl Dispatcher {
    pub fn new(bindings: Bindings, executor: Box<dyn ActionExecutor>) -> Self {
        Self {
            bindings,
            executor,
            active: None,
        }
    }

    pub fn set_bindings(&mut self, bindings: Bindings) {
        self.bindings = bindings;
    }

    pub fn configure(&mut self, cfg: &super::EngineConfig) {
        self.bindings = cfg.bindings;
        self.executor.on_config(cfg);
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    /// Continuous phase for a trigger. Switching to a differently-bound
    /// trigger cancels the previous activation first.
    pub fn update(&mut self, trigger: Trigger, ctx: ActionCtx, progress: f64) {
        let Some(action) = self.bindings.resolve(trigger) else {
            self.cancel_active();
            return;
        };
        if let Some((current, current_ctx)) = self.active {
            if current != action {
                self.executor.resolve(current, &current_ctx, false, 0.0);
                self.active = None;
            }
        }
        trace!("dispatch update {action:?} progress={progress:.3}");
        self.active = Some((action, ctx));
        self.executor.update(action, &ctx, progress);
    }

    /// Continuous phase for an already-taken activation (fling steps).
    pub fn update_direct(&mut self, action: Action, ctx: &ActionCtx, progress: f64) {
        self.executor.update(action, ctx, progress);
    }

    /// Cancel whatever was optimistically driving feedback.
    pub fn cancel_active(&mut self) {
        if let Some((action, ctx)) = self.active.take() {
            trace!("dispatch cancel {action:?}");
            self.executor.resolve(action, &ctx, false, 0.0);
        }
    }

    /// Remove and return the live activation so the caller can resolve it
    /// (immediately or through a fling).
    pub fn take_active(&mut self) -> Option<(Action, ActionCtx)> {
        self.active.take()
    }

    pub fn resolve(&mut self, action: Action, ctx: &ActionCtx, committed: bool, progress: f64) {
        trace!("dispatch resolve {action:?} committed={committed} progress={progress:.3}");
        self.executor.resolve(action, ctx, committed, progress);
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.executor.tick(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::Outcome;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        updates: Vec<(Action, f64)>,
        resolves: Vec<(Action, bool, f64)>,
    }

    struct RecordingExecutor(Rc<RefCell<Recorder>>);

    impl ActionExecutor for RecordingExecutor {
        fn update(&mut self, action: Action, _ctx: &ActionCtx, progress: f64) {
            self.0.borrow_mut().updates.push((action, progress));
        }
        fn resolve(&mut self, action: Action, _ctx: &ActionCtx, committed: bool, progress: f64) {
            self.0.borrow_mut().resolves.push((action, committed, progress));
        }
    }

    fn dispatcher() -> (Dispatcher, Rc<RefCell<Recorder>>) {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let d = Dispatcher::new(
            Bindings::default(),
            Box::new(RecordingExecutor(rec.clone())),
        );
        (d, rec)
    }

    fn up3() -> Trigger {
        Trigger::Swipe {
            fingers: 3,
            outcome: Outcome::Up,
        }
    }

    fn up_left3() -> Trigger {
        Trigger::Swipe {
            fingers: 3,
            outcome: Outcome::UpLeft,
        }
    }

    #[test]
    fn switching_trigger_cancels_previous_activation() {
        let (mut d, rec) = dispatcher();
        d.update(up3(), ActionCtx::default(), 0.1);
        d.update(up_left3(), ActionCtx::default(), 0.2);
        let r = rec.borrow();
        assert_eq!(r.resolves, vec![(Action::MaximizeWindow, false, 0.0)]);
        assert_eq!(r.updates.len(), 2);
        assert_eq!(r.updates[1], (Action::SnapWindowLeft, 0.2));
    }

    #[test]
    fn take_active_clears_state_so_cancel_is_a_noop() {
        let (mut d, rec) = dispatcher();
        d.update(up3(), ActionCtx::default(), 0.4);
        let taken = d.take_active();
        assert!(taken.is_some());
        d.cancel_active();
        assert!(rec.borrow().resolves.is_empty(), "nothing left to cancel");
    }

    #[test]
    fn unbound_trigger_cancels_and_stays_idle() {
        let (mut d, rec) = dispatcher();
        let mut b = Bindings::default();
        b.swipe3.up = 0;
        d.set_bindings(b);
        d.update(up3(), ActionCtx::default(), 0.1);
        assert!(!d.has_active());
        assert!(rec.borrow().updates.is_empty());
    }
}
