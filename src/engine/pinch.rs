//! Pinch session: the scale-based variant of the progress contract.

use log::debug;

use super::action::{PinchDir, Trigger};
use super::dispatch::ActionCtx;
use super::fling;
use super::velocity::VelocityTracker;
use super::{Disposition, Engine};

pub(crate) struct PinchSession {
    pub(crate) fingers: u8,
    pub(crate) dir: Option<PinchDir>,
    pub(crate) progress: f64,
    pub(crate) velocity: VelocityTracker,
}

impl Engine {
    pub(crate) fn pinch_begin(&mut self, fingers: u8, _time_ms: u64) -> Disposition {
        if self.pinch.is_some() {
            self.dispatcher.cancel_active();
        }
        debug!("pinch session open: fingers={fingers}");
        self.pinch = Some(PinchSession {
            fingers,
            dir: None,
            progress: 0.0,
            velocity: VelocityTracker::new(),
        });
        Disposition::Handled
    }

    pub(crate) fn pinch_update(&mut self, scale: f64, time_ms: u64) -> Disposition {
        let pinch_in = self.cfg.thresholds.pinch_in_scale;
        let pinch_out = self.cfg.thresholds.pinch_out_scale;
        let Some(session) = self.pinch.as_mut() else {
            return Disposition::PassThrough;
        };

        let classified = if scale < 1.0 {
            let scale = scale.max(pinch_in);
            Some((PinchDir::In, (1.0 - scale) / (1.0 - pinch_in)))
        } else if scale > 1.0 {
            let scale = scale.min(pinch_out);
            Some((PinchDir::Out, (scale - 1.0) / (pinch_out - 1.0)))
        } else {
            None
        };

        let Some((dir, progress)) = classified else {
            // back at rest scale; keep the last direction for switch
            // detection but emit nothing
            return Disposition::Handled;
        };

        if session.dir.is_some_and(|prev| prev != dir) {
            debug!("pinch direction switched; cancelling previous binding");
            self.dispatcher.cancel_active();
            session.velocity.reset();
            session.progress = progress;
        }
        session.dir = Some(dir);
        session
            .velocity
            .push(time_ms, progress - session.progress);
        session.progress = progress;

        self.dispatcher.update(
            Trigger::Pinch {
                fingers: session.fingers,
                dir,
            },
            ActionCtx {
                window: None,
                monitor: 0,
                time_ms,
            },
            progress,
        );
        Disposition::Handled
    }

    pub(crate) fn pinch_end(&mut self, time_ms: u64, cancelled: bool) -> Disposition {
        let Some(mut session) = self.pinch.take() else {
            return Disposition::PassThrough;
        };
        if cancelled {
            self.dispatcher.cancel_active();
            return Disposition::Handled;
        }
        if let Some((action, ctx)) = self.dispatcher.take_active() {
            let progress = session.progress;
            let velocity = session.velocity.velocity(time_ms);
            if progress < 1.0 && velocity > fling::MIN_VELOCITY {
                self.enqueue_fling(action, ctx, progress, velocity, time_ms);
            } else {
                self.dispatcher.resolve(action, &ctx, true, progress);
            }
        }
        Disposition::Handled
    }
}
