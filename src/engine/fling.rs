//! Post-release continuation of progress using the tracked velocity.
//!
//! A flicked gesture keeps advancing on a fixed tick after the fingers
//! lift, so a fast short swipe can still complete its action. At most one
//! task runs at a time; enqueuing a replacement force-resolves the old one.

use super::action::Action;
use super::dispatch::ActionCtx;

pub const TICK_MS: u64 = 4;
pub const MAX_FRAMES: u32 = 30;
/// Velocity below this at release resolves immediately instead of flinging.
pub const MIN_VELOCITY: f64 = 0.001;

const GAIN: f64 = 2.0;
const DECAY: f64 = 0.98;

#[derive(Debug)]
pub enum FlingStep {
    /// One tick advanced; feed the new progress to the continuous phase.
    Tick(f64),
    /// Target or frame cap reached; resolve committed at this progress.
    Done(f64),
}

#[derive(Debug)]
pub struct FlingTask {
    pub action: Action,
    pub ctx: ActionCtx,
    progress: f64,
    velocity: f64,
    max_progress: f64,
    frames: u32,
    next_due_ms: u64,
}

impl FlingTask {
    pub fn new(action: Action, ctx: ActionCtx, progress: f64, velocity: f64, now_ms: u64) -> Self {
        Self {
            action,
            ctx,
            progress,
            velocity,
            max_progress: 1.0,
            frames: 0,
            next_due_ms: now_ms + TICK_MS,
        }
    }

    pub fn due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_due_ms
    }

    pub fn progress(&self) -> f64 {
        self.progress.clamp(0.0, self.max_progress)
    }

    pub fn step(&mut self) -> FlingStep {
        self.next_due_ms += TICK_MS;
        self.frames += 1;
        self.progress += self.velocity * GAIN;
        self.velocity *= DECAY;
        if self.progress >= self.max_progress || self.frames >= MAX_FRAMES {
            FlingStep::Done(self.progress())
        } else {
            FlingStep::Tick(self.progress())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(progress: f64, velocity: f64) -> FlingTask {
        FlingTask::new(
            Action::MaximizeWindow,
            ActionCtx::default(),
            progress,
            velocity,
            0,
        )
    }

    fn run_to_done(t: &mut FlingTask) -> (f64, u32) {
        let mut steps = 0;
        loop {
            steps += 1;
            if let FlingStep::Done(p) = t.step() {
                return (p, steps);
            }
            assert!(steps < 1000, "fling never finished");
        }
    }

    #[test]
    fn fast_flick_reaches_full_progress() {
        let mut t = task(0.4, 0.02);
        let (p, steps) = run_to_done(&mut t);
        assert_eq!(p, 1.0);
        assert!(steps < MAX_FRAMES, "should finish before the cap, took {steps}");
    }

    #[test]
    fn moderate_flick_ends_at_frame_cap_partially_complete() {
        // release at 0.4 with 0.01 progress/ms: ~0.02 per 4 ms tick decaying
        // 2% per tick runs out of frames just short of the target
        let mut t = task(0.4, 0.01);
        let (p, steps) = run_to_done(&mut t);
        assert_eq!(steps, MAX_FRAMES);
        assert!(p > 0.8 && p < 1.0, "got {p}");
    }

    #[test]
    fn slow_fling_stops_at_frame_cap_below_target() {
        let mut t = task(0.1, 0.0005);
        let (p, steps) = run_to_done(&mut t);
        assert_eq!(steps, MAX_FRAMES);
        assert!(p < 1.0, "got {p}");
    }

    #[test]
    fn progress_is_monotonic_and_bounded() {
        let mut t = task(0.2, 0.008);
        let mut last = 0.2;
        loop {
            match t.step() {
                FlingStep::Tick(p) => {
                    assert!(p >= last, "progress went backwards: {last} -> {p}");
                    assert!((0.0..=1.0).contains(&p));
                    last = p;
                }
                FlingStep::Done(p) => {
                    assert!(p >= last);
                    assert!(p <= 1.0);
                    break;
                }
            }
        }
    }

    #[test]
    fn velocity_decays_two_percent_per_tick() {
        let mut t = task(0.0, 0.01);
        t.step();
        t.step();
        // second tick advanced by 0.01 * 2.0 * 0.98
        let expected = 0.01 * 2.0 + 0.01 * 0.98 * 2.0;
        assert!((t.progress() - expected).abs() < 1e-9);
    }

    #[test]
    fn tick_cadence_is_4ms() {
        let t = task(0.0, 0.01);
        assert!(!t.due(3));
        assert!(t.due(4));
    }
}
