//! Tap-and-hold debounce.
//!
//! A sustained hold claims the window under the pointer as the forced
//! target of the next swipe session, turning hold-then-swipe into a
//! move/resize trigger from anywhere on the window. A quick tap cancels
//! the pending claim before it fires.

use super::ports::WindowId;

pub const HOLD_DEBOUNCE_MS: u64 = 200;
pub const CLAIM_TTL_MS: u64 = 1000;

#[derive(Debug, Default)]
pub struct HoldDetector {
    pending_fire_ms: Option<u64>,
    claim: Option<(WindowId, u64)>,
}

impl HoldDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, now_ms: u64, debounce_ms: u64) {
        self.pending_fire_ms = Some(now_ms + debounce_ms);
    }

    /// Fingers lifted. Before the debounce fires this cancels the pending
    /// claim; the next swipe then targets by ordinary hit-testing.
    pub fn release(&mut self) {
        self.pending_fire_ms = None;
    }

    /// True exactly once, when the debounce deadline passes. The caller
    /// hit-tests and calls `set_claim` if the window qualifies.
    pub fn fired(&mut self, now_ms: u64) -> bool {
        match self.pending_fire_ms {
            Some(at) if now_ms >= at => {
                self.pending_fire_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn set_claim(&mut self, window: WindowId, now_ms: u64) {
        self.claim = Some((window, now_ms + CLAIM_TTL_MS));
    }

    /// Consume the claim if it is still inside its grace deadline.
    pub fn take_claim(&mut self, now_ms: u64) -> Option<WindowId> {
        let (window, until) = self.claim.take()?;
        if now_ms <= until { Some(window) } else { None }
    }

    pub fn clear(&mut self) {
        self.pending_fire_ms = None;
        self.claim = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_debounce() {
        let mut h = HoldDetector::new();
        h.begin(1000, HOLD_DEBOUNCE_MS);
        assert!(!h.fired(1100));
        assert!(h.fired(1200));
        assert!(!h.fired(1300), "fires only once");
    }

    #[test]
    fn quick_release_cancels_pending() {
        let mut h = HoldDetector::new();
        h.begin(0, HOLD_DEBOUNCE_MS);
        h.release();
        assert!(!h.fired(500));
    }

    #[test]
    fn claim_expires_after_ttl() {
        let mut h = HoldDetector::new();
        h.set_claim(WindowId(7), 0);
        assert_eq!(h.take_claim(CLAIM_TTL_MS + 1), None);
    }

    #[test]
    fn claim_is_consumed_once() {
        let mut h = HoldDetector::new();
        h.set_claim(WindowId(7), 0);
        assert_eq!(h.take_claim(100), Some(WindowId(7)));
        assert_eq!(h.take_claim(101), None);
    }
}
