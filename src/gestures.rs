//! Turns tracker frames into phased gesture events.
//!
//! A touch sequence starts undecided: it may become a hold (stationary),
//! a swipe (centroid travel) or a pinch (span change). The synthesizer
//! emits Begin/Update/End streams for whichever wins, in the shape the
//! engine consumes.

use crate::engine::{GestureEvent, GestureKind, GesturePhase};
use crate::tracker::FrameSummary;

/// Normalized pad travel is scaled to these units so thresholds read like
/// pixels (a 32-unit threshold is ~3% of the pad width).
const UNITS_PER_PAD: f64 = 1000.0;
/// Relative span change that classifies the sequence as a pinch.
const PINCH_SCALE_GATE: f32 = 0.12;
/// Normalized centroid travel that classifies the sequence as a swipe.
const SWIPE_START_NORM: f32 = 0.015;

#[derive(Debug)]
enum State {
    Idle,
    /// Fingers down, gesture class not yet decided.
    Pending {
        fingers: u8,
        start: FrameSummary,
    },
    Swiping {
        fingers: u8,
        last: FrameSummary,
    },
    Pinching {
        fingers: u8,
        start_span: f32,
    },
}

#[derive(Debug)]
pub struct GestureSynth {
    state: State,
}

impl Default for GestureSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureSynth {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn update(&mut self, frame: &FrameSummary) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        let count = frame.active_count;
        let t = frame.timestamp_ms;

        loop {
            match &self.state {
                State::Idle => {
                    if (3..=4).contains(&count) {
                        let fingers = count as u8;
                        out.push(hold(GesturePhase::Begin, fingers, t));
                        self.state = State::Pending {
                            fingers,
                            start: *frame,
                        };
                    }
                    return out;
                }
                State::Pending { fingers, start } => {
                    let (fingers, start) = (*fingers, *start);
                    if count != fingers as usize {
                        out.push(hold(GesturePhase::End, fingers, t));
                        self.state = State::Idle;
                        // a changed finger count may open a new sequence
                        continue;
                    }
                    let scale = scale_of(frame.span, start.span);
                    if (scale - 1.0).abs() >= PINCH_SCALE_GATE {
                        out.push(hold(GesturePhase::End, fingers, t));
                        out.push(pinch(GesturePhase::Begin, 1.0, fingers, t));
                        out.push(pinch(GesturePhase::Update, scale as f64, fingers, t));
                        self.state = State::Pinching {
                            fingers,
                            start_span: start.span,
                        };
                        return out;
                    }
                    let dx = frame.centroid.0 - start.centroid.0;
                    let dy = frame.centroid.1 - start.centroid.1;
                    if (dx * dx + dy * dy).sqrt() >= SWIPE_START_NORM {
                        out.push(hold(GesturePhase::End, fingers, t));
                        out.push(swipe(GesturePhase::Begin, 0.0, 0.0, fingers, t));
                        out.push(swipe(
                            GesturePhase::Update,
                            dx as f64 * UNITS_PER_PAD,
                            dy as f64 * UNITS_PER_PAD,
                            fingers,
                            t,
                        ));
                        self.state = State::Swiping {
                            fingers,
                            last: *frame,
                        };
                    }
                    return out;
                }
                State::Swiping { fingers, last } => {
                    let (fingers, last) = (*fingers, *last);
                    if count != fingers as usize {
                        out.push(swipe(GesturePhase::End, 0.0, 0.0, fingers, t));
                        self.state = State::Idle;
                        continue;
                    }
                    let dx = (frame.centroid.0 - last.centroid.0) as f64 * UNITS_PER_PAD;
                    let dy = (frame.centroid.1 - last.centroid.1) as f64 * UNITS_PER_PAD;
                    if dx != 0.0 || dy != 0.0 {
                        out.push(swipe(GesturePhase::Update, dx, dy, fingers, t));
                    }
                    self.state = State::Swiping {
                        fingers,
                        last: *frame,
                    };
                    return out;
                }
                State::Pinching {
                    fingers,
                    start_span,
                } => {
                    let (fingers, start_span) = (*fingers, *start_span);
                    if count != fingers as usize {
                        out.push(pinch(GesturePhase::End, 1.0, fingers, t));
                        self.state = State::Idle;
                        continue;
                    }
                    let scale = scale_of(frame.span, start_span);
                    out.push(pinch(GesturePhase::Update, scale as f64, fingers, t));
                    return out;
                }
            }
        }
    }
}

fn scale_of(span: f32, start_span: f32) -> f32 {
    if start_span <= f32::EPSILON {
        1.0
    } else {
        span / start_span
    }
}

fn hold(phase: GesturePhase, fingers: u8, time_ms: u64) -> GestureEvent {
    GestureEvent {
        phase,
        kind: GestureKind::Hold,
        fingers,
        time_ms,
    }
}

fn swipe(phase: GesturePhase, dx: f64, dy: f64, fingers: u8, time_ms: u64) -> GestureEvent {
    GestureEvent {
        phase,
        kind: GestureKind::Swipe { dx, dy },
        fingers,
        time_ms,
    }
}

fn pinch(phase: GesturePhase, scale: f64, fingers: u8, time_ms: u64) -> GestureEvent {
    GestureEvent {
        phase,
        kind: GestureKind::Pinch { scale },
        fingers,
        time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(t: u64, count: usize, cx: f32, cy: f32, span: f32) -> FrameSummary {
        FrameSummary {
            timestamp_ms: t,
            active_count: count,
            centroid: (cx, cy),
            span,
        }
    }

    #[test]
    fn stationary_fingers_only_open_a_hold() {
        let mut s = GestureSynth::new();
        let evs = s.update(&frame(0, 3, 0.5, 0.5, 0.1));
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].kind, GestureKind::Hold);
        assert_eq!(evs[0].phase, GesturePhase::Begin);
        assert!(s.update(&frame(50, 3, 0.501, 0.5, 0.1)).is_empty());
    }

    #[test]
    fn centroid_travel_becomes_a_swipe_stream() {
        let mut s = GestureSynth::new();
        s.update(&frame(0, 3, 0.5, 0.5, 0.1));
        let evs = s.update(&frame(20, 3, 0.5, 0.45, 0.1));
        assert_eq!(evs[0].phase, GesturePhase::End, "hold is released first");
        assert!(matches!(evs[1].kind, GestureKind::Swipe { .. }));
        assert_eq!(evs[1].phase, GesturePhase::Begin);
        match evs[2].kind {
            GestureKind::Swipe { dx, dy } => {
                assert!(dx.abs() < 1e-3);
                assert!((dy + 50.0).abs() < 1.0, "0.05 pad travel = 50 units, got {dy}");
            }
            _ => panic!("expected swipe update"),
        }
        // lift ends the stream
        let evs = s.update(&frame(40, 0, 0.5, 0.45, 0.0));
        assert_eq!(evs[0].phase, GesturePhase::End);
    }

    #[test]
    fn span_change_becomes_a_pinch_stream() {
        let mut s = GestureSynth::new();
        s.update(&frame(0, 3, 0.5, 0.5, 0.2));
        let evs = s.update(&frame(20, 3, 0.5, 0.5, 0.1));
        assert!(matches!(evs[1].kind, GestureKind::Pinch { .. }));
        match evs[2].kind {
            GestureKind::Pinch { scale } => assert!((scale - 0.5).abs() < 1e-5),
            _ => panic!("expected pinch update"),
        }
    }

    #[test]
    fn finger_count_change_restarts_the_sequence() {
        let mut s = GestureSynth::new();
        s.update(&frame(0, 3, 0.5, 0.5, 0.1));
        let evs = s.update(&frame(20, 4, 0.5, 0.5, 0.1));
        assert_eq!(evs[0].phase, GesturePhase::End);
        assert_eq!(evs[0].fingers, 3);
        assert_eq!(evs[1].phase, GesturePhase::Begin);
        assert_eq!(evs[1].fingers, 4);
    }

    #[test]
    fn two_finger_frames_are_ignored() {
        let mut s = GestureSynth::new();
        assert!(s.update(&frame(0, 2, 0.5, 0.5, 0.1)).is_empty());
    }
}
