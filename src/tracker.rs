//! Per-slot touch tracking and frame snapshots.
//!
//! Raw evdev multitouch events come in as slot-addressed absolute axes; a
//! SYN_REPORT closes a frame. The tracker reduces each frame to the finger
//! count, the centroid and the contact span (mean distance from the
//! centroid), which is what the gesture synthesizer consumes.

use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    tracking_id: i32,
    x_norm: f32,
    y_norm: f32,
    active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub timestamp_ms: u64,
    pub active_count: usize,
    pub centroid: (f32, f32),
    pub span: f32,
}

#[derive(Debug)]
pub struct Tracker {
    slots: Vec<SlotState>,
    cur_slot: i32,
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    start_instant: Instant,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            slots: vec![SlotState::default(); 10],
            cur_slot: 0,
            x_min: 0,
            x_max: 4096,
            y_min: 0,
            y_max: 4096,
            start_instant: Instant::now(),
        }
    }

    pub fn set_norm_ranges(&mut self, x_min: i32, x_max: i32, y_min: i32, y_max: i32) {
        self.x_min = x_min;
        self.x_max = x_max.max(x_min + 1);
        self.y_min = y_min;
        self.y_max = y_max.max(y_min + 1);
    }

    fn now_ms(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot.clamp(0, (self.slots.len() as i32) - 1);
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        let s = &mut self.slots[self.cur_slot as usize];
        if tracking_id < 0 {
            s.tracking_id = -1;
            s.active = false;
        } else {
            s.tracking_id = tracking_id;
            s.active = true;
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        let nx = ((raw - self.x_min) as f32 / (self.x_max - self.x_min) as f32).clamp(0.0, 1.0);
        self.slots[self.cur_slot as usize].x_norm = nx;
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        let ny = ((raw - self.y_min) as f32 / (self.y_max - self.y_min) as f32).clamp(0.0, 1.0);
        self.slots[self.cur_slot as usize].y_norm = ny;
    }

    pub fn on_syn_report(&mut self) -> FrameSummary {
        let act: Vec<&SlotState> = self
            .slots
            .iter()
            .filter(|s| s.active && s.tracking_id >= 0)
            .collect();
        let active_count = act.len();

        let centroid = if active_count > 0 {
            let sumx: f32 = act.iter().map(|s| s.x_norm).sum();
            let sumy: f32 = act.iter().map(|s| s.y_norm).sum();
            (sumx / active_count as f32, sumy / active_count as f32)
        } else {
            (0.5, 0.5)
        };

        let span = if active_count > 0 {
            let mut acc = 0.0f32;
            for s in &act {
                let dx = s.x_norm - centroid.0;
                let dy = s.y_norm - centroid.1;
                acc += (dx * dx + dy * dy).sqrt();
            }
            acc / active_count as f32
        } else {
            0.0
        };

        FrameSummary {
            timestamp_ms: self.now_ms(),
            active_count,
            centroid,
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(t: &mut Tracker, slot: i32, id: i32, x: i32, y: i32) {
        t.on_slot(slot);
        t.on_tracking_id(id);
        t.on_pos_x(x);
        t.on_pos_y(y);
    }

    #[test]
    fn three_touches_report_count_and_centroid() {
        let mut t = Tracker::new();
        touch(&mut t, 0, 1, 0, 0);
        touch(&mut t, 1, 2, 2048, 2048);
        touch(&mut t, 2, 3, 4096, 4096);
        let f = t.on_syn_report();
        assert_eq!(f.active_count, 3);
        assert!((f.centroid.0 - 0.5).abs() < 1e-5);
        assert!((f.centroid.1 - 0.5).abs() < 1e-5);
        assert!(f.span > 0.0);
    }

    #[test]
    fn release_drops_the_slot() {
        let mut t = Tracker::new();
        touch(&mut t, 0, 1, 100, 100);
        touch(&mut t, 1, 2, 200, 200);
        assert_eq!(t.on_syn_report().active_count, 2);
        t.on_slot(1);
        t.on_tracking_id(-1);
        assert_eq!(t.on_syn_report().active_count, 1);
    }

    #[test]
    fn span_shrinks_as_fingers_close() {
        let mut t = Tracker::new();
        touch(&mut t, 0, 1, 0, 2048);
        touch(&mut t, 1, 2, 4096, 2048);
        let wide = t.on_syn_report().span;
        t.on_slot(0);
        t.on_pos_x(1500);
        t.on_slot(1);
        t.on_pos_x(2500);
        let narrow = t.on_syn_report().span;
        assert!(narrow < wide);
    }
}
