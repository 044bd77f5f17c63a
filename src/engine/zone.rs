//! Start-of-gesture zone classification.
//!
//! Computed once per session from the start pointer position and the target
//! window's frame; the result never changes afterwards (the only exception
//! is the swipe machine's explicit fall back to Move on an undetermined
//! downward pull, which is its transition, not a re-classification).

use super::geom::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeEdges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeZone {
    /// Not on an edge band: swipe-gesture mode.
    Undetermined,
    /// Title band: window move.
    Move,
    /// Edge/corner band: window resize along the flagged edges.
    Resize(ResizeEdges),
}

#[derive(Debug, Clone, Copy)]
pub struct ZoneOptions {
    pub allow_resize: bool,
    pub allow_move: bool,
    pub maximized: bool,
}

pub fn classify(
    start: Point,
    frame: &Rect,
    edge_size: f64,
    top_edge_size: f64,
    opts: ZoneOptions,
) -> EdgeZone {
    let third_x = frame.x + frame.w / 3.0;
    let two_thirds_x = frame.x + frame.w / 3.0 * 2.0;
    let third_y = frame.y + frame.h / 3.0;
    let two_thirds_y = frame.y + frame.h / 3.0 * 2.0;

    if opts.allow_resize {
        let mut edges = ResizeEdges::default();
        if start.y >= frame.bottom() - edge_size {
            edges.bottom = true;
            // outer thirds grab a corner, the middle stays pure bottom
            if start.x <= third_x {
                edges.left = true;
            } else if start.x >= two_thirds_x {
                edges.right = true;
            }
            return EdgeZone::Resize(edges);
        }
        if start.x <= frame.x + edge_size {
            edges.left = true;
        } else if start.x >= frame.right() - edge_size {
            edges.right = true;
        }
        if edges.left || edges.right {
            if start.y <= third_y {
                edges.top = true;
            } else if start.y >= two_thirds_y {
                edges.bottom = true;
            }
            return EdgeZone::Resize(edges);
        }
    }

    if opts.allow_move && !opts.maximized && start.y <= frame.y + top_edge_size {
        return EdgeZone::Move;
    }

    EdgeZone::Undetermined
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Rect = Rect {
        x: 100.0,
        y: 100.0,
        w: 600.0,
        h: 300.0,
    };

    fn opts() -> ZoneOptions {
        ZoneOptions {
            allow_resize: true,
            allow_move: true,
            maximized: false,
        }
    }

    fn resize(left: bool, right: bool, top: bool, bottom: bool) -> EdgeZone {
        EdgeZone::Resize(ResizeEdges {
            left,
            right,
            top,
            bottom,
        })
    }

    #[test]
    fn bottom_middle_third_is_pure_bottom() {
        let z = classify(Point::new(400.0, 390.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, resize(false, false, false, true));
    }

    #[test]
    fn bottom_outer_thirds_are_corners() {
        let z = classify(Point::new(150.0, 390.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, resize(true, false, false, true));
        let z = classify(Point::new(650.0, 390.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, resize(false, true, false, true));
    }

    #[test]
    fn side_edges_split_by_vertical_thirds() {
        let z = classify(Point::new(110.0, 120.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, resize(true, false, true, false));
        let z = classify(Point::new(690.0, 250.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, resize(false, true, false, false));
        let z = classify(Point::new(690.0, 370.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, resize(false, true, false, true));
    }

    #[test]
    fn title_band_is_move() {
        let z = classify(Point::new(400.0, 140.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, EdgeZone::Move);
    }

    #[test]
    fn maximized_window_gets_no_move_band() {
        let mut o = opts();
        o.maximized = true;
        o.allow_resize = false;
        let z = classify(Point::new(400.0, 140.0), &FRAME, 32.0, 64.0, o);
        assert_eq!(z, EdgeZone::Undetermined);
    }

    #[test]
    fn interior_is_undetermined() {
        let z = classify(Point::new(400.0, 250.0), &FRAME, 32.0, 64.0, opts());
        assert_eq!(z, EdgeZone::Undetermined);
    }

    #[test]
    fn resize_disabled_falls_through_to_move_band() {
        let mut o = opts();
        o.allow_resize = false;
        // bottom edge would have been resize; with it off, interior rules apply
        let z = classify(Point::new(400.0, 390.0), &FRAME, 32.0, 64.0, o);
        assert_eq!(z, EdgeZone::Undetermined);
    }
}
