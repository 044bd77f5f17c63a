//! Keystroke-fallback window system adapter.
//!
//! Without a compositor integration the daemon cannot hit-test windows or
//! read geometry, but most window effects have a portable keyboard
//! shortcut. This adapter answers every query with "unknown focused
//! window" and issues commands as chords, so swipe maximize/snap and
//! workspace moves work standalone; geometric move/resize only activates
//! behind a host adapter that implements the geometry queries.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::engine::geom::{Point, Rect};
use crate::engine::ports::{InputInjector, WindowFlags, WindowId, WindowSystem, WorkspaceDir};

/// Stand-in handle for "whatever window is focused right now".
const FOCUSED: WindowId = WindowId(0);

pub struct ChordWindowSystem {
    injector: Rc<RefCell<dyn InputInjector>>,
}

impl ChordWindowSystem {
    pub fn new(injector: Rc<RefCell<dyn InputInjector>>) -> Self {
        Self { injector }
    }

    fn chord(&self, chord: &str) {
        if let Err(e) = self.injector.borrow_mut().key_chord(chord) {
            warn!("key chord '{chord}' failed: {e}");
        }
    }
}

impl WindowSystem for ChordWindowSystem {
    fn pointer_position(&mut self) -> Point {
        Point::default()
    }

    fn window_at(&mut self, _pos: Point) -> Option<WindowId> {
        Some(FOCUSED)
    }

    fn focused_window(&mut self) -> Option<WindowId> {
        Some(FOCUSED)
    }

    fn is_valid(&mut self, _win: WindowId) -> bool {
        true
    }

    fn wm_class(&mut self, _win: WindowId) -> Option<String> {
        None
    }

    fn flags(&mut self, _win: WindowId) -> WindowFlags {
        // not movable/resizable: geometry is unknown, so the geometric
        // modes never engage through this adapter
        WindowFlags {
            movable: false,
            resizable: false,
            can_maximize: true,
            can_minimize: true,
            ..WindowFlags::default()
        }
    }

    fn frame_rect(&mut self, _win: WindowId) -> Option<Rect> {
        None
    }

    fn work_area(&mut self, _win: WindowId) -> Option<Rect> {
        None
    }

    fn monitor_id(&mut self, _win: WindowId) -> i32 {
        0
    }

    fn workspace_index(&mut self, _win: WindowId) -> Option<usize> {
        None
    }

    fn move_frame(&mut self, _win: WindowId, _x: f64, _y: f64) {
        debug!("move_frame: no compositor adapter, ignored");
    }

    fn move_resize_frame(&mut self, _win: WindowId, _rect: Rect) {
        debug!("move_resize_frame: no compositor adapter, ignored");
    }

    fn maximize(&mut self, _win: WindowId) {
        self.chord("SUPER+UP");
    }

    fn unmaximize(&mut self, _win: WindowId) {
        self.chord("SUPER+DOWN");
    }

    fn set_fullscreen(&mut self, _win: WindowId, on: bool) {
        debug!("set_fullscreen({on}): no portable chord, ignored");
    }

    fn minimize(&mut self, _win: WindowId) {
        self.chord("SUPER+H");
    }

    fn activate(&mut self, _win: WindowId) {}

    fn move_to_workspace(&mut self, _win: WindowId, dir: WorkspaceDir) {
        match dir {
            WorkspaceDir::Previous => self.chord("SUPER+SHIFT+PAGEUP"),
            WorkspaceDir::Next => self.chord("SUPER+SHIFT+PAGEDOWN"),
        }
    }

    fn cycle_window(&mut self, forward: bool) {
        if forward {
            self.chord("ALT+TAB");
        } else {
            self.chord("ALT+SHIFT+TAB");
        }
    }

    fn show_tile_preview(&mut self, _win: WindowId, _rect: Rect, _monitor: i32) {}

    fn hide_tile_preview(&mut self) {}
}
