//! Host ports the engine is constructed with.
//!
//! The engine never talks to a compositor or an input stack directly; it
//! drives these traits and treats every window handle as a borrowed
//! reference that can disappear between callbacks.

use anyhow::Result;

use super::geom::{Point, Rect};

/// Opaque handle to a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Maximized {
    #[default]
    No,
    Horizontal,
    Vertical,
    Both,
}

impl Maximized {
    pub fn any(&self) -> bool {
        !matches!(self, Maximized::No)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowFlags {
    pub movable: bool,
    pub resizable: bool,
    pub maximized: Maximized,
    pub fullscreen: bool,
    pub can_maximize: bool,
    pub can_minimize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceDir {
    Previous,
    Next,
}

/// Queries and commands against the host window system.
///
/// Query methods return `None` when the host has no answer (no window at the
/// point, no geometry available); the engine treats that as the feature
/// being unavailable, not as an error. `window_at` is expected to already
/// resolve actor ancestors and attached dialogs to the owning window.
pub trait WindowSystem {
    fn pointer_position(&mut self) -> Point;
    fn window_at(&mut self, pos: Point) -> Option<WindowId>;
    fn focused_window(&mut self) -> Option<WindowId>;
    fn is_valid(&mut self, win: WindowId) -> bool;
    fn wm_class(&mut self, win: WindowId) -> Option<String>;
    fn flags(&mut self, win: WindowId) -> WindowFlags;
    fn frame_rect(&mut self, win: WindowId) -> Option<Rect>;
    fn work_area(&mut self, win: WindowId) -> Option<Rect>;
    fn monitor_id(&mut self, win: WindowId) -> i32;
    fn workspace_index(&mut self, win: WindowId) -> Option<usize>;

    fn move_frame(&mut self, win: WindowId, x: f64, y: f64);
    fn move_resize_frame(&mut self, win: WindowId, rect: Rect);
    fn maximize(&mut self, win: WindowId);
    fn unmaximize(&mut self, win: WindowId);
    fn set_fullscreen(&mut self, win: WindowId, on: bool);
    fn minimize(&mut self, win: WindowId);
    fn activate(&mut self, win: WindowId);
    fn move_to_workspace(&mut self, win: WindowId, dir: WorkspaceDir);
    /// Focus the next/previous window in the host's stacking list.
    fn cycle_window(&mut self, forward: bool);

    fn show_tile_preview(&mut self, win: WindowId, rect: Rect, monitor: i32);
    fn hide_tile_preview(&mut self);
}

/// Synthetic input, used for pointer tracking during move/resize and as the
/// portable fallback for actions with no direct window-system command.
pub trait InputInjector {
    fn move_pointer(&mut self, dx: f64, dy: f64) -> Result<()>;
    /// Send a chord like "SUPER+LEFT" or a single "TAB": press in order,
    /// release in reverse.
    fn key_chord(&mut self, chord: &str) -> Result<()>;
}
