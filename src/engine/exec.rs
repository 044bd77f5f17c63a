//! Reference action executor: applies committed actions through the window
//! system and input-injection ports.
//!
//! Visual feedback stays out of the core; `update` only records enough
//! state for the time-driven behaviors (media key repeat).

use std::cell::RefCell;
use std::rc::Rc;

use log::{trace, warn};

use super::action::Action;
use super::dispatch::{ActionCtx, ActionExecutor};
use super::ports::{InputInjector, WindowId, WindowSystem, WorkspaceDir};

const REPEAT_INTERVAL_MS: u64 = 100;
const REPEAT_WARMUP_TICKS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecOptions {
    pub enable_fullscreen: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            enable_fullscreen: true,
        }
    }
}

enum MediaState {
    OneShot,
    Repeating {
        chord: &'static str,
        next_due_ms: u64,
        warmup: u8,
    },
}

pub struct DesktopExecutor {
    ws: Rc<RefCell<dyn WindowSystem>>,
    injector: Rc<RefCell<dyn InputInjector>>,
    opts: ExecOptions,
    media: Option<MediaState>,
}

impl DesktopExecutor {
    pub fn new(
        ws: Rc<RefCell<dyn WindowSystem>>,
        injector: Rc<RefCell<dyn InputInjector>>,
    ) -> Self {
        Self {
            ws,
            injector,
            opts: ExecOptions::default(),
            media: None,
        }
    }

    pub fn set_options(&mut self, opts: ExecOptions) {
        self.opts = opts;
    }

    fn chord(&self, chord: &str) {
        if let Err(e) = self.injector.borrow_mut().key_chord(chord) {
            warn!("key chord '{chord}' failed: {e}");
        }
    }

    fn target(&self, ctx: &ActionCtx) -> Option<WindowId> {
        let mut ws = self.ws.borrow_mut();
        let win = ctx.window.or_else(|| ws.focused_window())?;
        // the handle is borrowed from the host; never act on a dead one
        if ws.is_valid(win) { Some(win) } else { None }
    }

    fn media_chord(action: Action) -> Option<&'static str> {
        Some(match action {
            Action::VolumeUp => "VOLUMEUP",
            Action::VolumeDown => "VOLUMEDOWN",
            Action::VolumeMute => "MUTE",
            Action::BrightnessUp => "BRIGHTNESSUP",
            Action::BrightnessDown => "BRIGHTNESSDOWN",
            _ => return None,
        })
    }

    fn media_update(&mut self, action: Action, ctx: &ActionCtx, progress: f64) {
        let Some(chord) = Self::media_chord(action) else {
            return;
        };
        if progress < 1.0 || self.media.is_some() {
            return;
        }
        self.chord(chord);
        self.media = Some(if action.repeats() {
            MediaState::Repeating {
                chord,
                next_due_ms: ctx.time_ms + REPEAT_INTERVAL_MS,
                warmup: 0,
            }
        } else {
            MediaState::OneShot
        });
    }

    fn maximize_or_toggle_fullscreen(&mut self, ctx: &ActionCtx, progress: f64) {
        let Some(win) = self.target(ctx) else { return };
        let flags = self.ws.borrow_mut().flags(win);
        if flags.maximized == super::ports::Maximized::Both && !flags.fullscreen {
            if progress >= 0.5 && self.opts.enable_fullscreen {
                self.ws.borrow_mut().set_fullscreen(win, true);
            }
        } else if flags.fullscreen {
            if progress >= 0.5 {
                self.ws.borrow_mut().set_fullscreen(win, false);
            }
        } else if flags.can_maximize && progress >= 0.2 {
            self.ws.borrow_mut().maximize(win);
        }
    }

    fn restore(&mut self, ctx: &ActionCtx, progress: f64) {
        let Some(win) = self.target(ctx) else { return };
        let flags = self.ws.borrow_mut().flags(win);
        if flags.fullscreen {
            if progress >= 0.5 {
                self.ws.borrow_mut().set_fullscreen(win, false);
            }
        } else if flags.maximized.any() && progress >= 0.2 {
            self.ws.borrow_mut().unmaximize(win);
        }
    }

    fn move_workspace(&mut self, ctx: &ActionCtx, dir: WorkspaceDir) {
        let Some(win) = self.target(ctx) else { return };
        let mut ws = self.ws.borrow_mut();
        ws.move_to_workspace(win, dir);
        ws.activate(win);
    }
}

impl ActionExecutor for DesktopExecutor {
    fn update(&mut self, action: Action, ctx: &ActionCtx, progress: f64) {
        // media keys fire while held at full extension; everything else is
        // preview-only until resolve
        self.media_update(action, ctx, progress);
        trace!("preview {action:?} at {progress:.3}");
    }

    fn resolve(&mut self, action: Action, ctx: &ActionCtx, committed: bool, progress: f64) {
        if Self::media_chord(action).is_some() {
            // a deliberate swipe can resolve at 1.0 without a prior
            // full-extension update; press once in that case
            if committed && progress >= 1.0 && self.media.is_none() {
                if let Some(chord) = Self::media_chord(action) {
                    self.chord(chord);
                }
            }
            self.media = None;
            return;
        }
        if !committed {
            trace!("cancel {action:?}");
            return;
        }
        match action {
            Action::MinimizeWindow => {
                if progress >= 1.0 {
                    if let Some(win) = self.target(ctx) {
                        let mut ws = self.ws.borrow_mut();
                        if ws.flags(win).can_minimize {
                            ws.minimize(win);
                        }
                    }
                }
            }
            Action::CloseWindow => {
                if progress >= 1.0 {
                    self.chord("ALT+F4");
                }
            }
            Action::ShowDesktop => {
                if progress >= 1.0 {
                    self.chord("SUPER+D");
                }
            }
            Action::AltTab => {
                if progress >= 1.0 {
                    self.chord("ALT+TAB");
                }
            }
            Action::NextWindow => {
                if progress >= 1.0 {
                    self.ws.borrow_mut().cycle_window(true);
                }
            }
            Action::PrevWindow => {
                if progress >= 1.0 {
                    self.ws.borrow_mut().cycle_window(false);
                }
            }
            Action::Overview => {
                if progress >= 1.0 {
                    self.chord("SUPER");
                }
            }
            Action::ShowApps => {
                if progress >= 1.0 {
                    self.chord("SUPER+A");
                }
            }
            Action::QuickSettings => {
                if progress >= 1.0 {
                    self.chord("SUPER+S");
                }
            }
            Action::Notifications => {
                if progress >= 1.0 {
                    self.chord("SUPER+V");
                }
            }
            Action::RunDialog => {
                if progress >= 1.0 {
                    self.chord("ALT+F2");
                }
            }
            Action::KeyboardMove => {
                if progress >= 1.0 {
                    self.chord("ALT+F7");
                }
            }
            Action::KeyboardResize => {
                if progress >= 1.0 {
                    self.chord("ALT+F8");
                }
            }
            Action::MaximizeWindow => self.maximize_or_toggle_fullscreen(ctx, progress),
            Action::RestoreWindow => self.restore(ctx, progress),
            Action::SnapWindowLeft => {
                if progress >= 0.2 {
                    self.chord("SUPER+LEFT");
                }
            }
            Action::SnapWindowRight => {
                if progress >= 0.2 {
                    self.chord("SUPER+RIGHT");
                }
            }
            Action::WorkspacePrev => {
                if progress >= 1.0 {
                    self.move_workspace(ctx, WorkspaceDir::Previous);
                }
            }
            Action::WorkspaceNext => {
                if progress >= 1.0 {
                    self.move_workspace(ctx, WorkspaceDir::Next);
                }
            }
            // media actions returned above
            Action::VolumeUp
            | Action::VolumeDown
            | Action::VolumeMute
            | Action::BrightnessUp
            | Action::BrightnessDown => {}
        }
    }

    fn on_config(&mut self, cfg: &super::EngineConfig) {
        self.set_options(ExecOptions {
            enable_fullscreen: cfg.toggles.enable_fullscreen,
        });
    }

    fn tick(&mut self, now_ms: u64) {
        if let Some(MediaState::Repeating {
            chord,
            next_due_ms,
            warmup,
        }) = &mut self.media
        {
            while now_ms >= *next_due_ms {
                *next_due_ms += REPEAT_INTERVAL_MS;
                if *warmup < REPEAT_WARMUP_TICKS {
                    *warmup += 1;
                } else {
                    let chord = *chord;
                    if let Err(e) = self.injector.borrow_mut().key_chord(chord) {
                        warn!("key chord '{chord}' failed: {e}");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::winsys::ChordWindowSystem;

    struct RecInjector(Rc<RefCell<Vec<String>>>);

    impl InputInjector for RecInjector {
        fn move_pointer(&mut self, _dx: f64, _dy: f64) -> anyhow::Result<()> {
            Ok(())
        }
        fn key_chord(&mut self, chord: &str) -> anyhow::Result<()> {
            self.0.borrow_mut().push(chord.to_string());
            Ok(())
        }
    }

    fn executor() -> (DesktopExecutor, Rc<RefCell<Vec<String>>>) {
        let chords = Rc::new(RefCell::new(Vec::new()));
        let inj: Rc<RefCell<dyn InputInjector>> =
            Rc::new(RefCell::new(RecInjector(chords.clone())));
        let ws: Rc<RefCell<dyn WindowSystem>> =
            Rc::new(RefCell::new(ChordWindowSystem::new(inj.clone())));
        (DesktopExecutor::new(ws, inj), chords)
    }

    fn ctx() -> ActionCtx {
        ActionCtx::default()
    }

    #[test]
    fn volume_held_at_full_progress_repeats_after_warmup() {
        let (mut ex, chords) = executor();
        ex.update(Action::VolumeUp, &ctx(), 1.0);
        assert_eq!(chords.borrow().len(), 1, "first press is immediate");
        // five warm-up intervals pass silently
        for t in [100, 200, 300, 400, 500] {
            ex.tick(t);
        }
        assert_eq!(chords.borrow().len(), 1);
        ex.tick(600);
        ex.tick(700);
        assert_eq!(chords.borrow().len(), 3, "repeats every interval after warm-up");
        ex.resolve(Action::VolumeUp, &ctx(), true, 1.0);
        ex.tick(800);
        assert_eq!(chords.borrow().len(), 3, "resolve stops the repeat");
    }

    #[test]
    fn mute_never_repeats() {
        let (mut ex, chords) = executor();
        let c = ActionCtx {
            time_ms: 0,
            ..ctx()
        };
        ex.update(Action::VolumeMute, &c, 1.0);
        ex.update(Action::VolumeMute, &c, 1.0);
        for t in [100, 200, 600, 700, 800] {
            ex.tick(t);
        }
        assert_eq!(chords.borrow().len(), 1);
    }

    #[test]
    fn partial_progress_never_presses_media_keys() {
        let (mut ex, chords) = executor();
        ex.update(Action::VolumeUp, &ctx(), 0.9);
        ex.resolve(Action::VolumeUp, &ctx(), true, 0.9);
        assert!(chords.borrow().is_empty());
    }

    #[test]
    fn snap_commits_from_a_fifth_of_progress() {
        let (mut ex, chords) = executor();
        ex.resolve(Action::SnapWindowLeft, &ctx(), true, 0.1);
        assert!(chords.borrow().is_empty(), "below the commit threshold");
        ex.resolve(Action::SnapWindowLeft, &ctx(), true, 0.3);
        assert_eq!(*chords.borrow(), ["SUPER+LEFT"]);
    }

    #[test]
    fn cancel_applies_no_effect() {
        let (mut ex, chords) = executor();
        ex.resolve(Action::CloseWindow, &ctx(), false, 1.0);
        ex.resolve(Action::AltTab, &ctx(), false, 1.0);
        assert!(chords.borrow().is_empty());
    }

    #[test]
    fn one_shot_actions_need_full_progress() {
        let (mut ex, chords) = executor();
        ex.resolve(Action::AltTab, &ctx(), true, 0.95);
        assert!(chords.borrow().is_empty());
        ex.resolve(Action::AltTab, &ctx(), true, 1.0);
        assert_eq!(*chords.borrow(), ["ALT+TAB"]);
    }
}
