//! Bindable actions and the configuration tables that resolve them.

use serde::Deserialize;

/// Everything a gesture can be bound to. Identifiers are stable and appear
/// as plain integers in profiles; 0 disables a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MinimizeWindow,
    CloseWindow,
    ShowDesktop,
    AltTab,
    NextWindow,
    PrevWindow,
    Overview,
    ShowApps,
    QuickSettings,
    Notifications,
    RunDialog,
    KeyboardMove,
    KeyboardResize,
    VolumeUp,
    VolumeDown,
    VolumeMute,
    BrightnessUp,
    BrightnessDown,
    MaximizeWindow,
    RestoreWindow,
    SnapWindowLeft,
    SnapWindowRight,
    WorkspacePrev,
    WorkspaceNext,
}

impl Action {
    pub fn from_id(id: u16) -> Option<Action> {
        use Action::*;
        Some(match id {
            1 => MinimizeWindow,
            2 => CloseWindow,
            3 => ShowDesktop,
            4 => AltTab,
            5 => NextWindow,
            6 => PrevWindow,
            7 => Overview,
            8 => ShowApps,
            9 => QuickSettings,
            10 => Notifications,
            11 => RunDialog,
            12 => KeyboardMove,
            13 => KeyboardResize,
            14 => VolumeUp,
            15 => VolumeDown,
            16 => VolumeMute,
            17 => BrightnessUp,
            18 => BrightnessDown,
            19 => MaximizeWindow,
            20 => RestoreWindow,
            21 => SnapWindowLeft,
            22 => SnapWindowRight,
            23 => WorkspacePrev,
            24 => WorkspaceNext,
            _ => return None,
        })
    }

    pub const MAX_ID: u16 = 24;

    /// Actions that key-repeat while held at full progress.
    pub fn repeats(&self) -> bool {
        matches!(
            self,
            Action::VolumeUp | Action::VolumeDown | Action::BrightnessUp | Action::BrightnessDown
        )
    }
}

/// A committed swipe direction, including the documented two-axis combos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinchDir {
    In,
    Out,
}

/// Fully resolved gesture identity handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Swipe { fingers: u8, outcome: Outcome },
    Pinch { fingers: u8, dir: PinchDir },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SwipeBindings {
    pub up: u16,
    pub down: u16,
    pub left: u16,
    pub right: u16,
    pub up_left: u16,
    pub up_right: u16,
    pub down_left: u16,
    pub down_right: u16,
}

impl Default for SwipeBindings {
    fn default() -> Self {
        Self {
            up: 19,
            down: 20,
            left: 24,
            right: 23,
            up_left: 21,
            up_right: 22,
            down_left: 6,
            down_right: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinchBindings {
    #[serde(rename = "in")]
    pub pinch_in: u16,
    #[serde(rename = "out")]
    pub pinch_out: u16,
}

impl Default for PinchBindings {
    fn default() -> Self {
        Self {
            pinch_in: 1,
            pinch_out: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Bindings {
    pub swipe3: SwipeBindings,
    pub swipe4: SwipeBindings,
    pub pinch3: PinchBindings,
    pub pinch4: PinchBindings,
}

impl Bindings {
    pub fn resolve(&self, trigger: Trigger) -> Option<Action> {
        let id = match trigger {
            Trigger::Swipe { fingers, outcome } => {
                let table = if fingers == 3 { &self.swipe3 } else { &self.swipe4 };
                match outcome {
                    Outcome::Up => table.up,
                    Outcome::Down => table.down,
                    Outcome::Left => table.left,
                    Outcome::Right => table.right,
                    Outcome::UpLeft => table.up_left,
                    Outcome::UpRight => table.up_right,
                    Outcome::DownLeft => table.down_left,
                    Outcome::DownRight => table.down_right,
                }
            }
            Trigger::Pinch { fingers, dir } => {
                let table = if fingers == 3 { &self.pinch3 } else { &self.pinch4 };
                match dir {
                    PinchDir::In => table.pinch_in,
                    PinchDir::Out => table.pinch_out,
                }
            }
        };
        Action::from_id(id)
    }

    /// Every id referenced by the tables, for profile validation.
    pub fn ids(&self) -> [u16; 20] {
        [
            self.swipe3.up,
            self.swipe3.down,
            self.swipe3.left,
            self.swipe3.right,
            self.swipe3.up_left,
            self.swipe3.up_right,
            self.swipe3.down_left,
            self.swipe3.down_right,
            self.swipe4.up,
            self.swipe4.down,
            self.swipe4.left,
            self.swipe4.right,
            self.swipe4.up_left,
            self.swipe4.up_right,
            self.swipe4.down_left,
            self.swipe4.down_right,
            self.pinch3.pinch_in,
            self.pinch3.pinch_out,
            self.pinch4.pinch_in,
            self.pinch4.pinch_out,
        ]
    }
}
