//! Multi-finger touchpad gestures turned into window-management actions.
//!
//! The core lives in [`engine`]: a host feeds it gesture events and timer
//! ticks, and it drives window-system and input-injection ports. The rest
//! of the crate is the Linux daemon host: evdev capture, uinput injection,
//! TOML profiles and a Unix-socket control CLI.

pub mod actions;
pub mod cli;
pub mod config;
pub mod engine;
pub mod gestures;
pub mod input;
pub mod ipc;
pub mod logging;
pub mod tracker;
pub mod winsys;
