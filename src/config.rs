use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::engine::action::{Action, Bindings};
use crate::engine::{self, EngineConfig, FeatureToggles};
use crate::input;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Gestures {
    /// Window gestures on three fingers; four stay with the shell.
    pub three_finger: bool,
    pub use_active_window: bool,
    pub tap_hold_move: bool,
    pub pinch: bool,
}

impl Default for Gestures {
    fn default() -> Self {
        Self {
            three_finger: true,
            use_active_window: false,
            tap_hold_move: true,
            pinch: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Functions {
    #[serde(rename = "move")]
    pub move_window: bool,
    pub resize: bool,
    pub fullscreen: bool,
    pub maximized_snap: bool,
    pub move_snap: bool,
}

impl Default for Functions {
    fn default() -> Self {
        Self {
            move_window: true,
            resize: true,
            fullscreen: true,
            maximized_snap: true,
            move_snap: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub edge_size: f64,
    pub top_edge_size: f64,
    pub gesture_threshold: f64,
    pub cancel_threshold: f64,
    pub acceleration: f64,
    pub pinch_in_scale: f64,
    pub pinch_out_scale: f64,
    pub hold_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        let t = engine::Thresholds::default();
        Self {
            edge_size: t.edge_size,
            top_edge_size: t.top_edge_size,
            gesture_threshold: t.gesture_threshold,
            cancel_threshold: t.cancel_threshold,
            acceleration: t.acceleration,
            pinch_in_scale: t.pinch_in_scale,
            pinch_out_scale: t.pinch_out_scale,
            hold_ms: t.hold_ms,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Blacklist {
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub meta: Meta,
    pub gestures: Gestures,
    pub functions: Functions,
    pub thresholds: Thresholds,
    pub blacklist: Blacklist,
    pub bindings: Bindings,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("thresholds.{0} must be positive")]
    NonPositiveThreshold(&'static str),
    #[error("cancel threshold must stay below the gesture threshold")]
    CancelAboveGesture,
    #[error("pinch_in_scale must be in (0,1), got {0}")]
    PinchInScale(f64),
    #[error("pinch_out_scale must be above 1.0, got {0}")]
    PinchOutScale(f64),
    #[error("unknown action id {0} in bindings")]
    UnknownAction(u16),
}

fn validate_profile(p: &Profile) -> Result<(), ProfileError> {
    let t = &p.thresholds;
    for (name, v) in [
        ("edge_size", t.edge_size),
        ("top_edge_size", t.top_edge_size),
        ("gesture_threshold", t.gesture_threshold),
        ("cancel_threshold", t.cancel_threshold),
        ("acceleration", t.acceleration),
    ] {
        if v <= 0.0 {
            return Err(ProfileError::NonPositiveThreshold(name));
        }
    }
    if t.cancel_threshold >= t.gesture_threshold {
        return Err(ProfileError::CancelAboveGesture);
    }
    if !(0.0..1.0).contains(&t.pinch_in_scale) || t.pinch_in_scale == 0.0 {
        return Err(ProfileError::PinchInScale(t.pinch_in_scale));
    }
    if t.pinch_out_scale <= 1.0 {
        return Err(ProfileError::PinchOutScale(t.pinch_out_scale));
    }
    if t.hold_ms == 0 {
        return Err(ProfileError::NonPositiveThreshold("hold_ms"));
    }
    for id in p.bindings.ids() {
        if id != 0 && Action::from_id(id).is_none() {
            return Err(ProfileError::UnknownAction(id));
        }
    }
    Ok(())
}

impl Profile {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            window_fingers: if self.gestures.three_finger { 3 } else { 4 },
            use_active_window: self.gestures.use_active_window,
            tap_hold: self.gestures.tap_hold_move,
            pinch_enabled: self.gestures.pinch,
            thresholds: engine::Thresholds {
                edge_size: self.thresholds.edge_size,
                top_edge_size: self.thresholds.top_edge_size,
                gesture_threshold: self.thresholds.gesture_threshold,
                cancel_threshold: self.thresholds.cancel_threshold,
                acceleration: self.thresholds.acceleration,
                pinch_in_scale: self.thresholds.pinch_in_scale,
                pinch_out_scale: self.thresholds.pinch_out_scale,
                hold_ms: self.thresholds.hold_ms,
            },
            toggles: FeatureToggles {
                enable_move: self.functions.move_window,
                enable_resize: self.functions.resize,
                enable_fullscreen: self.functions.fullscreen,
                enable_maximized_snap: self.functions.maximized_snap,
                enable_move_snap: self.functions.move_snap,
            },
            bindings: self.bindings,
            blacklist: self.blacklist.classes.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
    pub detected_devices: Vec<String>,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot resolve home directory"))?;
    Ok(dirs.home_dir().join(".config").join("swipectl"))
}

fn profiles_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join("profiles"))
}

fn active_ptr_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("active"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl DaemonConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        let cfgdir = config_dir()?;
        let profdir = profiles_dir()?;
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = active_ptr_path()?;
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = Self::load_profile(&active_name)?;
        let detected_devices = input::discover_multitouch()
            .into_iter()
            .map(|d| format!("{} ({})", d.name, d.path))
            .collect();

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
            detected_devices,
        })
    }

    /// Reload the active profile; on failure the last good profile stays.
    pub fn reload(&mut self) -> Result<()> {
        self.profile = Self::load_profile(&self.active_name)?;
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.reload()?;
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    fn load_profile(name: &str) -> Result<Profile> {
        let path = profiles_dir()?.join(format!("{name}.toml"));
        let txt = fs::read_to_string(&path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        let profile: Profile =
            toml::from_str(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        let uinput_ok = Path::new("/dev/uinput").exists();
        let in_input_group = check_in_input_group();
        serde_json::json!({
            "uinput_present": uinput_ok,
            "input_group_member": in_input_group,
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "devices": self.detected_devices,
            "hints": {
                "udev_rule": "/etc/udev/rules.d/80-uinput.rules",
                "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
            }
        })
    }
}

fn check_in_input_group() -> bool {
    if let Ok(s) = fs::read_to_string("/etc/group") {
        let user = whoami::username();
        for line in s.lines() {
            if line.starts_with("input:") {
                if line
                    .split(':')
                    .nth(3)
                    .unwrap_or("")
                    .split(',')
                    .any(|u| u == user)
                {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_uses_documented_defaults() {
        let p: Profile = toml::from_str("").expect("empty profile parses");
        assert!(validate_profile(&p).is_ok());
        let cfg = p.engine_config();
        assert_eq!(cfg.window_fingers, 3);
        assert_eq!(cfg.thresholds.gesture_threshold, 32.0);
        assert_eq!(cfg.thresholds.cancel_threshold, 8.0);
    }

    #[test]
    fn bundled_default_profile_is_valid() {
        let p: Profile = toml::from_str(default_profile_text()).expect("default profile parses");
        assert!(validate_profile(&p).is_ok());
    }

    #[test]
    fn unknown_binding_id_is_rejected() {
        let p: Profile = toml::from_str("[bindings.swipe3]\nup = 99\n").unwrap();
        assert!(matches!(
            validate_profile(&p),
            Err(ProfileError::UnknownAction(99))
        ));
    }

    #[test]
    fn zero_binding_disables_without_error() {
        let p: Profile = toml::from_str("[bindings.pinch3]\nin = 0\n").unwrap();
        assert!(validate_profile(&p).is_ok());
    }

    #[test]
    fn cancel_threshold_must_be_below_gesture_threshold() {
        let p: Profile =
            toml::from_str("[thresholds]\ngesture_threshold = 16.0\ncancel_threshold = 20.0\n")
                .unwrap();
        assert!(matches!(
            validate_profile(&p),
            Err(ProfileError::CancelAboveGesture)
        ));
    }

    #[test]
    fn four_finger_mode_maps_to_engine_config() {
        let p: Profile = toml::from_str("[gestures]\nthree_finger = false\n").unwrap();
        assert_eq!(p.engine_config().window_fingers, 4);
    }
}
