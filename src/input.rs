//! Multitouch device discovery (evdev).

use evdev::{AbsoluteAxisCode, Device, EventType};
use log::warn;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

fn is_multitouch(dev: &Device) -> bool {
    if !dev.supported_events().contains(EventType::ABSOLUTE) {
        return false;
    }
    dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    })
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = std::fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            let is_event_node = p
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.starts_with("event"))
                .unwrap_or(false);
            if !is_event_node {
                continue;
            }
            if let Ok(dev) = Device::open(&p) {
                if is_multitouch(&dev) {
                    out.push(DeviceInfo {
                        path: p.display().to_string(),
                        name: dev.name().unwrap_or("unknown").to_string(),
                    });
                }
            }
        }
    }
    out
}

/// Open every discovered multitouch device in nonblocking mode.
pub fn open_multitouch() -> Vec<Device> {
    let mut devs = vec![];
    for d in discover_multitouch() {
        match Device::open(&d.path) {
            Ok(mut dev) => {
                if let Err(e) = dev.set_nonblocking(true) {
                    warn!("set_nonblocking failed for {}: {e}", d.path);
                }
                devs.push(dev);
            }
            Err(e) => warn!("failed to open {}: {e}", d.path),
        }
    }
    devs
}
