use anyhow::{Result, anyhow};
use log::{info, warn};

use crate::engine::ports::InputInjector;

/// Virtual input device used for pointer tracking and key-chord fallback
/// actions (snap, alt-tab, media keys).
pub struct UinputSink {
    enabled: bool,
    #[allow(dead_code)]
    linux: Option<Box<LinuxUinput>>,
}

impl UinputSink {
    pub fn new() -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let dev = LinuxUinput::create()?;
            return Ok(Self {
                enabled: true,
                linux: Some(Box::new(dev)),
            });
        }
        #[allow(unreachable_code)]
        {
            warn!("uinput not available; running in NO-OP mode");
            Ok(Self {
                enabled: true,
                linux: None,
            })
        }
    }

    pub fn noop() -> Self {
        Self {
            enabled: true,
            linux: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, en: bool) {
        self.enabled = en;
    }

    /// Send a chord like "SUPER+LEFT" or single "TAB": press in order,
    /// release in reverse.
    pub fn send_chord(&mut self, chord: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            let parts: Vec<_> = chord
                .split('+')
                .map(|s| s.trim().to_ascii_uppercase())
                .collect();
            let mut keys = Vec::with_capacity(parts.len());
            for p in parts {
                keys.push(map_key(&p)?);
            }
            for k in &keys {
                dev.key_send(*k, 1)?;
            }
            dev.sync()?;
            for k in keys.iter().rev() {
                dev.key_send(*k, 0)?;
            }
            dev.sync()?;
        }
        Ok(())
    }

    pub fn send_pointer(&mut self, dx: f64, dy: f64) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            dev.move_relative(dx.round() as i32, dy.round() as i32)?;
        }
        Ok(())
    }
}

impl InputInjector for UinputSink {
    fn move_pointer(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.send_pointer(dx, dy)
    }

    fn key_chord(&mut self, chord: &str) -> Result<()> {
        self.send_chord(chord)
    }
}

#[cfg(target_os = "linux")]
#[derive(Clone, Copy)]
enum ChordKey {
    Key(uinput::event::keyboard::Key),
    Misc(uinput::event::keyboard::Misc),
}

#[cfg(target_os = "linux")]
fn map_key(tok: &str) -> Result<ChordKey> {
    use uinput::event::keyboard::{Key as K, Misc as M};
    let k = match tok {
        "CTRL" | "CONTROL" => ChordKey::Key(K::LeftControl),
        "ALT" => ChordKey::Key(K::LeftAlt),
        "SHIFT" => ChordKey::Key(K::LeftShift),
        "SUPER" | "META" | "WIN" => ChordKey::Key(K::LeftMeta),
        "TAB" => ChordKey::Key(K::Tab),
        "ESC" | "ESCAPE" => ChordKey::Key(K::Esc),
        "LEFT" => ChordKey::Key(K::Left),
        "RIGHT" => ChordKey::Key(K::Right),
        "UP" => ChordKey::Key(K::Up),
        "DOWN" => ChordKey::Key(K::Down),
        "A" => ChordKey::Key(K::A),
        "D" => ChordKey::Key(K::D),
        "H" => ChordKey::Key(K::H),
        "S" => ChordKey::Key(K::S),
        "V" => ChordKey::Key(K::V),
        "PAGEUP" => ChordKey::Key(K::PageUp),
        "PAGEDOWN" => ChordKey::Key(K::PageDown),
        "F2" => ChordKey::Key(K::F2),
        "F4" => ChordKey::Key(K::F4),
        "F7" => ChordKey::Key(K::F7),
        "F8" => ChordKey::Key(K::F8),
        "VOLUMEUP" => ChordKey::Key(K::VolumeUp),
        "VOLUMEDOWN" => ChordKey::Key(K::VolumeDown),
        "MUTE" => ChordKey::Key(K::Mute),
        "BRIGHTNESSUP" => ChordKey::Misc(M::BrightnessUp),
        "BRIGHTNESSDOWN" => ChordKey::Misc(M::BrightnessDown),
        other => return Err(anyhow!("unsupported key token: {other}")),
    };
    Ok(k)
}

#[cfg(target_os = "linux")]
struct LinuxUinput {
    dev: uinput::device::Device,
}

#[cfg(target_os = "linux")]
impl LinuxUinput {
    fn create() -> Result<Self> {
        use uinput::event::keyboard::{Key, Misc};
        use uinput::event::relative;

        let dev = uinput::default()?
            .name("Swipectl Virtual Input")?
            // relative axes for pointer tracking during move/resize
            .event(relative::Position::X)?
            .event(relative::Position::Y)?
            // modifiers
            .event(Key::LeftControl)?
            .event(Key::LeftAlt)?
            .event(Key::LeftShift)?
            .event(Key::LeftMeta)?
            // chord keys
            .event(Key::Tab)?
            .event(Key::Esc)?
            .event(Key::Left)?
            .event(Key::Right)?
            .event(Key::Up)?
            .event(Key::Down)?
            .event(Key::A)?
            .event(Key::D)?
            .event(Key::H)?
            .event(Key::S)?
            .event(Key::V)?
            .event(Key::PageUp)?
            .event(Key::PageDown)?
            .event(Key::F2)?
            .event(Key::F4)?
            .event(Key::F7)?
            .event(Key::F8)?
            // media and brightness
            .event(Key::VolumeUp)?
            .event(Key::VolumeDown)?
            .event(Key::Mute)?
            .event(Misc::BrightnessUp)?
            .event(Misc::BrightnessDown)?
            .create()?;

        info!("uinput: created virtual device");
        Ok(Self { dev })
    }

    fn sync(&mut self) -> Result<()> {
        self.dev.synchronize()?;
        Ok(())
    }

    fn key_send(&mut self, key: ChordKey, val: i32) -> Result<()> {
        match key {
            ChordKey::Key(k) => self.dev.send(k, val)?,
            ChordKey::Misc(m) => self.dev.send(m, val)?,
        }
        Ok(())
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()> {
        use uinput::event::relative::Position;
        if dx != 0 {
            self.dev.send(Position::X, dx)?;
        }
        if dy != 0 {
            self.dev.send(Position::Y, dy)?;
        }
        self.sync()
    }
}
