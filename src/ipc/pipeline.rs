use anyhow::Result;
use log::{info, warn};
use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use evdev::{AbsoluteAxisCode, EventType, SynchronizationCode};

use super::server::ProfileSlot;
use crate::actions::UinputSink;
use crate::engine::exec::DesktopExecutor;
use crate::engine::ports::{InputInjector, WindowSystem};
use crate::engine::{Engine, GestureKind};
use crate::gestures::GestureSynth;
use crate::input;
use crate::tracker::Tracker;
use crate::winsys::ChordWindowSystem;

pub fn run_pipeline(slot: Arc<Mutex<ProfileSlot>>) -> Result<()> {
    let mut devs = input::open_multitouch();
    if devs.is_empty() {
        warn!("no multitouch devices detected; pipeline idle");
        loop {
            thread::sleep(Duration::from_secs(1));
        }
    }

    let start = Instant::now();
    let injector = Rc::new(RefCell::new(UinputSink::new().unwrap_or_else(|e| {
        warn!("uinput unavailable ({e}); injection disabled");
        UinputSink::noop()
    })));
    let inj_dyn: Rc<RefCell<dyn InputInjector>> = injector;
    let ws: Rc<RefCell<dyn WindowSystem>> =
        Rc::new(RefCell::new(ChordWindowSystem::new(inj_dyn.clone())));
    let executor = Box::new(DesktopExecutor::new(ws.clone(), inj_dyn.clone()));

    let mut generation = u64::MAX;
    let mut engine = Engine::new(Default::default(), ws, inj_dyn, executor);

    let mut tracker = Tracker::new();
    let mut synth = GestureSynth::new();
    let mut grabbed = false;

    loop {
        // pick up profile changes pushed by the control plane
        {
            let s = slot.lock().unwrap();
            if s.generation != generation {
                generation = s.generation;
                engine.set_config(s.profile.engine_config());
                info!("pipeline: engine config updated (generation {generation})");
            }
        }

        let mut any_event = false;
        let mut frame_fingers: Option<usize> = None;

        for dev in devs.iter_mut() {
            if let Ok(events) = dev.fetch_events() {
                for ev in events {
                    any_event = true;

                    if ev.event_type() == EventType::ABSOLUTE {
                        match ev.code() {
                            c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => {
                                tracker.on_slot(ev.value());
                            }
                            c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                                tracker.on_tracking_id(ev.value());
                            }
                            c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => {
                                tracker.on_pos_x(ev.value());
                            }
                            c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => {
                                tracker.on_pos_y(ev.value());
                            }
                            _ => {}
                        }
                    } else if ev.event_type() == EventType::SYNCHRONIZATION
                        && ev.code() == SynchronizationCode::SYN_REPORT.0
                    {
                        let frame = tracker.on_syn_report();
                        frame_fingers = Some(frame.active_count);
                        for gev in synth.update(&frame) {
                            engine.handle(&gev);
                        }
                    }
                }
            }
        }

        // keep the devices grabbed while the engine claims the current
        // finger count, so the gestures don't leak into the desktop
        if let Some(n) = frame_fingers {
            let fingers = n.min(u8::MAX as usize) as u8;
            let want = engine.claims(&GestureKind::Swipe { dx: 0.0, dy: 0.0 }, fingers)
                || engine.claims(&GestureKind::Pinch { scale: 1.0 }, fingers);
            if want && !grabbed {
                for d in devs.iter_mut() {
                    let _ = d.grab();
                }
                grabbed = true;
                info!("grabbed touch devices ({fingers} fingers)");
            } else if !want && grabbed {
                for d in devs.iter_mut() {
                    let _ = d.ungrab();
                }
                grabbed = false;
                info!("released touch devices");
            }
        }

        engine.tick(start.elapsed().as_millis() as u64);

        if !any_event {
            // idle cadence matches the fling tick
            thread::sleep(Duration::from_millis(4));
        }
    }
}
