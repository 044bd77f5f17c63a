use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::{env, process::Command};

use crate::ipc;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // Hidden daemon mode (spawned by `start`)
    if pargs.contains("--daemon") {
        return ipc::run_daemon();
    }

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("start") => {
            let exe = std::env::current_exe()?;
            let child = Command::new(exe).arg("--daemon").spawn()?;
            println!("swipectl: started daemon (pid={})", child.id());
            Ok(())
        }

        Some("stop") => {
            let r = ipc::client_request(serde_json::json!({"op":"shutdown"}))?;
            print_response(&r);
            Ok(())
        }

        Some("status") => {
            let r = ipc::client_request(serde_json::json!({"op":"status"}))?;
            print_response(&r);
            Ok(())
        }

        Some("reload") => {
            let r = ipc::client_request(serde_json::json!({"op":"reload"}))?;
            print_response(&r);
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: swipectl use <profile_name>"))?;
            let r = ipc::client_request(serde_json::json!({"op":"use","profile":name}))?;
            print_response(&r);
            Ok(())
        }

        Some("list") => {
            let r = ipc::client_request(serde_json::json!({"op":"list"}))?;
            print_response(&r);
            Ok(())
        }

        Some("doctor") => {
            let r = ipc::client_request(serde_json::json!({"op":"doctor"}))?;
            print_response(&r);
            Ok(())
        }

        Some("emit") => {
            // usage:
            //   swipectl emit key SUPER+LEFT
            //   swipectl emit pointer 10 -5
            let what: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: swipectl emit <key|pointer> ..."))?;
            let mut sink = crate::actions::UinputSink::new()?;
            match what.as_str() {
                "key" => {
                    let chord: String = pargs
                        .free_from_str()
                        .map_err(|_| anyhow!("usage: swipectl emit key SUPER+LEFT"))?;
                    sink.send_chord(&chord)?;
                    println!("ok: sent key chord {chord}");
                }
                "pointer" => {
                    let dx: f64 = pargs
                        .free_from_str()
                        .map_err(|_| anyhow!("usage: swipectl emit pointer <dx> <dy>"))?;
                    let dy: f64 = pargs
                        .free_from_str()
                        .map_err(|_| anyhow!("usage: swipectl emit pointer <dx> <dy>"))?;
                    sink.send_pointer(dx, dy)?;
                    println!("ok: moved pointer by ({dx}, {dy})");
                }
                other => return Err(anyhow!("unknown emit kind: {other}")),
            }
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"swipectl — touchpad window gestures daemon

USAGE:
  swipectl help [command]          Show general or command-specific help
  swipectl start                   Start the daemon
  swipectl stop                    Stop the daemon
  swipectl status                  Show daemon state
  swipectl reload                  Reload active profile
  swipectl use <name>              Switch active profile
  swipectl list                    List profiles
  swipectl doctor                  Diagnose permissions/devices
  swipectl emit key SUPER+LEFT     Emit a key chord
  swipectl emit pointer <dx> <dy>  Emit relative pointer motion

TIPS:
  - Profiles: ~/.config/swipectl/profiles
  - Active profile pointer: ~/.config/swipectl/active
  - Profiles reload automatically when edited
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "start" => println!("usage: swipectl start\nStarts the background daemon."),
        "stop" => println!("usage: swipectl stop\nStops the running daemon."),
        "status" => println!(
            "usage: swipectl status\nShows enabled flag, active profile, devices, socket."
        ),
        "reload" => println!(
            "usage: swipectl reload\nReloads the current profile; keeps last good on error."
        ),
        "use" => {
            println!("usage: swipectl use <name>\nSwitches active profile to <name> and reloads.")
        }
        "list" => {
            println!("usage: swipectl list\nLists available profiles.")
        }
        "doctor" => println!(
            "usage: swipectl doctor\nChecks permissions and lists detected multitouch devices."
        ),
        "emit" => println!(
            "usage:\n  swipectl emit key SUPER+LEFT\n  swipectl emit pointer <dx> <dy>"
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
