//! Live voice changing from microphone to output device.
//!
//! While running, lines typed on stdin control the session:
//!
//! - `b` toggles bypass
//! - `g <db>` sets the noise gate threshold
//! - a preset name switches voice
//! - `q` quits (so does Ctrl+C)

use super::common::VoiceArgs;
use anyhow::Context;
use clap::Args;
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use voxshift_config::resolve_preset;
use voxshift_engine::{NativeConfig, NativeHost, VoiceSession};
use voxshift_io::{CpalBackend, list_devices, resolve_device_name, select_devices};

/// How often the level meter redraws.
const METER_INTERVAL: Duration = Duration::from_millis(100);
/// Width of the meter bar, characters.
const METER_WIDTH: usize = 30;
/// Level shown as an empty bar, dBFS.
const METER_FLOOR_DB: f32 = -60.0;

#[derive(Args)]
pub struct LiveArgs {
    /// Microphone (exact or partial name; default input if omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Output device (exact or partial name; default output if omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Pick a microphone and a virtual cable output automatically
    #[arg(long)]
    auto_route: bool,

    #[command(flatten)]
    voice: VoiceArgs,

    /// Sample rate
    #[arg(long, default_value = "44100")]
    sample_rate: u32,

    /// Buffer size
    #[arg(long, default_value = "256")]
    buffer_size: u32,

    /// Don't draw the level meter
    #[arg(long)]
    no_meter: bool,
}

/// One line of live input.
#[derive(Debug, Clone, PartialEq)]
enum LiveCommand {
    ToggleBypass,
    Quit,
    Gate(f32),
    Preset(String),
    Help,
    Empty,
    Invalid(String),
}

fn parse_command(line: &str) -> LiveCommand {
    let line = line.trim();
    match line {
        "" => LiveCommand::Empty,
        "b" => LiveCommand::ToggleBypass,
        "q" => LiveCommand::Quit,
        "h" | "?" => LiveCommand::Help,
        "g" => LiveCommand::Invalid("usage: g <threshold dB>".to_string()),
        _ => match line.strip_prefix("g ") {
            Some(value) => match value.trim().parse::<f32>() {
                Ok(db) => LiveCommand::Gate(db),
                Err(_) => LiveCommand::Invalid(format!("not a number: '{}'", value.trim())),
            },
            None => LiveCommand::Preset(line.to_string()),
        },
    }
}

fn print_help() {
    println!("  b          toggle bypass");
    println!("  g <db>     set gate threshold (e.g. g -45)");
    println!("  <preset>   switch voice (natural, girl, woman, man, uncle, demon, robot, radio)");
    println!("  q          quit");
}

/// Render a level as a fixed-width bar with the gate threshold marked.
fn meter_bar(level_db: f32, threshold_db: f32) -> String {
    let position = |db: f32| {
        let t = ((db - METER_FLOOR_DB) / -METER_FLOOR_DB).clamp(0.0, 1.0);
        (t * METER_WIDTH as f32).round() as usize
    };
    let filled = position(level_db);
    let mark = position(threshold_db).min(METER_WIDTH - 1);
    (0..METER_WIDTH)
        .map(|i| match (i < filled, i == mark) {
            (_, true) => '|',
            (true, false) => '#',
            (false, false) => ' ',
        })
        .collect()
}

/// Stdin lines, read on a background thread. Disconnects at end of input.
fn stdin_lines() -> Receiver<String> {
    let (tx, rx) = bounded(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub fn run(args: LiveArgs) -> anyhow::Result<()> {
    let preset = args.voice.load()?;

    let (input, output) = if args.auto_route {
        let route = select_devices(&list_devices()?);
        (args.input.or(route.input), args.output.or(route.output))
    } else {
        (args.input, args.output)
    };
    // Streams open devices by exact name only.
    let input = input
        .map(|name| resolve_device_name(&name, true))
        .transpose()
        .context("finding microphone")?;
    let output = output
        .map(|name| resolve_device_name(&name, false))
        .transpose()
        .context("finding output device")?;

    let config = NativeConfig {
        sample_rate: args.sample_rate,
        buffer_size: args.buffer_size,
        output_device: output.clone(),
    };
    let host = Arc::new(
        NativeHost::new(CpalBackend::new(), config).context("opening output device")?,
    );
    let mut session = VoiceSession::new(Arc::clone(&host));
    session.set_gate_threshold(preset.gate_threshold_db);
    session
        .initialize(input.as_deref())
        .context("opening microphone")?;
    let mut settings = preset.settings;
    session.update_settings(&settings);

    println!("Live voice: {}", preset.name);
    println!("  Input:  {}", input.as_deref().unwrap_or("<default>"));
    println!("  Output: {}", output.as_deref().unwrap_or("<default>"));
    println!("  Gate:   {:.1} dB", session.gate_threshold());
    println!();
    print_help();
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut lines = stdin_lines();
    let tap = session.analysis_tap();

    while running.load(Ordering::SeqCst) {
        let line = match lines.recv_timeout(METER_INTERVAL) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                if let (Some(tap), false) = (&tap, args.no_meter) {
                    let level = tap.level_db();
                    print!(
                        "\r  [{}] {:>6.1} dB ",
                        meter_bar(level, session.gate_threshold()),
                        level.max(-99.9)
                    );
                    let _ = std::io::stdout().flush();
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Stdin closed; keep running until Ctrl+C.
                lines = crossbeam_channel::never();
                continue;
            }
        };

        match parse_command(&line) {
            LiveCommand::Quit => break,
            LiveCommand::ToggleBypass => {
                settings.bypass = !settings.bypass;
                session.update_settings(&settings);
                println!("\nBypass {}", if settings.bypass { "on" } else { "off" });
            }
            LiveCommand::Gate(db) => {
                session.set_gate_threshold(db);
                println!("\nGate threshold {db:.1} dB");
            }
            LiveCommand::Preset(name) => match resolve_preset(&name) {
                Ok(preset) => {
                    settings = preset.settings.with_bypass(settings.bypass);
                    session.update_settings(&settings);
                    session.set_gate_threshold(preset.gate_threshold_db);
                    println!("\nVoice: {}", preset.name);
                }
                Err(err) => println!("\n{err}"),
            },
            LiveCommand::Help => print_help(),
            LiveCommand::Invalid(msg) => println!("\n{msg}"),
            LiveCommand::Empty => {}
        }
    }

    println!("\nStopping...");
    session.stop();
    let dropped = host.dropped_blocks();
    if dropped > 0 {
        tracing::warn!(dropped, "capture blocks dropped during the session");
    }
    let dropped = host.dropped_commands();
    if dropped > 0 {
        tracing::warn!(dropped, "control changes dropped while output was stalled");
    }
    println!("Done!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_lines() {
        assert_eq!(parse_command("b"), LiveCommand::ToggleBypass);
        assert_eq!(parse_command(" q \n"), LiveCommand::Quit);
        assert_eq!(parse_command("g -42.5"), LiveCommand::Gate(-42.5));
        assert_eq!(parse_command("robot"), LiveCommand::Preset("robot".into()));
        assert_eq!(parse_command("girl"), LiveCommand::Preset("girl".into()));
        assert_eq!(parse_command(""), LiveCommand::Empty);
        assert!(matches!(parse_command("g loud"), LiveCommand::Invalid(_)));
        assert!(matches!(parse_command("g"), LiveCommand::Invalid(_)));
    }

    #[test]
    fn meter_marks_threshold() {
        let bar = meter_bar(-30.0, -50.0);
        assert_eq!(bar.chars().count(), METER_WIDTH);
        assert_eq!(bar.chars().position(|c| c == '|'), Some(5));
        assert_eq!(bar.chars().filter(|&c| c == '#').count(), 14);
    }

    #[test]
    fn meter_clamps_extremes() {
        assert!(meter_bar(-200.0, -50.0).chars().all(|c| c != '#'));
        assert_eq!(meter_bar(6.0, 0.0).chars().last(), Some('|'));
    }
}
