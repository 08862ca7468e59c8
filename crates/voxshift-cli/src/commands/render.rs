//! Offline rendering of WAV files.

use super::common::{OfflineRender, VoiceArgs};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use voxshift_analysis::block_level_db;
use voxshift_io::{WavSpec, read_wav, write_wav};

#[derive(Args)]
pub struct RenderArgs {
    /// Input WAV file (mixed down to mono)
    input: PathBuf,

    /// Output WAV file (mono)
    output: PathBuf,

    #[command(flatten)]
    voice: VoiceArgs,

    /// Silence appended so reverb and echo can ring out, seconds
    #[arg(long, default_value = "0.5")]
    tail: f32,

    /// Output bit depth (16, 24, or 32 for float)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Seed for the reverb impulse
    #[arg(long, default_value = "0")]
    seed: u64,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let preset = args.voice.load()?;
    let (samples, spec) = read_wav(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    println!("Rendering {} with voice '{}'", args.input.display(), preset.name);
    println!(
        "  {} Hz, {} channel(s), {:.2} s",
        spec.sample_rate,
        spec.channels,
        samples.len() as f32 / spec.sample_rate as f32
    );

    let render = OfflineRender {
        sample_rate: spec.sample_rate,
        tail_seconds: args.tail,
        seed: args.seed,
    };
    let settings = preset.settings;
    let output = render.run(&samples, preset.gate_threshold_db, |session| {
        session.update_settings(&settings);
        Ok(())
    })?;

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav(&args.output, &output, out_spec)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let peak = output.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    println!(
        "  level in {:.1} dB, out {:.1} dB, peak {:.3}",
        block_level_db(&samples),
        block_level_db(&output),
        peak
    );
    println!("Wrote {}", args.output.display());
    Ok(())
}
