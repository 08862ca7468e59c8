//! Settings from a text-to-parameters generator response.
//!
//! The generator itself runs elsewhere; this command takes the JSON it
//! returned, shows what it would do to the voice, and optionally saves it as
//! a preset or previews it on a WAV file.

use super::common::OfflineRender;
use super::presets::print_settings;
use anyhow::Context;
use clap::Args;
use std::io::Read;
use std::path::{Path, PathBuf};
use voxshift_config::Preset;
use voxshift_config::paths::ensure_user_presets_dir;
use voxshift_engine::{
    DEFAULT_GATE_THRESHOLD_DB, JsonSettingsGenerator, SettingsGenerator, apply_generated,
};
use voxshift_io::{WavSpec, read_wav, write_wav};

#[derive(Args)]
pub struct GenerateArgs {
    /// Generator response file ("-" reads stdin)
    #[arg(short, long)]
    response: PathBuf,

    /// The description the response was generated for
    #[arg(long, default_value = "")]
    prompt: String,

    /// Save the result as a user preset with this name
    #[arg(long)]
    save: Option<String>,

    /// WAV file to preview the generated voice on
    #[arg(long, requires = "preview_out")]
    preview_in: Option<PathBuf>,

    /// Where to write the preview
    #[arg(long, requires = "preview_in")]
    preview_out: Option<PathBuf>,
}

fn read_response(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let response = read_response(&args.response)
        .with_context(|| format!("reading response {}", args.response.display()))?;
    let generator =
        JsonSettingsGenerator::new(|_prompt: &str| Ok::<_, std::io::Error>(response.clone()));

    let settings = match (&args.preview_in, &args.preview_out) {
        (Some(input), Some(output)) => {
            let (samples, spec) =
                read_wav(input).with_context(|| format!("reading {}", input.display()))?;
            let render = OfflineRender {
                sample_rate: spec.sample_rate,
                tail_seconds: 0.5,
                seed: 0,
            };
            let mut generated = None;
            let rendered = render.run(&samples, DEFAULT_GATE_THRESHOLD_DB, |session| {
                generated = Some(apply_generated(session, &generator, &args.prompt)?);
                Ok(())
            })?;
            let out_spec = WavSpec {
                channels: 1,
                sample_rate: spec.sample_rate,
                bits_per_sample: 32,
            };
            write_wav(output, &rendered, out_spec)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Preview written to {}", output.display());
            generated.context("generator produced no settings")?
        }
        _ => generator
            .generate(&args.prompt)
            .context("parsing generator response")?,
    };

    let name = args.save.clone().unwrap_or_else(|| "Generated".to_string());
    let mut preset = Preset::new(&name).with_settings(settings);
    if !args.prompt.is_empty() {
        preset = preset.with_description(args.prompt.clone());
    }

    println!("Generated voice");
    print_settings(&preset);
    for warning in preset.validate() {
        println!("  warning: {warning} (applied as given)");
    }

    if args.save.is_some() {
        let dir = ensure_user_presets_dir()?;
        let path = dir.join(format!("{}.toml", name.to_lowercase().replace(' ', "_")));
        preset
            .save(&path)
            .with_context(|| format!("saving {}", path.display()))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
