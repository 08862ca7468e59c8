//! Preset management commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::Path;
use voxshift_config::paths::{ensure_user_presets_dir, preset_name_from_path};
use voxshift_config::{
    Preset, factory_preset_names, get_factory_preset, list_user_presets, resolve_preset,
    user_presets_dir,
};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: Option<PresetsCommand>,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory and user presets
    List,

    /// Show a preset's settings
    Show {
        /// Preset name or path
        name: String,
    },

    /// Copy a preset into the user presets directory for editing
    Copy {
        /// Preset to copy
        source: String,

        /// Name for the copy (defaults to the source name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing user preset
        #[arg(long)]
        force: bool,
    },

    /// Show the user presets directory
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(PresetsCommand::List) {
        PresetsCommand::List => list(),
        PresetsCommand::Show { name } => show(&name),
        PresetsCommand::Copy {
            source,
            name,
            force,
        } => copy(&source, name.as_deref(), force),
        PresetsCommand::Paths => {
            println!("User presets: {}", user_presets_dir().display());
            Ok(())
        }
    }
}

fn list() -> anyhow::Result<()> {
    println!("Factory Presets");
    println!("===============\n");
    for id in factory_preset_names() {
        if let Some(preset) = get_factory_preset(id) {
            println!(
                "  {:<10} {:<16} {}",
                id,
                preset.name,
                preset.description.as_deref().unwrap_or("")
            );
        }
    }

    let user = list_user_presets();
    if !user.is_empty() {
        println!("\nUser Presets ({})", user_presets_dir().display());
        for path in user {
            let name = preset_name_from_path(&path).unwrap_or_default();
            match Preset::load(&path) {
                Ok(preset) => println!("  {:<10} {}", name, preset.name),
                Err(err) => println!("  {name:<10} (unreadable: {err})"),
            }
        }
    }
    Ok(())
}

fn show(name: &str) -> anyhow::Result<()> {
    let preset = resolve_preset(name)?;
    println!("{}", preset.name);
    if let Some(description) = &preset.description {
        println!("  {description}");
    }
    println!();
    print_settings(&preset);

    let warnings = preset.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("  {warning}");
        }
    }
    Ok(())
}

/// Print a preset's values, one per line.
pub fn print_settings(preset: &Preset) {
    let s = &preset.settings;
    println!("  pitch        {:>8.2} st", s.pitch);
    println!("  robotFreq    {:>8.2} Hz", s.robot_freq);
    println!("  distortion   {:>8.2}", s.distortion);
    println!("  filterFreq   {:>8.0} Hz", s.filter_freq);
    println!("  gain         {:>8.2}", s.gain);
    println!("  dryWet       {:>8.2}", s.dry_wet);
    println!("  bypass       {:>8}", s.bypass);
    println!("  clarity      {:>8.2}", s.clarity);
    println!("  resonance    {:>8.2}", s.resonance);
    println!("  gate         {:>8.1} dB", preset.gate_threshold_db);
}

fn copy(source: &str, name: Option<&str>, force: bool) -> anyhow::Result<()> {
    let mut preset = resolve_preset(source)?;
    let file_stem = name
        .map(str::to_string)
        .or_else(|| preset_name_from_path(Path::new(source)))
        .unwrap_or_else(|| "preset".to_string())
        .to_lowercase()
        .replace(' ', "_");
    if let Some(name) = name {
        preset.name = name.to_string();
    }

    let dir = ensure_user_presets_dir()?;
    let path = dir.join(format!("{file_stem}.toml"));
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    preset
        .save(&path)
        .with_context(|| format!("saving {}", path.display()))?;
    println!("Saved '{}' to {}", preset.name, path.display());
    Ok(())
}
