//! Voxshift CLI - real-time and offline voice changing.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voxshift")]
#[command(author, version, about = "Voxshift voice changer", long_about = None)]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List audio devices and the suggested routing
    Devices(commands::devices::DevicesArgs),

    /// Change your voice live, from microphone to output device
    Live(commands::live::LiveArgs),

    /// Run a WAV file through the voice changer
    Render(commands::render::RenderArgs),

    /// List, show and copy voice presets
    Presets(commands::presets::PresetsArgs),

    /// Apply settings from a generator's JSON response
    GenerateApply(commands::generate::GenerateArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Live(args) => commands::live::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::GenerateApply(args) => commands::generate::run(args),
    }
}
