//! Cadena CLI - render audio files through the reorderable effect chain.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadena")]
#[command(author, version, about = "Cadena reorderable effect chain CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the chain
    Process(commands::process::ProcessArgs),

    /// List stage kinds and their parameters
    Stages(commands::stages::StagesArgs),

    /// Hammer the chain with reorders from a control thread
    Stress(commands::stress::StressArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Stages(args) => commands::stages::run(args),
        Commands::Stress(args) => commands::stress::run(args),
    }
}
