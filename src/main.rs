//! NeuroHarmonic CLI - Brainwave Entrainment Engine
//!
//! Command-line interface for the NeuroHarmonic entrainment engine.

use clap::Parser;
use env_logger::Env;
use log::info;

use neuroharmonic::cli::{commands, Cli, Commands};
use neuroharmonic::Result;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    info!("NeuroHarmonic v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("NeuroHarmonic v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { category } => commands::list(category.as_deref()),
        Commands::Info { id } => commands::show_info(&id),
        Commands::Play { id, volume } => commands::play(&id, volume),
        Commands::Render { id, out, seconds } => commands::render(&id, &out, seconds),
    }
}
