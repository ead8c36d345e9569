//! CLI Module
//!
//! Command-line interface for the NeuroHarmonic entrainment engine.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NeuroHarmonic - binaural beat and brainwave entrainment engine
#[derive(Parser, Debug)]
#[command(name = "neuroharmonic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in protocol library
    #[command(name = "list")]
    List {
        /// Restrict to one category (emotional, physical, cognitive,
        /// spiritual, adhd)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show one protocol in detail
    #[command(name = "info")]
    Info {
        /// Protocol id (see `list`)
        id: String,
    },

    /// Play a protocol session in real time
    #[command(name = "play")]
    Play {
        /// Protocol id (see `list`)
        id: String,

        /// Master volume, 0.0-1.0
        #[arg(short = 'V', long, default_value_t = 0.5)]
        volume: f32,
    },

    /// Render a protocol session to a WAV file, faster than real time
    #[command(name = "render")]
    Render {
        /// Protocol id (see `list`)
        id: String,

        /// Output WAV path
        #[arg(short, long)]
        out: PathBuf,

        /// Render only the first N seconds of the session
        #[arg(short, long)]
        seconds: Option<f64>,
    },
}
