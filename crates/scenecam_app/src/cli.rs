// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line interface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Scenecam - plan and replay virtual camera moves across a scene cycle
#[derive(Parser, Debug)]
#[command(name = "scenecam")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a scene cycle into a timeline file
    Compile {
        #[command(flatten)]
        cycle: CycleArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play a compiled timeline file
    Play {
        /// Timeline JSON file
        timeline: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Compile a scene cycle and play it immediately
    Run {
        #[command(flatten)]
        cycle: CycleArgs,

        #[command(flatten)]
        playback: PlaybackArgs,
    },
}

/// Which scenes to compile and how
#[derive(Args, Debug)]
pub struct CycleArgs {
    /// Scene catalog (RON, or JSON by extension)
    #[arg(long)]
    pub catalog: PathBuf,

    /// Scene IDs in cycle order (every catalog scene when omitted)
    #[arg(short, long = "scene")]
    pub scenes: Vec<String>,

    /// Seed for random start poses (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Playback controls
#[derive(Args, Debug)]
pub struct PlaybackArgs {
    /// Cancel playback after this many milliseconds
    #[arg(long)]
    pub cancel_after_ms: Option<u64>,

    /// Pull the camera in from behind before the first scene
    #[arg(long)]
    pub intro: bool,
}
