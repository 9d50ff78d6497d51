// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scenecam - Virtual camera planner for scene cycles
//!
//! Compiles a cycle of scenes into a camera timeline and replays it:
//! - `compile` writes the timeline as JSON
//! - `play` replays a timeline file
//! - `run` does both in one go
//!
//! ## Architecture
//!
//! Compilation happens on the main thread. Playback runs on a dedicated
//! worker thread with its own async runtime, and receives the timeline only
//! in serialized form.

mod cli;
mod commands;
mod error;
mod playback;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "scenecam_app={default_level},scenecam_timeline={default_level}"
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting scenecam v{}", env!("CARGO_PKG_VERSION"));

    let result = commands::load_config(cli.config.as_deref())
        .and_then(|config| commands::execute(cli.command, &config));

    if let Err(e) = result {
        tracing::error!("scenecam failed: {e}");
        std::process::exit(1);
    }
}
