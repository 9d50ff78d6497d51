// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command handlers.

use crate::cli::{Commands, CycleArgs, PlaybackArgs};
use crate::error::{AppError, AppResult};
use crate::playback::{PlaybackReport, PlaybackRequest, PlaybackWorker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scenecam_timeline::{
    PlaybackOutcome, SceneCatalog, SceneId, SceneRef, ScenecamConfig, Timeline, TimelineCompiler,
};
use std::path::Path;
use std::time::Duration;

/// Run a parsed command
pub fn execute(command: Commands, config: &ScenecamConfig) -> AppResult<()> {
    match command {
        Commands::Compile { cycle, output } => {
            let timeline = compile(&cycle, config)?;
            let json = timeline.to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    tracing::info!(path = %path.display(), "Wrote timeline");
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Commands::Play { timeline, playback } => {
            let json = std::fs::read_to_string(&timeline)?;
            let report = play(json, &playback, config)?;
            summarize(&report);
            Ok(())
        }
        Commands::Run { cycle, playback } => {
            let timeline = compile(&cycle, config)?;
            let report = play(timeline.to_json()?, &playback, config)?;
            summarize(&report);
            Ok(())
        }
    }
}

/// Load the config file, or use defaults
pub fn load_config(path: Option<&Path>) -> AppResult<ScenecamConfig> {
    match path {
        Some(path) => Ok(ScenecamConfig::load(path)?),
        None => Ok(ScenecamConfig::default()),
    }
}

/// Pick the scenes to compile, in order
pub fn resolve_cycle(catalog: &SceneCatalog, ids: &[String]) -> AppResult<Vec<SceneRef>> {
    let cycle = if ids.is_empty() {
        catalog.cycle()
    } else {
        ids.iter()
            .map(|id| {
                catalog
                    .scene(&SceneId::new(id.as_str()))
                    .map(|scene| scene.to_ref())
                    .ok_or_else(|| AppError::UnknownScene(id.clone()))
            })
            .collect::<AppResult<Vec<_>>>()?
    };

    if cycle.is_empty() {
        return Err(AppError::EmptyCycle);
    }
    Ok(cycle)
}

fn compile(args: &CycleArgs, config: &ScenecamConfig) -> AppResult<Timeline> {
    let catalog = SceneCatalog::load(&args.catalog)?;
    let cycle = resolve_cycle(&catalog, &args.scenes)?;

    let mut rng = match args.seed.or(config.seed) {
        Some(seed) => {
            tracing::debug!(seed, "Seeded start poses");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let timeline = TimelineCompiler::new(&catalog, &config.timeline).compile(&cycle, &mut rng);
    timeline.validate()?;
    Ok(timeline)
}

fn play(
    timeline_json: String,
    args: &PlaybackArgs,
    config: &ScenecamConfig,
) -> AppResult<PlaybackReport> {
    let mut worker =
        PlaybackWorker::spawn(config.playback.clone(), config.timeline.center_distance);
    let report = worker.play(PlaybackRequest {
        timeline_json,
        cancel_after: args.cancel_after_ms.map(Duration::from_millis),
        intro: args.intro,
    });
    worker.shutdown();
    report
}

fn summarize(report: &PlaybackReport) {
    let pose = report.pose;
    match report.outcome {
        PlaybackOutcome::Completed => tracing::info!(
            timeline = %report.timeline.0,
            frames = report.frames,
            "Playback finished"
        ),
        PlaybackOutcome::Cancelled => tracing::info!(
            timeline = %report.timeline.0,
            frames = report.frames,
            x = pose.position.x,
            y = pose.position.y,
            z = pose.position.z,
            "Playback cancelled"
        ),
        PlaybackOutcome::Skipped => tracing::warn!(timeline = %report.timeline.0, "Playback skipped"),
    }
}
