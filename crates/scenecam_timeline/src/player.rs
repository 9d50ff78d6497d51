// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline player.
//!
//! Replays compiled segments against a [`CameraController`]. Animate segments
//! are driven by a frame ticker; the cancellation token is checked before
//! every frame and before every segment and scene.

use crate::cancel::CancellationToken;
use crate::config::PlaybackOptions;
use crate::controller::CameraController;
use crate::easing::{Easing, Interpolation};
use crate::segment::{CameraPose, SceneEntry, Segment, StartPose, Timeline};
use std::time::Duration;
use tokio::time::{interval, sleep, sleep_until, Instant, MissedTickBehavior};

/// How a playback call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Everything ran to the end
    Completed,
    /// Stopped early by the cancellation token
    Cancelled,
    /// Nothing to drive
    Skipped,
}

/// Drives one camera controller through timelines
pub struct TimelinePlayer<C: CameraController> {
    controller: Option<C>,
    cancel: CancellationToken,
    frame_interval: Duration,
}

impl<C: CameraController> TimelinePlayer<C> {
    /// Create a player that owns `controller`
    pub fn new(controller: C, cancel: CancellationToken) -> Self {
        Self {
            controller: Some(controller),
            cancel,
            frame_interval: PlaybackOptions::default().frame_interval(),
        }
    }

    /// Create a player with no controller attached; every call is skipped
    pub fn detached(cancel: CancellationToken) -> Self {
        Self {
            controller: None,
            cancel,
            frame_interval: PlaybackOptions::default().frame_interval(),
        }
    }

    /// Apply playback options
    pub fn with_options(mut self, options: &PlaybackOptions) -> Self {
        self.frame_interval = options.frame_interval();
        self
    }

    /// Attached controller
    pub fn controller(&self) -> Option<&C> {
        self.controller.as_ref()
    }

    /// Give the controller back
    pub fn into_controller(self) -> Option<C> {
        self.controller
    }

    /// Cancellation token consulted by this player
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Play every scene of `timeline`, starting each at its offset from now.
    ///
    /// Start times are a best-effort schedule: a scene that overruns delays the
    /// next one instead of being cut short.
    pub async fn play_timeline(&mut self, timeline: &Timeline) -> PlaybackOutcome {
        if self.controller.is_none() {
            tracing::warn!("No camera controller attached, skipping timeline");
            return PlaybackOutcome::Skipped;
        }

        let origin = Instant::now();
        tracing::info!(
            scenes = timeline.scene_count(),
            expected_ms = timeline.expected_duration_ms(),
            behavior = timeline.target_behavior.display_name(),
            "Playing timeline"
        );

        for entry in &timeline.scenes {
            if self.cancel.is_cancelled() {
                return PlaybackOutcome::Cancelled;
            }

            let start = origin
                .checked_add(millis(entry.start_time_ms))
                .unwrap_or_else(far_future);
            tokio::select! {
                _ = sleep_until(start) => {}
                _ = self.cancel.cancelled() => return PlaybackOutcome::Cancelled,
            }

            tracing::info!(scene = %entry.name, start_ms = entry.start_time_ms, "Scene started");
            if self.play_scene(entry).await == PlaybackOutcome::Cancelled {
                tracing::info!(scene = %entry.name, "Timeline cancelled");
                return PlaybackOutcome::Cancelled;
            }
        }

        PlaybackOutcome::Completed
    }

    /// Play a scene's segments in order, stopping at the first cancellation
    pub async fn play_scene(&mut self, entry: &SceneEntry) -> PlaybackOutcome {
        if self.controller.is_none() {
            tracing::warn!(scene = %entry.name, "No camera controller attached, skipping scene");
            return PlaybackOutcome::Skipped;
        }

        for segment in &entry.segments {
            if self.cancel.is_cancelled() {
                return PlaybackOutcome::Cancelled;
            }
            if self.play_segment(segment).await == PlaybackOutcome::Cancelled {
                return PlaybackOutcome::Cancelled;
            }
        }

        PlaybackOutcome::Completed
    }

    /// Play one segment
    pub async fn play_segment(&mut self, segment: &Segment) -> PlaybackOutcome {
        if self.controller.is_none() {
            tracing::warn!("No camera controller attached, skipping segment");
            return PlaybackOutcome::Skipped;
        }

        match segment {
            Segment::Wait { duration_ms } => self.wait(*duration_ms).await,
            Segment::Animate {
                duration_ms,
                start,
                end,
                easing,
            } => self.animate(*duration_ms, *start, *end, *easing).await,
            Segment::Unknown => {
                tracing::warn!("Unknown segment kind, skipping");
                PlaybackOutcome::Completed
            }
        }
    }

    async fn wait(&self, duration_ms: f64) -> PlaybackOutcome {
        tokio::select! {
            _ = sleep(millis(duration_ms)) => PlaybackOutcome::Completed,
            _ = self.cancel.cancelled() => PlaybackOutcome::Cancelled,
        }
    }

    async fn animate(
        &mut self,
        duration_ms: f64,
        start: StartPose,
        end: CameraPose,
        easing: Easing,
    ) -> PlaybackOutcome {
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        let started = Instant::now();
        let mut from = None;

        loop {
            if self.cancel.is_cancelled() {
                return PlaybackOutcome::Cancelled;
            }
            let Some(controller) = self.controller.as_mut() else {
                return PlaybackOutcome::Skipped;
            };

            // Deferred starts read the live pose once, on the first frame
            let from = *from.get_or_insert_with(|| match start {
                StartPose::Literal(pose) => pose,
                StartPose::Deferred => controller.pose(),
            });

            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let t = Interpolation::progress(elapsed_ms, duration_ms);
            controller.lerp_look_at(&from, &end, easing.apply(t), false);

            if t >= 1.0 {
                return PlaybackOutcome::Completed;
            }
            ticker.tick().await;
        }
    }
}

impl<C: CameraController> std::fmt::Debug for TimelinePlayer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelinePlayer")
            .field("attached", &self.controller.is_some())
            .field("cancel", &self.cancel)
            .field("frame_interval", &self.frame_interval)
            .finish()
    }
}

/// Non-positive and NaN durations are zero; oversized ones saturate
fn millis(ms: f64) -> Duration {
    if ms > 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}
