// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline and playback configuration.
//!
//! This module manages:
//! - Options the compiler needs (extents, durations, target behavior)
//! - Options the player needs (frame rate, cancellation quiescence)
//! - A versioned RON config file combining both

use crate::error::ConfigError;
use crate::geometry::Extent;
use crate::scene::{DisplayChannel, SourceId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Current config file format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "scenecam.ron";

/// Highest accepted playback frame rate in Hz
pub const MAX_FRAME_RATE: f32 = 1000.0;

const DEFAULT_FRAME_RATE: f32 = 60.0;

/// How the camera visits focus targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetBehavior {
    /// Continuous moves from target to target
    #[default]
    Zoom,
    /// A fresh approach from a random pose for every target
    Cut,
}

impl TargetBehavior {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetBehavior::Zoom => "Zoom",
            TargetBehavior::Cut => "Cut",
        }
    }
}

/// Options for compiling a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    /// Motion style for focus targets
    pub target_behavior: TargetBehavior,
    /// Per-source focus target decisions that beat the kind-based default
    pub overrides: IndexMap<SourceId, bool>,
    /// Camera distance that fits the whole plane
    pub center_distance: f32,
    /// Base distance used when framing a single source
    pub framing_distance: f32,
    /// Plane width in world units
    pub plane_width: f32,
    /// Plane height in world units
    pub plane_height: f32,
    /// Canvas width in pixels
    pub canvas_width: f32,
    /// Canvas height in pixels
    pub canvas_height: f32,
    /// On-screen time per scene
    pub scene_duration_ms: f64,
    /// Gap between consecutive scenes
    pub transition_ms: f64,
    /// Delay before the first scene
    pub start_delay_ms: f64,
    /// Output channel whose nodes are considered
    pub display_channel: DisplayChannel,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            target_behavior: TargetBehavior::Zoom,
            overrides: IndexMap::new(),
            center_distance: 2.25,
            framing_distance: 2.0,
            plane_width: 2.0 * 16.0 / 9.0,
            plane_height: 2.0,
            canvas_width: 1920.0,
            canvas_height: 1080.0,
            scene_duration_ms: 5000.0,
            transition_ms: 1000.0,
            start_delay_ms: 0.0,
            display_channel: DisplayChannel::Horizontal,
        }
    }
}

impl TimelineOptions {
    /// Canvas extent in pixels
    pub fn canvas(&self) -> Extent {
        Extent::new(self.canvas_width, self.canvas_height)
    }

    /// Plane extent in world units
    pub fn plane(&self) -> Extent {
        Extent::new(self.plane_width, self.plane_height)
    }

    /// Force a focus decision for one source
    pub fn with_override(mut self, source_id: impl Into<SourceId>, selected: bool) -> Self {
        self.overrides.insert(source_id.into(), selected);
        self
    }

    /// Reject values the compiler would turn into meaningless plans
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("plane_width", self.plane_width)?;
        positive("plane_height", self.plane_height)?;
        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        positive("center_distance", self.center_distance)?;
        positive("framing_distance", self.framing_distance)?;
        non_negative("scene_duration_ms", self.scene_duration_ms)?;
        non_negative("transition_ms", self.transition_ms)?;
        non_negative("start_delay_ms", self.start_delay_ms)?;
        Ok(())
    }
}

/// Options for playing a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackOptions {
    /// Display refresh rate driving animate segments
    pub frame_rate: f32,
    /// How long a cancellation stays raised before it clears itself
    pub cancel_quiescence_ms: u64,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            cancel_quiescence_ms: 100,
        }
    }
}

impl PlaybackOptions {
    /// Time between frames.
    ///
    /// Rates that would fail [`validate`](Self::validate) fall back to the default.
    pub fn frame_interval(&self) -> Duration {
        let rate = if self.frame_rate.is_finite()
            && self.frame_rate > 0.0
            && self.frame_rate <= MAX_FRAME_RATE
        {
            self.frame_rate
        } else {
            DEFAULT_FRAME_RATE
        };
        Duration::from_secs_f32(1.0 / rate)
    }

    /// Cancellation quiescence window
    pub fn cancel_quiescence(&self) -> Duration {
        Duration::from_millis(self.cancel_quiescence_ms)
    }

    /// Reject unusable values
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("frame_rate", self.frame_rate)?;
        if self.frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::Invalid {
                field: "frame_rate",
                reason: format!(
                    "{} Hz is above the {MAX_FRAME_RATE} Hz limit",
                    self.frame_rate
                ),
            });
        }
        Ok(())
    }
}

/// Complete config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenecamConfig {
    /// Format version
    pub version: u32,
    /// Compiler options
    pub timeline: TimelineOptions,
    /// Player options
    pub playback: PlaybackOptions,
    /// Seed for the pose sampler; random when absent
    pub seed: Option<u64>,
}

impl Default for ScenecamConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            timeline: TimelineOptions::default(),
            playback: PlaybackOptions::default(),
            seed: None,
        }
    }
}

impl ScenecamConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse and validate config text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: ScenecamConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate both option sets
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timeline.validate()?;
        self.playback.validate()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected zero or more milliseconds, got {value}"),
        })
    }
}
