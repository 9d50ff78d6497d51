// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled timeline data.
//!
//! A [`Timeline`] holds only plain values, so it can be built in one execution
//! context and replayed in another after a trip through JSON.

use crate::config::TargetBehavior;
use crate::easing::Easing;
use crate::error::TimelineError;
use crate::geometry::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slack allowed when checking a scene's segments against its budget
pub const BUDGET_TOLERANCE_MS: f64 = 1.0;

/// Unique identifier for a compiled timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera position and look-at point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    /// World position
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
}

impl CameraPose {
    /// Create a new pose
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Looking straight at the plane center from `distance`
    pub const fn centered(distance: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
        }
    }

    /// Looking straight at `point` on the plane from `distance`
    pub const fn facing(point: Vec3, distance: f32) -> Self {
        Self {
            position: Vec3::new(point.x, point.y, distance),
            target: Vec3::new(point.x, point.y, 0.0),
        }
    }

    /// Interpolate both position and target
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

/// Where an animate segment starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pose", rename_all = "snake_case")]
pub enum StartPose {
    /// A pose baked in at compile time
    Literal(CameraPose),
    /// Whatever pose the camera holds when the segment starts playing
    Deferred,
}

/// One step of a scene's camera plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Eased move between two poses
    Animate {
        /// Length of the move
        duration_ms: f64,
        /// Starting pose
        start: StartPose,
        /// Final pose
        end: CameraPose,
        /// Easing curve
        #[serde(default)]
        easing: Easing,
    },
    /// Hold the current pose
    Wait {
        /// Length of the hold
        duration_ms: f64,
    },
    /// A segment kind this build does not understand
    #[serde(other)]
    Unknown,
}

impl Segment {
    /// Move from a baked pose
    pub fn animate(duration_ms: f64, start: CameraPose, end: CameraPose, easing: Easing) -> Self {
        Self::Animate {
            duration_ms,
            start: StartPose::Literal(start),
            end,
            easing,
        }
    }

    /// Move from wherever the camera is
    pub fn animate_from_current(duration_ms: f64, end: CameraPose, easing: Easing) -> Self {
        Self::Animate {
            duration_ms,
            start: StartPose::Deferred,
            end,
            easing,
        }
    }

    /// Hold for a while
    pub fn wait(duration_ms: f64) -> Self {
        Self::Wait { duration_ms }
    }

    /// Length of the segment; unknown segments take no time
    pub fn duration_ms(&self) -> f64 {
        match self {
            Self::Animate { duration_ms, .. } | Self::Wait { duration_ms } => *duration_ms,
            Self::Unknown => 0.0,
        }
    }

    /// Whether this is an animate segment
    pub fn is_animate(&self) -> bool {
        matches!(self, Self::Animate { .. })
    }
}

/// Camera plan for one scene of the cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Scene name
    pub name: String,
    /// Offset from the start of the cycle
    pub start_time_ms: f64,
    /// Declared on-screen duration the segments must fit in
    pub budget_ms: f64,
    /// Scene contains live capture
    pub is_high_motion: bool,
    /// Scene has at least one focus target
    pub has_focus_target: bool,
    /// Motion style used for the targets
    pub target_behavior: TargetBehavior,
    /// Ordered segments
    pub segments: Vec<Segment>,
}

impl SceneEntry {
    /// Sum of every segment's duration
    pub fn total_duration_ms(&self) -> f64 {
        self.segments.iter().map(Segment::duration_ms).sum()
    }

    /// Number of animate segments
    pub fn animate_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_animate()).count()
    }

    /// Check durations are valid and fit the budget
    pub fn validate(&self) -> Result<(), TimelineError> {
        for (index, segment) in self.segments.iter().enumerate() {
            let duration_ms = segment.duration_ms();
            if !duration_ms.is_finite() || duration_ms < 0.0 {
                return Err(TimelineError::InvalidDuration {
                    scene: self.name.clone(),
                    index,
                    duration_ms,
                });
            }
        }

        let total_ms = self.total_duration_ms();
        if total_ms > self.budget_ms + BUDGET_TOLERANCE_MS {
            return Err(TimelineError::BudgetExceeded {
                scene: self.name.clone(),
                total_ms,
                budget_ms: self.budget_ms,
            });
        }
        Ok(())
    }
}

/// Fully resolved camera plan for a cycle of scenes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Plane width in world units
    pub plane_width: f32,
    /// Plane height in world units
    pub plane_height: f32,
    /// Camera distance that fits the whole plane
    pub center_distance: f32,
    /// Motion style used for focus targets
    pub target_behavior: TargetBehavior,
    /// Scenes in playback order
    pub scenes: Vec<SceneEntry>,
}

impl Timeline {
    /// Number of scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Time from the cycle start until the last scene's budget runs out
    pub fn expected_duration_ms(&self) -> f64 {
        self.scenes
            .last()
            .map(|s| s.start_time_ms + s.budget_ms)
            .unwrap_or(0.0)
    }

    /// Check every scene
    pub fn validate(&self) -> Result<(), TimelineError> {
        self.scenes.iter().try_for_each(SceneEntry::validate)
    }

    /// Encode for transfer to another execution context
    pub fn to_json(&self) -> Result<String, TimelineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode with indentation, for files meant to be read
    pub fn to_json_pretty(&self) -> Result<String, TimelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a transferred timeline and check its invariants
    pub fn from_json(s: &str) -> Result<Self, TimelineError> {
        let timeline: Timeline = serde_json::from_str(s)?;
        timeline.validate()?;
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(segments: Vec<Segment>, budget_ms: f64) -> SceneEntry {
        SceneEntry {
            name: "Main".to_string(),
            start_time_ms: 0.0,
            budget_ms,
            is_high_motion: false,
            has_focus_target: false,
            target_behavior: TargetBehavior::Zoom,
            segments,
        }
    }

    #[test]
    fn test_segment_wire_format() {
        let segment = Segment::animate_from_current(
            800.0,
            CameraPose::centered(2.25),
            Easing::Power2InOut,
        );
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["type"], "animate");
        assert_eq!(json["start"]["kind"], "deferred");
        assert_eq!(json["easing"], "power2-inout");

        let wait = serde_json::to_value(Segment::wait(250.0)).unwrap();
        assert_eq!(wait["type"], "wait");
        assert_eq!(wait["duration_ms"], 250.0);
    }

    #[test]
    fn test_unknown_segment_kind_decodes() {
        let segment: Segment =
            serde_json::from_str(r#"{ "type": "shake", "duration_ms": 10.0 }"#).unwrap();
        assert_eq!(segment, Segment::Unknown);
        assert_eq!(segment.duration_ms(), 0.0);
    }

    #[test]
    fn test_budget_validation() {
        let fits = entry(vec![Segment::wait(1000.0), Segment::wait(1000.5)], 2000.0);
        assert!(fits.validate().is_ok());

        let over = entry(vec![Segment::wait(1500.0), Segment::wait(600.0)], 2000.0);
        assert!(matches!(over.validate(), Err(TimelineError::BudgetExceeded { .. })));

        let negative = entry(vec![Segment::wait(-1.0)], 2000.0);
        assert!(matches!(
            negative.validate(),
            Err(TimelineError::InvalidDuration { index: 0, .. })
        ));
    }

    #[test]
    fn test_pose_lerp() {
        let a = CameraPose::centered(2.0);
        let b = CameraPose::facing(Vec3::new(1.0, -1.0, 0.0), 1.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.position, Vec3::new(0.5, -0.5, 1.5));
        assert_eq!(mid.target, Vec3::new(0.5, -0.5, 0.0));
    }

    #[test]
    fn test_expected_duration() {
        let mut first = entry(Vec::new(), 5000.0);
        first.start_time_ms = 500.0;
        let mut second = entry(Vec::new(), 5000.0);
        second.start_time_ms = 6500.0;
        let timeline = Timeline {
            id: TimelineId::new(),
            plane_width: 3.5,
            plane_height: 2.0,
            center_distance: 2.25,
            target_behavior: TargetBehavior::Zoom,
            scenes: vec![first, second],
        };
        assert_eq!(timeline.expected_duration_ms(), 11_500.0);
    }
}
