// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera timeline compiler and player.
//!
//! This crate plans and replays virtual-camera moves across a cycle of scenes:
//! - Layout-to-plane geometry for framing sources
//! - Focus target classification per scene
//! - Proportional duration budgeting for multi-target zooms
//! - A compiler that bakes every pose into a serializable timeline
//! - A player that replays a timeline with eased per-frame interpolation
//!
//! ## Architecture
//!
//! Data flows one way: [`TimelineCompiler`] turns a scene cycle into a
//! [`Timeline`], the timeline crosses an execution-context boundary as plain
//! data (see [`Timeline::to_json`]), and a [`TimelinePlayer`] drives a
//! [`CameraController`] through it. A [`CancellationToken`] stops playback
//! cooperatively at frame and segment boundaries.

pub mod budget;
pub mod cancel;
pub mod compiler;
pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod player;
pub mod scene;
pub mod segment;
pub mod targets;

pub use budget::{
    ambient_anim_duration, cut_segment_durations, zoom_phase_durations, zoom_total_duration,
    PhaseDurations,
};
pub use cancel::{CancelState, CancellationToken};
pub use compiler::{
    camera_intro_segment, random_start_pose, TimelineCompiler, INTRO_DURATION_MS, INTRO_Z_OFFSET,
};
pub use config::{
    PlaybackOptions, ScenecamConfig, TargetBehavior, TimelineOptions, MAX_FRAME_RATE,
};
pub use controller::{CameraController, PoseController};
pub use easing::{Easing, Interpolation};
pub use error::{CatalogError, ConfigError, TimelineError};
pub use geometry::{
    camera_distance_for_source, canvas_to_plane, plane_to_canvas, source_center_on_plane,
    EffectiveRect, Extent, Vec3,
};
pub use player::{PlaybackOutcome, TimelinePlayer};
pub use scene::{
    CropInsets, DisplayChannel, NodeKind, NodeTransform, Scene, SceneCatalog, SceneId, SceneNode,
    SceneRef, Source, SourceId, SourceKind, SourceSize, Vec2,
};
pub use segment::{CameraPose, SceneEntry, Segment, StartPose, Timeline, TimelineId};
pub use targets::{find_focus_targets, is_high_motion_scene, FocusTarget};
