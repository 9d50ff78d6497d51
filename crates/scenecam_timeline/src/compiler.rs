// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline compiler.
//!
//! Walks the scene cycle once and bakes every camera move into a
//! [`Timeline`]. Random starting poses are drawn from the caller's RNG at
//! compile time, so a compiled timeline replays identically wherever it goes.

use crate::budget::{ambient_anim_duration, cut_segment_durations, zoom_phase_durations};
use crate::config::{TargetBehavior, TimelineOptions};
use crate::easing::Easing;
use crate::geometry::{camera_distance_for_source, source_center_on_plane, Extent, Vec3};
use crate::scene::{SceneCatalog, SceneNode, SceneRef};
use crate::segment::{CameraPose, SceneEntry, Segment, Timeline, TimelineId};
use crate::targets::{find_focus_targets, is_high_motion_scene, FocusTarget};
use rand::Rng;

/// Bounds of the box random start positions are drawn from
const START_X: f32 = 2.0;
const START_Y: f32 = 1.0;
const START_Z_MIN: f32 = 1.5;
const START_Z_MAX: f32 = 2.5;

/// Fraction of the plane's half extents random look-at points stay within
const START_TARGET_SPREAD: f32 = 0.8;

/// How far behind its resting pose the intro starts the camera
pub const INTRO_Z_OFFSET: f32 = 3.0;

/// Length of the camera intro
pub const INTRO_DURATION_MS: f64 = 3000.0;

/// Pull-in from `distance + INTRO_Z_OFFSET` down to `distance`, played once
/// before a timeline.
pub fn camera_intro_segment(distance: f32) -> Segment {
    Segment::animate(
        INTRO_DURATION_MS,
        CameraPose::centered(distance + INTRO_Z_OFFSET),
        CameraPose::centered(distance),
        Easing::Power4Out,
    )
}

/// Sample a starting pose for an approach move.
///
/// The position comes from a fixed box in front of the plane; the look-at
/// point lies within 80% of the plane's half extents.
pub fn random_start_pose<R: Rng + ?Sized>(rng: &mut R, plane: Extent) -> CameraPose {
    let half_width = spread(plane.half_width());
    let half_height = spread(plane.half_height());

    CameraPose {
        position: Vec3::new(
            rng.gen_range(-START_X..=START_X),
            rng.gen_range(-START_Y..=START_Y),
            rng.gen_range(START_Z_MIN..=START_Z_MAX),
        ),
        target: Vec3::new(
            rng.gen_range(-half_width..=half_width),
            rng.gen_range(-half_height..=half_height),
            0.0,
        ),
    }
}

fn spread(half_extent: f32) -> f32 {
    let spread = half_extent.abs() * START_TARGET_SPREAD;
    if spread.is_finite() {
        spread
    } else {
        0.0
    }
}

/// Compiles scene cycles against a catalog
pub struct TimelineCompiler<'a> {
    catalog: &'a SceneCatalog,
    options: &'a TimelineOptions,
}

impl<'a> TimelineCompiler<'a> {
    /// Create a compiler
    pub fn new(catalog: &'a SceneCatalog, options: &'a TimelineOptions) -> Self {
        Self { catalog, options }
    }

    /// Intro onto the centered pose this compiler's scenes rest on
    pub fn intro_segment(&self) -> Segment {
        camera_intro_segment(self.options.center_distance)
    }

    /// Compile `cycle` into a timeline, drawing random poses from `rng`
    pub fn compile<R: Rng + ?Sized>(&self, cycle: &[SceneRef], rng: &mut R) -> Timeline {
        let options = self.options;
        let mut scenes = Vec::with_capacity(cycle.len());
        let mut start_time_ms = options.start_delay_ms;

        for (index, scene_ref) in cycle.iter().enumerate() {
            let entry = self.compile_scene(scene_ref, start_time_ms, rng);
            tracing::debug!(
                scene = %entry.name,
                start_ms = entry.start_time_ms,
                segments = entry.segments.len(),
                high_motion = entry.is_high_motion,
                "Compiled scene"
            );
            scenes.push(entry);

            start_time_ms += options.scene_duration_ms;
            if index + 1 < cycle.len() {
                start_time_ms += options.transition_ms;
            }
        }

        let timeline = Timeline {
            id: TimelineId::new(),
            plane_width: options.plane_width,
            plane_height: options.plane_height,
            center_distance: options.center_distance,
            target_behavior: options.target_behavior,
            scenes,
        };
        tracing::info!(
            timeline = %timeline.id.0,
            scenes = timeline.scene_count(),
            expected_ms = timeline.expected_duration_ms(),
            "Built camera timeline"
        );
        timeline
    }

    fn compile_scene<R: Rng + ?Sized>(
        &self,
        scene_ref: &SceneRef,
        start_time_ms: f64,
        rng: &mut R,
    ) -> SceneEntry {
        let options = self.options;
        let nodes = self.placed_nodes(scene_ref);
        let is_high_motion = is_high_motion_scene(&nodes, self.catalog);
        let targets = find_focus_targets(&nodes, self.catalog, &options.overrides);

        let segments = if targets.is_empty() {
            self.ambient_segments(rng)
        } else {
            match options.target_behavior {
                TargetBehavior::Zoom => self.zoom_segments(&targets, rng),
                TargetBehavior::Cut => self.cut_segments(&targets, rng),
            }
        };

        SceneEntry {
            name: scene_ref.name.clone(),
            start_time_ms,
            budget_ms: options.scene_duration_ms,
            is_high_motion,
            has_focus_target: !targets.is_empty(),
            target_behavior: options.target_behavior,
            segments,
        }
    }

    /// Visible, non-group nodes of a scene on the configured channel
    fn placed_nodes(&self, scene_ref: &SceneRef) -> Vec<SceneNode> {
        let Some(scene) = self.catalog.scene(&scene_ref.id) else {
            tracing::warn!(scene = %scene_ref.id, "Scene not in catalog, using an empty node list");
            return Vec::new();
        };

        scene
            .nodes
            .iter()
            .filter(|node| node.visible && node.is_placed_on(self.options.display_channel))
            .cloned()
            .collect()
    }

    fn center_pose(&self) -> CameraPose {
        CameraPose::centered(self.options.center_distance)
    }

    fn framing_pose(&self, target: &FocusTarget<'_>) -> CameraPose {
        let options = self.options;
        let center =
            source_center_on_plane(target.node, target.source, options.canvas(), options.plane());
        let distance = camera_distance_for_source(
            target.node,
            target.source,
            options.canvas(),
            options.framing_distance,
        );
        CameraPose::facing(center, distance)
    }

    /// One approach onto the whole plane
    fn ambient_segments<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Segment> {
        let duration_ms = ambient_anim_duration(self.options.scene_duration_ms);
        let start = random_start_pose(rng, self.options.plane());
        vec![Segment::animate(duration_ms, start, self.center_pose(), Easing::Power3Out)]
    }

    /// Intro, delay, a focus and hold per target, then back to center
    fn zoom_segments<R: Rng + ?Sized>(
        &self,
        targets: &[FocusTarget<'_>],
        rng: &mut R,
    ) -> Vec<Segment> {
        let phases = zoom_phase_durations(self.options.scene_duration_ms, targets.len());
        let mut segments = Vec::with_capacity(2 * targets.len() + 3);

        let start = random_start_pose(rng, self.options.plane());
        segments.push(Segment::animate(
            phases.first_anim_ms,
            start,
            self.center_pose(),
            Easing::Power3Out,
        ));
        segments.push(Segment::wait(phases.focus_delay_ms));

        for target in targets {
            segments.push(Segment::animate_from_current(
                phases.focus_anim_ms,
                self.framing_pose(target),
                Easing::Power2InOut,
            ));
            segments.push(Segment::wait(phases.focus_hold_ms));
        }

        segments.push(Segment::animate_from_current(
            phases.return_anim_ms,
            self.center_pose(),
            Easing::Power2InOut,
        ));
        segments
    }

    /// A fresh approach and hold per target, then one onto the center
    fn cut_segments<R: Rng + ?Sized>(
        &self,
        targets: &[FocusTarget<'_>],
        rng: &mut R,
    ) -> Vec<Segment> {
        let (approach_ms, hold_ms) =
            cut_segment_durations(self.options.scene_duration_ms, targets.len());
        let ends = targets
            .iter()
            .map(|target| self.framing_pose(target))
            .chain(std::iter::once(self.center_pose()));

        let mut segments = Vec::with_capacity(2 * targets.len() + 2);
        for end in ends {
            let start = random_start_pose(rng, self.options.plane());
            segments.push(Segment::animate(approach_ms, start, end, Easing::Power3Out));
            segments.push(Segment::wait(hold_ms));
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeKind, NodeTransform, Scene, Source, SourceKind, SourceSize, Vec2};
    use crate::segment::StartPose;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> SceneCatalog {
        let mut catalog = SceneCatalog::new();
        catalog.add_source(
            Source::new("cam", SourceKind::VideoCaptureDevice, "Webcam")
                .with_size(SourceSize { width: 480.0, height: 270.0 }),
        );
        catalog.add_source(
            Source::new("cam2", SourceKind::AvCaptureDevice, "Guest Cam")
                .with_size(SourceSize { width: 480.0, height: 270.0 }),
        );
        catalog.add_source(Source::new("game", SourceKind::LiveCapture, "Game"));
        catalog.add_source(Source::new("logo", SourceKind::Image, "Logo"));

        catalog.add_scene(Scene::new("intro", "Intro").with_node(SceneNode::new("logo")));
        catalog.add_scene(
            Scene::new("play", "Gameplay")
                .with_node(SceneNode::new("game"))
                .with_node(SceneNode::new("cam").with_transform(NodeTransform {
                    position: Vec2::new(1440.0, 810.0),
                    ..NodeTransform::default()
                })),
        );
        catalog.add_scene(
            Scene::new("duo", "Duo")
                .with_node(SceneNode::new("cam"))
                .with_node(SceneNode::new("cam2").with_transform(NodeTransform {
                    position: Vec2::new(1440.0, 0.0),
                    ..NodeTransform::default()
                })),
        );
        catalog
    }

    fn compile(options: &TimelineOptions, ids: &[&str]) -> Timeline {
        let catalog = catalog();
        let cycle: Vec<SceneRef> = ids
            .iter()
            .map(|id| catalog.scene(&(*id).into()).unwrap().to_ref())
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        TimelineCompiler::new(&catalog, options).compile(&cycle, &mut rng)
    }

    #[test]
    fn test_scene_without_targets() {
        let options = TimelineOptions {
            scene_duration_ms: 3000.0,
            ..TimelineOptions::default()
        };
        let timeline = compile(&options, &["intro"]);
        let scene = &timeline.scenes[0];

        assert!(!scene.has_focus_target);
        assert_eq!(scene.segments.len(), 1);
        match &scene.segments[0] {
            Segment::Animate { duration_ms, start, end, easing } => {
                // min(2500 * 0.6, 1500)
                assert!((duration_ms - 1500.0).abs() < 1e-9);
                assert!(matches!(start, StartPose::Literal(_)));
                assert_eq!(*end, CameraPose::centered(2.25));
                assert_eq!(*easing, Easing::Power3Out);
            }
            other => panic!("expected animate, got {other:?}"),
        }
    }

    #[test]
    fn test_zoom_mode_layout() {
        let timeline = compile(&TimelineOptions::default(), &["play"]);
        let scene = &timeline.scenes[0];
        assert!(scene.is_high_motion);
        assert!(scene.has_focus_target);

        let kinds: Vec<_> = scene
            .segments
            .iter()
            .map(|s| match s {
                Segment::Animate { start: StartPose::Literal(_), .. } => "animate",
                Segment::Animate { start: StartPose::Deferred, .. } => "animate_current",
                Segment::Wait { .. } => "wait",
                Segment::Unknown => "unknown",
            })
            .collect();
        assert_eq!(kinds, ["animate", "wait", "animate_current", "wait", "animate_current"]);
        assert!(scene.total_duration_ms() <= 5000.0 + 1e-6);
        assert!(scene.validate().is_ok());

        // Webcam in the bottom-right quarter frames to the right of and below center
        let Segment::Animate { end, .. } = &scene.segments[2] else {
            panic!("expected focus move");
        };
        assert!(end.target.x > 0.0 && end.target.y < 0.0);
        assert_eq!(end.position.x, end.target.x);
        // 480 px of 1920 is 25%: 0.3 / 0.25 = 1.2 times the framing distance
        assert!((end.position.z - 2.4).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_visits_targets_in_node_order() {
        let timeline = compile(&TimelineOptions::default(), &["duo"]);
        let scene = &timeline.scenes[0];
        assert_eq!(scene.segments.len(), 2 * 2 + 3);

        let focus_x: Vec<f32> = [2, 4]
            .iter()
            .map(|&i| match &scene.segments[i] {
                Segment::Animate { end, .. } => end.target.x,
                other => panic!("expected animate, got {other:?}"),
            })
            .collect();
        assert!(focus_x[0] < 0.0 && focus_x[1] > 0.0);
    }

    #[test]
    fn test_cut_mode_segmentation() {
        let options = TimelineOptions {
            target_behavior: TargetBehavior::Cut,
            scene_duration_ms: 6000.0,
            ..TimelineOptions::default()
        };
        let timeline = compile(&options, &["duo"]);
        let scene = &timeline.scenes[0];
        let shot_ms = 6000.0 / 3.0;

        assert_eq!(scene.segments.len(), 6);
        for pair in scene.segments.chunks(2) {
            assert!(matches!(pair[0], Segment::Animate { start: StartPose::Literal(_), .. }));
            assert!(matches!(pair[1], Segment::Wait { .. }));
            let sum = pair[0].duration_ms() + pair[1].duration_ms();
            assert!((sum - shot_ms).abs() < 1e-9);
        }
        let Segment::Animate { end, .. } = &scene.segments[4] else {
            panic!("expected closing approach");
        };
        assert_eq!(*end, CameraPose::centered(2.25));
    }

    #[test]
    fn test_start_times_accumulate() {
        let options = TimelineOptions {
            scene_duration_ms: 4000.0,
            transition_ms: 500.0,
            start_delay_ms: 250.0,
            ..TimelineOptions::default()
        };
        let timeline = compile(&options, &["intro", "play", "duo"]);
        let starts: Vec<f64> = timeline.scenes.iter().map(|s| s.start_time_ms).collect();
        assert_eq!(starts, [250.0, 4750.0, 9250.0]);
        assert_eq!(timeline.expected_duration_ms(), 13_250.0);
    }

    #[test]
    fn test_same_seed_same_poses() {
        let options = TimelineOptions::default();
        let a = compile(&options, &["intro", "play"]);
        let b = compile(&options, &["intro", "play"]);
        assert_eq!(a.scenes, b.scenes);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_random_pose_bounds() {
        let plane = Extent::new(3.5, 2.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let pose = random_start_pose(&mut rng, plane);
            assert!(pose.position.x.abs() <= 2.0 && pose.position.y.abs() <= 1.0);
            assert!((1.5..=2.5).contains(&pose.position.z));
            assert!(pose.target.x.abs() <= 1.4 + 1e-6);
            assert!(pose.target.y.abs() <= 0.8 + 1e-6);
            assert_eq!(pose.target.z, 0.0);
        }
    }

    #[test]
    fn test_groups_other_channels_and_missing_scenes() {
        let mut catalog = catalog();
        catalog.add_scene(
            Scene::new("mixed", "Mixed")
                .with_node(SceneNode::new("cam").with_kind(NodeKind::Group))
                .with_node(
                    SceneNode::new("cam2").with_display(crate::scene::DisplayChannel::Vertical),
                ),
        );
        let options = TimelineOptions::default();
        let cycle = vec![
            catalog.scene(&"mixed".into()).unwrap().to_ref(),
            SceneRef { id: "gone".into(), name: "Gone".to_string() },
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let timeline = TimelineCompiler::new(&catalog, &options).compile(&cycle, &mut rng);

        assert!(timeline.scenes.iter().all(|s| !s.has_focus_target));
        assert!(timeline.scenes.iter().all(|s| s.segments.len() == 1));
        assert_eq!(timeline.scenes[1].name, "Gone");
    }

    #[test]
    fn test_hidden_nodes_are_ignored() {
        let mut catalog = catalog();
        catalog.add_scene(
            Scene::new("away", "Away")
                .with_node(SceneNode::new("game").hidden())
                .with_node(SceneNode::new("cam").hidden()),
        );
        let options = TimelineOptions::default();
        let cycle = vec![catalog.scene(&"away".into()).unwrap().to_ref()];
        let mut rng = StdRng::seed_from_u64(1);
        let timeline = TimelineCompiler::new(&catalog, &options).compile(&cycle, &mut rng);

        let scene = &timeline.scenes[0];
        assert!(!scene.is_high_motion);
        assert!(!scene.has_focus_target);
        assert_eq!(scene.segments.len(), 1);
    }

    #[test]
    fn test_intro_pulls_in_to_center() {
        let catalog = catalog();
        let options = TimelineOptions {
            center_distance: 2.5,
            ..TimelineOptions::default()
        };
        let intro = TimelineCompiler::new(&catalog, &options).intro_segment();

        match intro {
            Segment::Animate { duration_ms, start, end, easing } => {
                assert_eq!(duration_ms, 3000.0);
                assert_eq!(start, StartPose::Literal(CameraPose::centered(5.5)));
                assert_eq!(end, CameraPose::centered(2.5));
                assert_eq!(easing, Easing::Power4Out);
            }
            other => panic!("expected an animate segment, got {other:?}"),
        }
    }
}
