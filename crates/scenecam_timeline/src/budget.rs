// SPDX-License-Identifier: MIT OR Apache-2.0
//! Duration budgeting for scene animations.
//!
//! Every function here is total: negative or non-finite scene durations are
//! treated as zero, and every returned phase is non-negative.

use serde::{Deserialize, Serialize};

/// Share of the scene spent on the intro move
const INTRO_SHARE: f64 = 0.25;
/// Share of the scene spent waiting before the first focus
const DELAY_SHARE: f64 = 0.05;
/// Nominal focus share, split across all targets
const FOCUS_SHARE: f64 = 0.20;
/// Nominal hold share, split across all targets
const HOLD_SHARE: f64 = 0.15;
/// Return-to-center share, independent of the target count
const RETURN_SHARE: f64 = 0.20;

const MAX_INTRO_MS: f64 = 2500.0;
const MAX_DELAY_MS: f64 = 500.0;
const MAX_FOCUS_MS: f64 = 2000.0;
const MAX_RETURN_MS: f64 = 2000.0;

/// Scene length at which multipliers are neutral
const REFERENCE_SCENE_MS: f64 = 5000.0;

/// Longest ambient move for scenes without focus targets
const MAX_AMBIENT_MS: f64 = 2500.0;

/// Durations of each phase of a zoom-mode scene, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    /// Random pose to center
    pub first_anim_ms: f64,
    /// Pause before the first focus move
    pub focus_delay_ms: f64,
    /// Move onto each target
    pub focus_anim_ms: f64,
    /// Hold on each target
    pub focus_hold_ms: f64,
    /// Final move back to center
    pub return_anim_ms: f64,
    /// Target count the phases were computed for (at least 1)
    pub num_targets: usize,
}

impl PhaseDurations {
    /// Sum of every phase, with focus and hold counted once per target
    pub fn total_ms(&self) -> f64 {
        self.first_anim_ms
            + self.focus_delay_ms
            + self.num_targets as f64 * (self.focus_anim_ms + self.focus_hold_ms)
            + self.return_anim_ms
    }
}

/// Split a zoom-mode scene across an intro, a delay, one focus and hold per
/// target, and a final return.
///
/// The remaining 70% after intro and delay is shared by the focus, hold and
/// return phases, scaled so their nominal shares fill it exactly. A multiplier
/// derived from the scene length speeds up or slows down the intro, delay and
/// focus moves; the hold absorbs whatever that shifts, so the uncapped total is
/// always the scene duration. Per-phase caps can only shorten the total.
pub fn zoom_phase_durations(scene_ms: f64, num_targets: usize) -> PhaseDurations {
    let scene_ms = sanitize(scene_ms);
    let num_targets = num_targets.max(1);
    let n = num_targets as f64;

    let remaining_share = 1.0 - INTRO_SHARE - DELAY_SHARE;
    let focus_share = FOCUS_SHARE / n;
    let hold_share = HOLD_SHARE / n;
    let scale = remaining_share / (n * (focus_share + hold_share) + RETURN_SHARE);
    let multiplier = speed_multiplier(scene_ms, 0.8, 1.2);

    let first_anim = scene_ms * INTRO_SHARE * multiplier;
    let focus_delay = scene_ms * DELAY_SHARE * multiplier;
    let focus_anim = scene_ms * focus_share * scale * multiplier;
    let return_anim = scene_ms * RETURN_SHARE * scale;

    let spent = first_anim + focus_delay + n * focus_anim + return_anim;
    let focus_hold = ((scene_ms - spent) / n).max(0.0);

    PhaseDurations {
        first_anim_ms: first_anim.min(MAX_INTRO_MS),
        focus_delay_ms: focus_delay.min(MAX_DELAY_MS),
        focus_anim_ms: focus_anim.min(MAX_FOCUS_MS),
        focus_hold_ms: focus_hold,
        return_anim_ms: return_anim.min(MAX_RETURN_MS),
        num_targets,
    }
}

/// Total zoom-mode animation time for a scene.
///
/// Scenes without targets use their whole duration.
pub fn zoom_total_duration(scene_ms: f64, num_targets: usize) -> f64 {
    if num_targets == 0 {
        return scene_ms;
    }
    zoom_phase_durations(scene_ms, num_targets).total_ms()
}

/// Duration of the single move used by scenes without focus targets
pub fn ambient_anim_duration(scene_ms: f64) -> f64 {
    let scene_ms = sanitize(scene_ms);
    let multiplier = speed_multiplier(scene_ms, 0.6, 1.5);
    (MAX_AMBIENT_MS * multiplier).min(scene_ms * 0.5)
}

/// Animate and hold durations of each cut-mode shot.
///
/// The scene is split into one shot per target plus a closing shot on the
/// center, each shot half approach and half hold.
pub fn cut_segment_durations(scene_ms: f64, num_targets: usize) -> (f64, f64) {
    let shot = sanitize(scene_ms) / (num_targets + 1) as f64;
    let approach = shot * 0.5;
    (approach, shot - approach)
}

fn speed_multiplier(scene_ms: f64, min: f64, max: f64) -> f64 {
    (scene_ms / REFERENCE_SCENE_MS).clamp(min, max)
}

fn sanitize(scene_ms: f64) -> f64 {
    if scene_ms.is_finite() {
        scene_ms.max(0.0)
    } else {
        0.0
    }
}
