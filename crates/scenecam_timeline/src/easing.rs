// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves and interpolation helpers.

use serde::{Deserialize, Serialize};

/// Easing curve applied to an animate segment's progress.
///
/// Serialized by id. Unknown ids decode as [`Easing::Power3Out`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    /// Quadratic ease in and out
    Power2InOut,
    /// Cubic ease out
    #[default]
    Power3Out,
    /// Quartic ease out
    Power4Out,
}

impl Easing {
    /// Stable id used on the wire
    pub fn id(&self) -> &'static str {
        match self {
            Self::Power2InOut => "power2-inout",
            Self::Power3Out => "power3-out",
            Self::Power4Out => "power4-out",
        }
    }

    /// Resolve an id, falling back to [`Easing::Power3Out`]
    pub fn from_id(id: &str) -> Self {
        match id {
            "power2-inout" | "power2.inOut" => Self::Power2InOut,
            "power3-out" | "power3.out" => Self::Power3Out,
            "power4-out" | "power4.out" => Self::Power4Out,
            other => {
                tracing::warn!(easing = other, "Unknown easing id, using power3-out");
                Self::Power3Out
            }
        }
    }

    /// Map linear progress `t` in `[0, 1]` onto the curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::Power3Out => 1.0 - (1.0 - t).powi(3),
            Self::Power4Out => 1.0 - (1.0 - t).powi(4),
        }
    }
}

impl From<String> for Easing {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.id().to_string()
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats, exact at both ends
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a * (1.0 - t) + b * t
    }

    /// Interpolate Vec3
    pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
        ]
    }

    /// Progress of `elapsed_ms` through `duration_ms`, clamped to `[0, 1]`.
    ///
    /// Zero-length spans are complete immediately.
    pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f32 {
        if duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / duration_ms).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curves_hit_endpoints() {
        for easing in [Easing::Power2InOut, Easing::Power3Out, Easing::Power4Out] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_curve_shapes() {
        assert!((Easing::Power2InOut.apply(0.25) - 0.125).abs() < 1e-6);
        assert!((Easing::Power2InOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::Power2InOut.apply(0.75) - 0.875).abs() < 1e-6);
        assert!((Easing::Power3Out.apply(0.5) - 0.875).abs() < 1e-6);
        assert!((Easing::Power4Out.apply(0.5) - 0.9375).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_id_defaults_to_power3_out() {
        assert_eq!(Easing::from_id("bounce"), Easing::Power3Out);
        let decoded: Easing = serde_json::from_str("\"elastic.out\"").unwrap();
        assert_eq!(decoded, Easing::Power3Out);
        let encoded = serde_json::to_string(&Easing::Power2InOut).unwrap();
        assert_eq!(encoded, "\"power2-inout\"");
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(Interpolation::progress(50.0, 100.0), 0.5);
        assert_eq!(Interpolation::progress(250.0, 100.0), 1.0);
        assert_eq!(Interpolation::progress(-5.0, 100.0), 0.0);
        assert_eq!(Interpolation::progress(0.0, 0.0), 1.0);
    }
}
