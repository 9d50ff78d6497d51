// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout-space to plane-space geometry.
//!
//! Layout space is the pixel canvas a scene is composed on: origin at the
//! top-left, Y growing downward. Plane space is the flat viewing surface the
//! camera looks at: centered on the origin, Y growing upward, `z = 0`.

use crate::easing::Interpolation;
use crate::scene::{SceneNode, Source};
use serde::{Deserialize, Serialize};

/// Smallest and largest framing factors applied to the base distance
const MIN_DISTANCE_FACTOR: f32 = 0.5;
const MAX_DISTANCE_FACTOR: f32 = 2.0;

/// Share of the canvas a source should fill when framed
const FRAMING_FILL: f32 = 0.3;

/// A point or direction in plane space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X (right)
    pub x: f32,
    /// Y (up)
    pub y: f32,
    /// Z (toward the viewer)
    pub z: f32,
}

impl Vec3 {
    /// The origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation toward `other`
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        let [x, y, z] = Interpolation::lerp_vec3(self.to_array(), other.to_array(), t);
        Vec3 { x, y, z }
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Width and height of a canvas (pixels) or plane (world units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Extent {
    /// Create a new extent
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Half of the width
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Half of the height
    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }
}

/// A node's on-canvas rectangle after scale and crop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveRect {
    /// Left edge (layout units)
    pub x: f32,
    /// Top edge (layout units)
    pub y: f32,
    /// Width after scale and crop
    pub width: f32,
    /// Height after scale and crop
    pub height: f32,
}

impl EffectiveRect {
    /// Resolve the visible rectangle of `node` showing `source`.
    ///
    /// Each crop inset is scaled by its own axis before it is removed from the
    /// matching edge.
    pub fn resolve(node: &SceneNode, source: &Source) -> Self {
        let transform = &node.transform;
        let scale_x = non_zero_or(transform.scale.x, 1.0);
        let scale_y = non_zero_or(transform.scale.y, 1.0);
        let (natural_width, natural_height) = source.natural_size();
        let crop = &transform.crop;
        let (left, right) = (finite_or_zero(crop.left), finite_or_zero(crop.right));
        let (top, bottom) = (finite_or_zero(crop.top), finite_or_zero(crop.bottom));

        let width = natural_width * scale_x - left * scale_x - right * scale_x;
        let height = natural_height * scale_y - top * scale_y - bottom * scale_y;

        Self {
            x: finite_or_zero(transform.position.x) + left * scale_x,
            y: finite_or_zero(transform.position.y) + top * scale_y,
            width,
            height,
        }
    }

    /// Center of the rectangle in layout units
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Map a layout-space point to plane space.
pub fn canvas_to_plane(x: f32, y: f32, canvas: Extent, plane: Extent) -> Vec3 {
    let normalized_x = normalize(x, canvas.width);
    let normalized_y = normalize(y, canvas.height);

    Vec3 {
        x: (normalized_x - 0.5) * plane.width,
        y: (0.5 - normalized_y) * plane.height,
        z: 0.0,
    }
}

/// Map a plane-space point back to layout space. Inverse of [`canvas_to_plane`].
pub fn plane_to_canvas(point: Vec3, canvas: Extent, plane: Extent) -> (f32, f32) {
    let normalized_x = if plane.width == 0.0 { 0.5 } else { point.x / plane.width + 0.5 };
    let normalized_y = if plane.height == 0.0 { 0.5 } else { 0.5 - point.y / plane.height };
    (normalized_x * canvas.width, normalized_y * canvas.height)
}

/// Plane-space center of a node's visible rectangle
pub fn source_center_on_plane(
    node: &SceneNode,
    source: &Source,
    canvas: Extent,
    plane: Extent,
) -> Vec3 {
    let (center_x, center_y) = EffectiveRect::resolve(node, source).center();
    canvas_to_plane(center_x, center_y, canvas, plane)
}

/// Camera distance that frames a node's visible rectangle.
///
/// Small sources are approached from closer, large ones from farther, with the
/// factor clamped to `[0.5, 2.0]` of `base_distance`.
pub fn camera_distance_for_source(
    node: &SceneNode,
    source: &Source,
    canvas: Extent,
    base_distance: f32,
) -> f32 {
    let rect = EffectiveRect::resolve(node, source);
    let width_ratio = ratio(rect.width, canvas.width);
    let height_ratio = ratio(rect.height, canvas.height);
    let max_ratio = width_ratio.max(height_ratio);

    // Empty rectangles frame from farthest, over-cropped ones from closest
    let factor = if !max_ratio.is_finite() || max_ratio == 0.0 {
        MAX_DISTANCE_FACTOR
    } else if max_ratio < 0.0 {
        MIN_DISTANCE_FACTOR
    } else {
        (FRAMING_FILL / max_ratio).clamp(MIN_DISTANCE_FACTOR, MAX_DISTANCE_FACTOR)
    };

    base_distance * factor
}

fn normalize(value: f32, extent: f32) -> f32 {
    if extent == 0.0 || !extent.is_finite() {
        0.5
    } else {
        value / extent
    }
}

fn ratio(length: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        0.0
    } else {
        length / extent
    }
}

fn non_zero_or(value: f32, fallback: f32) -> f32 {
    if value == 0.0 || !value.is_finite() {
        fallback
    } else {
        value
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
