// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera controller capability driven by the player.

use crate::geometry::Vec3;
use crate::segment::CameraPose;

/// Whatever renders the camera.
///
/// The player is the only writer while it drives a controller.
pub trait CameraController {
    /// Current world position
    fn position(&self) -> Vec3;

    /// Current look-at point
    fn target(&self) -> Vec3;

    /// Move the camera without changing where it looks
    fn set_position(&mut self, x: f32, y: f32, z: f32);

    /// Place the camera at parameter `t` between two look-at states.
    ///
    /// `immediate` asks the renderer to skip any smoothing of its own.
    fn lerp_look_at(&mut self, from: &CameraPose, to: &CameraPose, t: f32, immediate: bool);

    /// Current pose
    fn pose(&self) -> CameraPose {
        CameraPose::new(self.position(), self.target())
    }
}

impl<C: CameraController + ?Sized> CameraController for &mut C {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn target(&self) -> Vec3 {
        (**self).target()
    }

    fn set_position(&mut self, x: f32, y: f32, z: f32) {
        (**self).set_position(x, y, z);
    }

    fn lerp_look_at(&mut self, from: &CameraPose, to: &CameraPose, t: f32, immediate: bool) {
        (**self).lerp_look_at(from, to, t, immediate);
    }
}

/// In-memory controller that stores the pose it is given
#[derive(Debug, Clone, Default)]
pub struct PoseController {
    pose: CameraPose,
    frames: u64,
}

impl PoseController {
    /// Start at `pose`
    pub fn new(pose: CameraPose) -> Self {
        Self { pose, frames: 0 }
    }

    /// Number of interpolation steps applied so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl CameraController for PoseController {
    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn target(&self) -> Vec3 {
        self.pose.target
    }

    fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.pose.position = Vec3::new(x, y, z);
    }

    fn lerp_look_at(&mut self, from: &CameraPose, to: &CameraPose, t: f32, _immediate: bool) {
        self.pose = from.lerp(to, t);
        self.frames += 1;
        tracing::trace!(
            x = self.pose.position.x,
            y = self.pose.position.y,
            z = self.pose.position.z,
            t,
            "Camera pose"
        );
    }

    fn pose(&self) -> CameraPose {
        self.pose
    }
}
