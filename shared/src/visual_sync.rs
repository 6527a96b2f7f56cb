//! One-way copy of the physics-resolved body pose onto a render node.

use crate::math::{Quat, Vec3, yaw_rotation};

/// World-space body placement: capsule center and yaw-only facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl BodyPose {
    pub fn from_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            orientation: yaw_rotation(yaw),
        }
    }
}

/// Anything the body pose can be written to (a scene node, an engine transform).
pub trait RenderTarget {
    fn apply_pose(&mut self, pose: &BodyPose);
}

/// Writes `pose` to `target` if it exists yet. Returns whether a copy happened.
///
/// A missing target (model still loading) is skipped silently.
pub fn sync_visual<T: RenderTarget + ?Sized>(pose: &BodyPose, target: Option<&mut T>) -> bool {
    match target {
        Some(target) => {
            target.apply_pose(pose);
            true
        }
        None => false,
    }
}
