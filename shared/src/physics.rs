//! Narrow interface between the character core and a physics engine.
//!
//! The core never owns rigid bodies or steps dynamics itself. It asks an adapter to:
//! - create a kinematic capsule for a character,
//! - answer "is this capsule standing on something" within a tolerance,
//! - sweep the capsule along a desired displacement and return the collision-corrected one,
//! - place the kinematic body at its new position,
//! - advance the world once per frame.
//!
//! No panics cross this boundary: every query returns a `Result` the controller inspects.
//! [`crate::rapier_world::RapierPhysicsAdapter`] is the production implementation and
//! [`crate::testing::FakePhysicsAdapter`] the scriptable test double.

use crate::{capsule::CapsuleShape, error::AdapterError, math::Vec3};

/// Identifies a character collider inside an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub u32);

/// Identifies the kinematic body a character collider is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// The pair of handles created for one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KinematicCapsule {
    pub body: BodyHandle,
    pub collider: ColliderHandle,
}

/// Contact parameters fixed when the capsule is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactSettings {
    /// Gap kept from surfaces while sweeping (meters).
    pub skin_width: f32,
    /// Steepest walkable slope (radians). Steeper surfaces block like walls.
    pub max_slope_angle: f32,
}

pub trait PhysicsAdapter {
    /// Whether the world geometry the character collides with has finished loading.
    fn is_ready(&self) -> bool;

    /// Creates a kinematic body with a Y-aligned capsule collider centered at `position`.
    fn create_capsule_collider(
        &mut self,
        capsule: CapsuleShape,
        contact: ContactSettings,
        position: Vec3,
    ) -> Result<KinematicCapsule, AdapterError>;

    /// Removes a capsule created by [`PhysicsAdapter::create_capsule_collider`].
    fn remove_capsule(&mut self, capsule: KinematicCapsule);

    /// Whether the collider has a walkable contact beneath it within `skin_width`.
    fn query_grounded(
        &self,
        collider: ColliderHandle,
        skin_width: f32,
    ) -> Result<bool, AdapterError>;

    /// Sweeps the collider along `desired` and returns the largest non-penetrating
    /// displacement along the corrected (possibly deflected) path.
    ///
    /// Implementations must never report a displacement that increases penetration.
    fn sweep_move(
        &mut self,
        collider: ColliderHandle,
        desired: Vec3,
    ) -> Result<Vec3, AdapterError>;

    /// Places the kinematic body at `position` (world space).
    fn set_kinematic_translation(
        &mut self,
        body: BodyHandle,
        position: Vec3,
    ) -> Result<(), AdapterError>;

    /// Advances the physics world by `dt` seconds. Called exactly once per frame.
    fn step(&mut self, dt: f32);
}
