//! Scriptable in-memory [`PhysicsAdapter`] for tests and headless hosts.
//!
//! - Readiness and grounded answers are set directly.
//! - Walls are axis-aligned planes that stop the capsule surface `skin_width` short of them.
//! - Sweeps can be scaled to emulate a backend that returns too much.
//! - Every query is counted so tests can assert call order and frequency.

use std::cell::Cell;

use crate::{
    capsule::CapsuleShape,
    error::AdapterError,
    math::Vec3,
    physics::{BodyHandle, ColliderHandle, ContactSettings, KinematicCapsule, PhysicsAdapter},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Infinite plane `coordinate[axis] == at` blocking motion from either side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisWall {
    pub axis: Axis,
    pub at: f32,
}

#[derive(Clone, Copy, Debug)]
struct FakeCapsule {
    shape: CapsuleShape,
    contact: ContactSettings,
    position: Vec3,
}

impl FakeCapsule {
    /// Distance from the center to the surface along `axis`.
    fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Y => self.shape.half_extent_y(),
            Axis::X | Axis::Z => self.shape.radius,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakePhysicsAdapter {
    ready: bool,
    grounded: bool,
    grounded_error: Option<AdapterError>,
    malformed_sweep: bool,
    /// Multiplies every sweep result, to emulate a backend that overshoots.
    sweep_scale: Option<f32>,
    walls: Vec<AxisWall>,
    capsules: Vec<Option<FakeCapsule>>,
    // Grounded queries take `&self`.
    grounded_queries: Cell<u32>,
    sweeps: u32,
    translations: u32,
    steps: u32,
    last_step_dt: Option<f32>,
}

impl FakePhysicsAdapter {
    /// A loaded world where every grounded query answers `true`.
    pub fn ready() -> Self {
        Self {
            ready: true,
            grounded: true,
            ..Self::default()
        }
    }

    /// A world whose geometry has not finished loading.
    pub fn loading() -> Self {
        Self {
            grounded: true,
            ..Self::default()
        }
    }

    pub fn with_wall(mut self, axis: Axis, at: f32) -> Self {
        self.walls.push(AxisWall { axis, at });
        self
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    /// Makes grounded queries fail with `error` (or succeed again with `None`).
    pub fn fail_grounded(&mut self, error: Option<AdapterError>) {
        self.grounded_error = error;
    }

    /// Makes sweeps report a non-finite displacement.
    pub fn set_malformed_sweep(&mut self, malformed: bool) {
        self.malformed_sweep = malformed;
    }

    /// Scales sweep results by `scale`. Values above 1 return more than was asked for.
    pub fn set_sweep_scale(&mut self, scale: f32) {
        self.sweep_scale = Some(scale);
    }

    pub fn position(&self, collider: ColliderHandle) -> Option<Vec3> {
        self.slot(collider.0).map(|capsule| capsule.position)
    }

    pub fn capsule_count(&self) -> usize {
        self.capsules.iter().flatten().count()
    }

    pub fn grounded_queries(&self) -> u32 {
        self.grounded_queries.get()
    }

    pub fn sweeps(&self) -> u32 {
        self.sweeps
    }

    pub fn translations(&self) -> u32 {
        self.translations
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn last_step_dt(&self) -> Option<f32> {
        self.last_step_dt
    }

    fn slot(&self, id: u32) -> Option<&FakeCapsule> {
        self.capsules.get(id as usize).and_then(Option::as_ref)
    }

    /// Clamps each component of `desired` so the capsule surface stops `skin` short of
    /// any wall it would cross.
    fn clip_against_walls(&self, capsule: &FakeCapsule, desired: Vec3) -> Vec3 {
        let mut corrected = desired;
        let skin = capsule.contact.skin_width;

        for wall in &self.walls {
            let i = wall.axis.index();
            let center = capsule.position[i];
            let reach = capsule.extent(wall.axis) + skin;
            let d = corrected[i];

            if d > 0.0 && center < wall.at {
                let limit = (wall.at - reach - center).max(0.0);
                corrected[i] = d.min(limit);
            } else if d < 0.0 && center > wall.at {
                let limit = (wall.at + reach - center).min(0.0);
                corrected[i] = d.max(limit);
            }
        }
        corrected
    }
}

impl PhysicsAdapter for FakePhysicsAdapter {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn create_capsule_collider(
        &mut self,
        capsule: CapsuleShape,
        contact: ContactSettings,
        position: Vec3,
    ) -> Result<KinematicCapsule, AdapterError> {
        let id = self.capsules.len() as u32;
        self.capsules.push(Some(FakeCapsule {
            shape: capsule,
            contact,
            position,
        }));
        Ok(KinematicCapsule {
            body: BodyHandle(id),
            collider: ColliderHandle(id),
        })
    }

    fn remove_capsule(&mut self, capsule: KinematicCapsule) {
        if let Some(slot) = self.capsules.get_mut(capsule.collider.0 as usize) {
            *slot = None;
        }
    }

    fn query_grounded(
        &self,
        collider: ColliderHandle,
        _skin_width: f32,
    ) -> Result<bool, AdapterError> {
        self.grounded_queries.set(self.grounded_queries.get() + 1);
        if self.slot(collider.0).is_none() {
            return Err(AdapterError::UnknownCollider(collider.0));
        }
        if !self.ready {
            return Err(AdapterError::NotReady);
        }
        match self.grounded_error {
            Some(err) => Err(err),
            None => Ok(self.grounded),
        }
    }

    fn sweep_move(
        &mut self,
        collider: ColliderHandle,
        desired: Vec3,
    ) -> Result<Vec3, AdapterError> {
        self.sweeps += 1;
        let capsule = *self
            .slot(collider.0)
            .ok_or(AdapterError::UnknownCollider(collider.0))?;
        if !self.ready {
            return Err(AdapterError::NotReady);
        }
        if self.malformed_sweep {
            return Ok(Vec3::new(f32::NAN, 0.0, 0.0));
        }
        let corrected = self.clip_against_walls(&capsule, desired);
        Ok(corrected * self.sweep_scale.unwrap_or(1.0))
    }

    fn set_kinematic_translation(
        &mut self,
        body: BodyHandle,
        position: Vec3,
    ) -> Result<(), AdapterError> {
        self.translations += 1;
        let capsule = self
            .capsules
            .get_mut(body.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(AdapterError::UnknownBody(body.0))?;
        capsule.position = position;
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        self.steps += 1;
        self.last_step_dt = Some(dt);
    }
}
