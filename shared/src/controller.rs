//! Kinematic character controller.
//!
//! One [`CharacterController::update`] per tick turns a [`MoveIntent`] into a
//! collision-corrected displacement, in a fixed order:
//! 1. desired planar displacement from the camera-relative basis,
//! 2. vertical resolution (jump, optional gravity),
//! 3. groundedness query,
//! 4. sweep against the world,
//! 5. translation apply,
//! 6. body yaw follows the camera's horizontal look direction.
//!
//! Adapter failures never escape a tick. A failed grounded query reads as "not grounded",
//! a failed sweep as "did not move".

use crate::{
    config::CharacterConfig,
    constants::MIN_MOVE_SQ,
    error::SimError,
    input::MoveIntent,
    math::{Quat, Vec3, clamp_delta, clamp_length, is_finite_vec, planar_basis, yaw_of},
    physics::{ContactSettings, KinematicCapsule, PhysicsAdapter},
};

/// Mutable physics-side state of one character. Only the controller writes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterState {
    /// World-space capsule center (meters).
    pub position: Vec3,
    /// Body facing (radians about +Y). The body never pitches.
    pub body_yaw: f32,
    /// Last tick's velocity (m/s). `y` carries over between ticks for jumps and falls.
    pub velocity: Vec3,
    /// Result of the most recent grounded query.
    pub is_grounded: bool,
}

/// What a single update did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateReport {
    /// Displacement requested this tick.
    pub desired: Vec3,
    /// Displacement actually applied after collision.
    pub corrected: Vec3,
    pub jumped: bool,
    pub grounded: bool,
}

#[derive(Debug)]
pub struct CharacterController {
    config: CharacterConfig,
    capsule: KinematicCapsule,
    state: CharacterState,
}

impl CharacterController {
    /// Validates `config` and creates the character's kinematic capsule at `position`.
    pub fn spawn<A: PhysicsAdapter + ?Sized>(
        adapter: &mut A,
        position: Vec3,
        orientation: &Quat,
        config: CharacterConfig,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let shape = config.capsule()?;
        let contact = ContactSettings {
            skin_width: config.skin_width,
            max_slope_angle: config.max_slope_angle_rad(),
        };
        let capsule = adapter.create_capsule_collider(shape, contact, position)?;

        Ok(Self {
            config,
            capsule,
            state: CharacterState {
                position,
                body_yaw: yaw_of(orientation).unwrap_or(0.0),
                velocity: Vec3::zeros(),
                is_grounded: false,
            },
        })
    }

    #[inline]
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    #[inline]
    pub fn capsule(&self) -> KinematicCapsule {
        self.capsule
    }

    /// Planar velocity (m/s) requested by `intent` relative to the camera yaw.
    pub fn planar_velocity(&self, intent: &MoveIntent, camera_yaw: f32) -> Vec3 {
        let (forward, left) = planar_basis(camera_yaw);
        let direction = forward * intent.forward_axis() + left * intent.left_axis();
        if direction.norm_squared() <= MIN_MOVE_SQ {
            return Vec3::zeros();
        }

        let mut speed = self.config.move_speed;
        if intent.is_sprinting() {
            speed *= self.config.sprint_multiplier;
        }
        direction.normalize() * speed
    }

    /// Horizontal displacement for this tick: `move_speed * dt` along the summed
    /// camera-relative directions, or zero when they cancel out.
    pub fn compute_desired_velocity(
        &self,
        intent: &MoveIntent,
        camera_yaw: f32,
        dt: f32,
    ) -> Vec3 {
        self.planar_velocity(intent, camera_yaw) * dt
    }

    /// Fills in the vertical component of `desired` and updates the carried vertical speed.
    ///
    /// A jump applies only while grounded and not already rising, and clears
    /// `intent.jump_requested`. Airborne requests stay pending. Without gravity the vertical
    /// speed is zero whenever the character is not jumping.
    ///
    /// `is_grounded` is the answer from the previous tick's query, taken before that tick's
    /// sweep, so it still reads grounded on the tick after takeoff.
    pub fn resolve_vertical(&mut self, desired: Vec3, intent: &mut MoveIntent, dt: f32) -> Vec3 {
        let gravity = self.config.gravity_mps2;
        let vertical_speed = self.state.velocity.y;
        let can_jump = self.state.is_grounded && vertical_speed <= 0.0;

        let vertical_speed = if intent.jump_requested && can_jump {
            intent.jump_requested = false;
            log::debug!("Jump consumed at {:?}", self.state.position);
            self.config.jump_force
        } else if gravity <= 0.0 {
            0.0
        } else if self.state.is_grounded && vertical_speed <= 0.0 {
            0.0
        } else {
            (vertical_speed - gravity * dt).max(-self.config.terminal_fall_speed_mps)
        };

        self.state.velocity.y = vertical_speed;
        Vec3::new(desired.x, vertical_speed * dt, desired.z)
    }

    /// Refreshes `is_grounded` from the adapter, using the skin width as tolerance.
    pub fn compute_groundedness<A: PhysicsAdapter + ?Sized>(&mut self, adapter: &A) -> bool {
        let grounded = match adapter.query_grounded(self.capsule.collider, self.config.skin_width)
        {
            Ok(grounded) => grounded,
            Err(err) => {
                log::warn!("Grounded query failed, treating as airborne: {err}");
                false
            }
        };
        self.state.is_grounded = grounded;
        grounded
    }

    /// Sweeps the capsule along `desired` and returns the corrected displacement.
    ///
    /// The result is never longer than `desired`.
    pub fn move_and_collide<A: PhysicsAdapter + ?Sized>(
        &self,
        adapter: &mut A,
        desired: Vec3,
    ) -> Vec3 {
        if desired.norm_squared() <= MIN_MOVE_SQ {
            return Vec3::zeros();
        }

        match adapter.sweep_move(self.capsule.collider, desired) {
            Ok(corrected) if is_finite_vec(&corrected) => clamp_length(corrected, desired.norm()),
            Ok(corrected) => {
                log::warn!("Sweep returned non-finite displacement {corrected:?}, not moving");
                Vec3::zeros()
            }
            Err(err) => {
                log::warn!("Sweep failed, not moving: {err}");
                Vec3::zeros()
            }
        }
    }

    /// Adds `corrected` to the position and moves the kinematic body there.
    pub fn apply_translation<A: PhysicsAdapter + ?Sized>(
        &mut self,
        adapter: &mut A,
        corrected: Vec3,
    ) {
        if corrected == Vec3::zeros() {
            return;
        }
        self.state.position += corrected;
        let body = self.capsule.body;
        if let Err(err) = adapter.set_kinematic_translation(body, self.state.position) {
            log::warn!("Failed to place kinematic body: {err}");
        }
    }

    /// Advances the character by one tick. Returns `None` without touching any state when
    /// the adapter's world geometry is not loaded yet.
    pub fn update<A: PhysicsAdapter + ?Sized>(
        &mut self,
        adapter: &mut A,
        intent: &mut MoveIntent,
        camera_orientation: &Quat,
        dt: f32,
    ) -> Option<UpdateReport> {
        if !adapter.is_ready() {
            return None;
        }
        let dt = clamp_delta(dt);
        let camera_yaw = yaw_of(camera_orientation).unwrap_or(self.state.body_yaw);

        let planar = self.compute_desired_velocity(intent, camera_yaw, dt);
        let had_jump = intent.jump_requested;
        let desired = self.resolve_vertical(planar, intent, dt);
        let jumped = had_jump && !intent.jump_requested;

        let grounded = self.compute_groundedness(adapter);
        let corrected = self.move_and_collide(adapter, desired);
        self.apply_translation(adapter, corrected);

        // Planar velocity is what the sweep allowed, so a blocked character reads as still.
        let (vx, vz) = if dt > 0.0 {
            (corrected.x / dt, corrected.z / dt)
        } else {
            (0.0, 0.0)
        };
        self.state.velocity.x = vx;
        self.state.velocity.z = vz;
        self.state.body_yaw = camera_yaw;

        Some(UpdateReport {
            desired,
            corrected,
            jumped,
            grounded,
        })
    }

    /// Releases the character's capsule from the adapter.
    pub fn despawn<A: PhysicsAdapter + ?Sized>(self, adapter: &mut A) {
        adapter.remove_capsule(self.capsule);
    }
}
