/*!
Character core tuning defaults and tolerances.

These constants centralize the values used by the controller, the camera rig,
and the Rapier adapter. Keeping them together makes tuning easier and keeps the
defaults of `CharacterConfig`/`CameraConfig` in one place.

Notes
- Distances are in meters, time in seconds, angles in degrees unless the name says `_RAD`.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Upper bound for the simulated time of a single frame (seconds).
///
/// Long frame stalls (a backgrounded window, a debugger break) would otherwise turn into
/// one huge displacement that can tunnel the capsule through thin geometry.
pub const MAX_FRAME_DT_S: f32 = 0.10;

/// Separation kept from surfaces when sweeping, also used as the grounded tolerance (meters).
pub const DEFAULT_SKIN: f32 = 0.02;

/// Capsule radius (meters).
pub const DEFAULT_CAPSULE_RADIUS: f32 = 0.5;

/// Total capsule height including both hemispherical caps (meters).
pub const DEFAULT_CAPSULE_HEIGHT: f32 = 2.0;

/// Default walking speed in meters per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 5.0;

/// Vertical speed given by a jump (meters per second).
pub const DEFAULT_JUMP_FORCE: f32 = 7.0;

/// Multiplier applied to the walking speed while sprinting forward.
pub const DEFAULT_SPRINT_MULTIPLIER: f32 = 1.9;

/// Maximum climbable slope angle (degrees).
pub const DEFAULT_MAX_SLOPE_DEG: f32 = 45.0;

/// Downward acceleration while airborne (m/s^2). Zero keeps the vertical velocity at rest
/// whenever the character is not jumping.
pub const DEFAULT_GRAVITY_MPS2: f32 = 0.0;

/// Fastest downward speed reachable through gravity (m/s, positive magnitude).
pub const DEFAULT_TERMINAL_FALL_SPEED_MPS: f32 = 50.0;

/// Closest third-person camera distance; at or below it the rig switches to first person.
pub const DEFAULT_ZOOM_MIN: f32 = 1.0;

/// Farthest third-person camera distance.
pub const DEFAULT_ZOOM_MAX: f32 = 10.0;

/// Distance change for a single scroll notch.
pub const DEFAULT_ZOOM_STEP: f32 = 0.1;

/// Radians of camera rotation per unit of pointer motion.
pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.002;

/// Pitch limit of the look camera (degrees, symmetric).
pub const DEFAULT_MAX_PITCH_DEG: f32 = 89.0;

/// Camera offset (relative to the body, in body space) used in third person.
/// The z component is replaced by the current zoom distance.
pub const DEFAULT_THIRD_PERSON_OFFSET: [f32; 3] = [
    1.0,
    DEFAULT_CAPSULE_HEIGHT,
    DEFAULT_ZOOM_MAX - (DEFAULT_ZOOM_MAX - DEFAULT_ZOOM_MIN) / 2.0,
];

/// Camera offset (relative to the body, in body space) used in first person: eye level.
pub const DEFAULT_FIRST_PERSON_OFFSET: [f32; 3] = [0.0, 0.5, 0.0];

/// Minimum squared movement considered meaningful (m^2).
pub const MIN_MOVE_SQ: f32 = 1.0e-8;

/// Minimum planar length required to derive a yaw from a direction.
pub const YAW_EPS: f32 = 1.0e-6;

/// Height above the capsule's lowest point where the ground probe ray starts (meters).
/// Starting slightly above the feet avoids beginning the cast inside the ground.
pub const GROUND_PROBE_LIFT: f32 = 0.02;

/// Fixed integration step used by the Rapier adapter until the first world step (seconds).
pub const DEFAULT_PHYSICS_DT: f32 = 1.0 / 60.0;
