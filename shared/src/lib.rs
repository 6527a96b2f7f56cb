pub mod camera;
pub mod capsule;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod input;
pub mod locomotion;
pub mod math;
pub mod physics;
pub mod rapier_world;
pub mod simulation;
pub mod testing;
pub mod visual_sync;

pub use camera::{CameraMode, CameraPose, CameraRig};
pub use capsule::CapsuleShape;
pub use config::{CameraConfig, CharacterConfig};
pub use constants::MAX_FRAME_DT_S;
pub use controller::{CharacterController, CharacterState, UpdateReport};
pub use error::{AdapterError, ConfigError, SimError};
pub use input::{InputState, Key, MoveIntent};
pub use locomotion::{AnimationTrigger, Locomotion, LocomotionState};
pub use math::{Quat, Vec3, clamp_delta};
pub use physics::{BodyHandle, ColliderHandle, ContactSettings, KinematicCapsule, PhysicsAdapter};
pub use rapier_world::{ColliderShapeDef, RapierPhysicsAdapter, RapierQueryWorld, WorldStaticDef};
pub use simulation::{CharacterHandle, FrameReport, Simulation, TickOutcome, TickReport};
pub use visual_sync::{BodyPose, RenderTarget, sync_visual};
