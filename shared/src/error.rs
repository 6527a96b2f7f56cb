//! Error taxonomy of the character core.
//!
//! - [`ConfigError`]: a host supplied an unusable configuration. Fatal at spawn.
//! - [`AdapterError`]: a physics adapter could not answer a query. The controller never
//!   propagates these out of a tick; they are downgraded to safe defaults.
//! - [`SimError`]: what the host-facing [`crate::Simulation`] API returns.

use thiserror::Error;

use crate::simulation::CharacterHandle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be a finite number")]
    NonFinite { field: &'static str },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("capsule height {height} is shorter than its diameter (radius {radius})")]
    CapsuleTooShort { radius: f32, height: f32 },

    #[error("zoom range is inverted: min {min} > max {max}")]
    InvertedZoom { min: f32, max: f32 },

    #[error("`{field}` must be within (0, 90) degrees, got {value}")]
    AngleOutOfRange { field: &'static str, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// World geometry has not finished loading.
    #[error("physics world geometry is not loaded yet")]
    NotReady,

    #[error("unknown collider handle {0}")]
    UnknownCollider(u32),

    #[error("unknown body handle {0}")]
    UnknownBody(u32),

    /// The query produced an inconsistent result (non-finite normal or displacement).
    #[error("collision query returned a malformed contact")]
    MalformedContact,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid character configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("no character for handle {0:?}")]
    UnknownCharacter(CharacterHandle),

    #[error("physics adapter failure: {0}")]
    Adapter(#[from] AdapterError),
}
