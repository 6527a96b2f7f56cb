//! Character and camera configuration.
//!
//! Both structs are plain data with serde support so a host can load them from a file.
//! They are validated once at spawn (see [`crate::Simulation::spawn`]) and never mutated
//! afterwards: the simulation only hands out shared references.

use serde::{Deserialize, Serialize};

use crate::{
    capsule::CapsuleShape,
    constants::*,
    error::ConfigError,
    math::{Vec3, vec3_from_array},
};

/// Immutable per-character tuning.
///
/// Values are expressed in meters, seconds, and degrees (converted to radians at runtime).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Capsule radius (meters).
    pub radius: f32,
    /// Total capsule height including caps (meters).
    pub height: f32,
    /// Walking speed (m/s).
    pub move_speed: f32,
    /// Vertical speed applied by a jump (m/s).
    pub jump_force: f32,
    /// Maximum climbable slope angle (degrees).
    pub max_slope_angle_deg: f32,
    /// Gap kept between the character and surfaces, also the grounded tolerance (meters).
    pub skin_width: f32,
    /// Speed multiplier while sprinting forward.
    pub sprint_multiplier: f32,
    /// Downward acceleration while airborne (m/s^2). Zero disables gravity.
    pub gravity_mps2: f32,
    /// Fastest downward speed gravity can reach (m/s, positive magnitude).
    pub terminal_fall_speed_mps: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_CAPSULE_RADIUS,
            height: DEFAULT_CAPSULE_HEIGHT,
            move_speed: DEFAULT_MOVEMENT_SPEED,
            jump_force: DEFAULT_JUMP_FORCE,
            max_slope_angle_deg: DEFAULT_MAX_SLOPE_DEG,
            skin_width: DEFAULT_SKIN,
            sprint_multiplier: DEFAULT_SPRINT_MULTIPLIER,
            gravity_mps2: DEFAULT_GRAVITY_MPS2,
            terminal_fall_speed_mps: DEFAULT_TERMINAL_FALL_SPEED_MPS,
        }
    }
}

impl CharacterConfig {
    /// Checks every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capsule()?;
        positive("move_speed", self.move_speed)?;
        non_negative("jump_force", self.jump_force)?;
        non_negative("skin_width", self.skin_width)?;
        positive("sprint_multiplier", self.sprint_multiplier)?;
        non_negative("gravity_mps2", self.gravity_mps2)?;
        positive("terminal_fall_speed_mps", self.terminal_fall_speed_mps)?;

        finite("max_slope_angle_deg", self.max_slope_angle_deg)?;
        if self.max_slope_angle_deg <= 0.0 || self.max_slope_angle_deg >= 90.0 {
            return Err(ConfigError::AngleOutOfRange {
                field: "max_slope_angle_deg",
                value: self.max_slope_angle_deg,
            });
        }
        Ok(())
    }

    /// The collision volume described by `radius` and `height`.
    pub fn capsule(&self) -> Result<CapsuleShape, ConfigError> {
        CapsuleShape::new(self.radius, self.height)
    }

    #[inline]
    pub fn max_slope_angle_rad(&self) -> f32 {
        self.max_slope_angle_deg.to_radians()
    }
}

/// Camera rig tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Closest third-person distance. At or below it the rig uses `first_person_offset`.
    pub zoom_min: f32,
    /// Farthest third-person distance.
    pub zoom_max: f32,
    /// Distance change per scroll notch.
    pub zoom_step: f32,
    /// Body-space offset in third person. Its z component is the initial zoom distance.
    pub third_person_offset: [f32; 3],
    /// Body-space offset in first person (eye level).
    pub first_person_offset: [f32; 3],
    /// Radians per unit of pointer motion.
    pub look_sensitivity: f32,
    /// Pitch limit (degrees, symmetric).
    pub max_pitch_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_min: DEFAULT_ZOOM_MIN,
            zoom_max: DEFAULT_ZOOM_MAX,
            zoom_step: DEFAULT_ZOOM_STEP,
            third_person_offset: DEFAULT_THIRD_PERSON_OFFSET,
            first_person_offset: DEFAULT_FIRST_PERSON_OFFSET,
            look_sensitivity: DEFAULT_LOOK_SENSITIVITY,
            max_pitch_deg: DEFAULT_MAX_PITCH_DEG,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("zoom_min", self.zoom_min)?;
        positive("zoom_max", self.zoom_max)?;
        if self.zoom_min > self.zoom_max {
            return Err(ConfigError::InvertedZoom {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        positive("zoom_step", self.zoom_step)?;
        non_negative("look_sensitivity", self.look_sensitivity)?;
        for (field, offset) in [
            ("third_person_offset", self.third_person_offset),
            ("first_person_offset", self.first_person_offset),
        ] {
            if offset.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::NonFinite { field });
            }
        }

        finite("max_pitch_deg", self.max_pitch_deg)?;
        if self.max_pitch_deg <= 0.0 || self.max_pitch_deg >= 90.0 {
            return Err(ConfigError::AngleOutOfRange {
                field: "max_pitch_deg",
                value: self.max_pitch_deg,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn third_person_offset(&self) -> Vec3 {
        vec3_from_array(self.third_person_offset)
    }

    #[inline]
    pub fn first_person_offset(&self) -> Vec3 {
        vec3_from_array(self.first_person_offset)
    }

    #[inline]
    pub fn max_pitch_rad(&self) -> f32 {
        self.max_pitch_deg.to_radians()
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(CharacterConfig::default().validate(), Ok(()));
        assert_eq!(CameraConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_third_person_distance_is_mid_zoom() {
        let camera = CameraConfig::default();
        // zoom_max - (zoom_max - zoom_min) / 2
        assert_eq!(camera.third_person_offset[2], 5.5);
    }

    #[test]
    fn non_positive_move_speed_is_rejected() {
        let config = CharacterConfig {
            move_speed: 0.0,
            ..CharacterConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "move_speed",
                value: 0.0
            })
        );
    }

    #[test]
    fn non_positive_capsule_is_rejected() {
        let config = CharacterConfig {
            radius: -0.5,
            ..CharacterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "radius", .. })
        ));

        let config = CharacterConfig {
            height: 0.0,
            ..CharacterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "height", .. })
        ));
    }

    #[test]
    fn slope_must_be_an_acute_angle() {
        let config = CharacterConfig {
            max_slope_angle_deg: 90.0,
            ..CharacterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AngleOutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_zoom_is_rejected() {
        let camera = CameraConfig {
            zoom_min: 5.0,
            zoom_max: 2.0,
            ..CameraConfig::default()
        };
        assert_eq!(
            camera.validate(),
            Err(ConfigError::InvertedZoom { min: 5.0, max: 2.0 })
        );
    }
}
