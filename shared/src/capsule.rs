use crate::error::ConfigError;

/// Y-aligned capsule describing the character's collidable volume (meters).
///
/// `height` is the total height including both hemispherical caps, so the straight
/// segment between the cap centers is `height - 2 * radius` long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub height: f32,
}

impl CapsuleShape {
    pub fn new(radius: f32, height: f32) -> Result<Self, ConfigError> {
        if !radius.is_finite() {
            return Err(ConfigError::NonFinite { field: "radius" });
        }
        if !height.is_finite() {
            return Err(ConfigError::NonFinite { field: "height" });
        }
        if radius <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "radius",
                value: radius,
            });
        }
        if height <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "height",
                value: height,
            });
        }
        if height < 2.0 * radius {
            return Err(ConfigError::CapsuleTooShort { radius, height });
        }
        Ok(Self { radius, height })
    }

    /// Half length of the straight segment, the value Rapier/parry call `half_height`.
    #[inline]
    pub fn segment_half_height(&self) -> f32 {
        ((self.height - 2.0 * self.radius) * 0.5).max(0.0)
    }

    /// Distance from the capsule center to its lowest point.
    #[inline]
    pub fn half_extent_y(&self) -> f32 {
        self.height * 0.5
    }
}
