//! Camera rig: look angles, zoom distance, and the resolved camera pose.
//!
//! The camera orientation comes only from look input (yaw/pitch). The camera position is
//! the body position plus an offset rotated by the body yaw. The offset is either the
//! third-person offset with its z replaced by the zoom distance, or the first-person eye
//! offset once the distance reaches `zoom_min`. The switch is discrete, not blended.

use std::f32::consts::{PI, TAU};

use crate::{
    config::CameraConfig,
    error::ConfigError,
    math::{Quat, Vec3, yaw_rotation},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
}

/// World-space camera placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
}

#[derive(Clone, Debug)]
pub struct CameraRig {
    config: CameraConfig,
    /// Third-person distance, always within `[zoom_min, zoom_max]`.
    distance: f32,
    yaw: f32,
    pitch: f32,
    pose: CameraPose,
}

impl CameraRig {
    pub fn new(config: CameraConfig, initial_yaw: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let distance = config.third_person_offset[2].clamp(config.zoom_min, config.zoom_max);
        let yaw = wrap_angle(initial_yaw);

        Ok(Self {
            config,
            distance,
            yaw,
            pitch: 0.0,
            pose: CameraPose {
                position: Vec3::zeros(),
                orientation: yaw_rotation(yaw),
            },
        })
    }

    #[inline]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn mode(&self) -> CameraMode {
        if self.distance <= self.config.zoom_min {
            CameraMode::FirstPerson
        } else {
            CameraMode::ThirdPerson
        }
    }

    /// Zooms by `scroll` notches of `zoom_step` each: positive zooms out, negative zooms in.
    /// Fractional notches (touchpads) move proportionally. The distance is clamped to
    /// `[zoom_min, zoom_max]`.
    pub fn on_zoom_input(&mut self, scroll: f32) {
        if !scroll.is_finite() || scroll == 0.0 {
            return;
        }
        let before = self.mode();
        self.distance = (self.distance + scroll * self.config.zoom_step)
            .clamp(self.config.zoom_min, self.config.zoom_max);

        let after = self.mode();
        if before != after {
            log::debug!("Camera switched to {after:?} at distance {}", self.distance);
        }
    }

    /// Applies look deltas (radians). Yaw wraps, pitch is clamped to `max_pitch_deg`.
    pub fn apply_look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if yaw_delta.is_finite() {
            self.yaw = wrap_angle(self.yaw + yaw_delta);
        }
        if pitch_delta.is_finite() {
            let max_pitch = self.config.max_pitch_rad();
            self.pitch = (self.pitch + pitch_delta).clamp(-max_pitch, max_pitch);
        }
    }

    /// Look orientation: yaw about +Y, then pitch about the local +X.
    pub fn orientation(&self) -> Quat {
        yaw_rotation(self.yaw) * Quat::from_axis_angle(&Vec3::x_axis(), self.pitch)
    }

    /// Body-space offset for the current mode.
    pub fn offset(&self) -> Vec3 {
        match self.mode() {
            CameraMode::FirstPerson => self.config.first_person_offset(),
            CameraMode::ThirdPerson => {
                let mut offset = self.config.third_person_offset();
                offset.z = self.distance;
                offset
            }
        }
    }

    /// Places the camera relative to a body at `body_position` facing `body_yaw`.
    pub fn resolve_pose(&mut self, body_position: Vec3, body_yaw: f32) -> CameraPose {
        self.pose = CameraPose {
            position: body_position + yaw_rotation(body_yaw) * self.offset(),
            orientation: self.orientation(),
        };
        self.pose
    }

    /// The pose from the last [`CameraRig::resolve_pose`].
    #[inline]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }
}

/// Wraps an angle into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}
