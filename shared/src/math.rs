//! Math aliases and small geometric helpers shared by the controller and the camera rig.
//!
//! Conventions
//! - Right-handed, +Y up.
//! - Yaw is a rotation about +Y. At yaw 0 the view direction is -Z.
//! - `left = up x forward`, `right = -left`.

use nalgebra as na;

use crate::constants::{MAX_FRAME_DT_S, YAW_EPS};

pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Clamps a raw frame delta into `[0, MAX_FRAME_DT_S]`. NaN is treated as no time passing.
#[inline]
pub fn clamp_delta(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, MAX_FRAME_DT_S)
}

/// Rotation about +Y by `yaw` radians.
#[inline]
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw)
}

/// Horizontal unit view direction for `yaw`.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Inverse of [`forward_from_yaw`] for any planar direction.
///
/// Returns `None` when the direction has (almost) no horizontal extent.
pub fn yaw_from_xz(x: f32, z: f32) -> Option<f32> {
    if x * x + z * z > YAW_EPS {
        return Some((-x).atan2(-z));
    }

    None
}

/// Yaw of the horizontal projection of the rotated view direction.
///
/// Returns `None` when the rotation looks straight up or down.
pub fn yaw_of(rotation: &Quat) -> Option<f32> {
    let view = rotation * Vec3::new(0.0, 0.0, -1.0);
    yaw_from_xz(view.x, view.z)
}

/// Camera-relative planar basis `(forward, left)` for the given yaw.
///
/// `forward` is the view direction with its vertical component removed, `left` is
/// `up x forward`. Both are unit length.
pub fn planar_basis(yaw: f32) -> (Vec3, Vec3) {
    let forward = forward_from_yaw(yaw);
    let left = Vec3::y().cross(&forward).normalize();
    (forward, left)
}

/// Shortens `v` to at most `max_len` without changing its direction.
pub fn clamp_length(v: Vec3, max_len: f32) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq <= max_len * max_len || len_sq == 0.0 {
        return v;
    }
    v * (max_len / len_sq.sqrt())
}

#[inline]
pub fn is_finite_vec(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Converts a `[x, y, z]` config triple into a vector.
#[inline]
pub fn vec3_from_array(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn clamp_delta_caps_long_frames() {
        assert_eq!(clamp_delta(0.016), 0.016);
        assert_eq!(clamp_delta(0.1), 0.1);
        assert_eq!(clamp_delta(0.5), MAX_FRAME_DT_S);
        assert_eq!(clamp_delta(1.0e6), MAX_FRAME_DT_S);
    }

    #[test]
    fn clamp_delta_rejects_negative_and_nan() {
        assert_eq!(clamp_delta(-0.2), 0.0);
        assert_eq!(clamp_delta(f32::NAN), 0.0);
    }

    #[test]
    fn yaw_zero_looks_down_negative_z() {
        let (forward, left) = planar_basis(0.0);
        assert_abs_diff_eq!(forward, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        // Right-handed with -Z forward: left is -X.
        assert_abs_diff_eq!(left, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn yaw_rotation_agrees_with_forward_from_yaw() {
        for yaw in [0.0, 0.3, FRAC_PI_2, -2.0, 3.0] {
            let rotated = yaw_rotation(yaw) * Vec3::new(0.0, 0.0, -1.0);
            assert_abs_diff_eq!(rotated, forward_from_yaw(yaw), epsilon = 1e-5);
        }
    }

    #[test]
    fn yaw_from_xz_inverts_forward_from_yaw() {
        for yaw in [0.0, 0.3, FRAC_PI_2, -2.0, 3.0] {
            let f = forward_from_yaw(yaw);
            let back = yaw_from_xz(f.x, f.z).unwrap();
            assert_abs_diff_eq!(back, yaw, epsilon = 1e-5);
        }
        assert_eq!(yaw_from_xz(0.0, 0.0), None);
    }

    #[test]
    fn yaw_of_ignores_pitch() {
        let q = yaw_rotation(0.7) * Quat::from_axis_angle(&Vec3::x_axis(), -0.4);
        assert_abs_diff_eq!(yaw_of(&q).unwrap(), 0.7, epsilon = 1e-5);

        // Straight down has no horizontal view direction.
        let down = Quat::from_axis_angle(&Vec3::x_axis(), -FRAC_PI_2);
        assert_eq!(yaw_of(&down), None);
    }

    #[test]
    fn clamp_length_only_shortens() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert_abs_diff_eq!(clamp_length(v, 10.0), v);
        assert_abs_diff_eq!(clamp_length(v, 1.0).norm(), 1.0, epsilon = 1e-6);
        assert_eq!(clamp_length(Vec3::zeros(), 0.0), Vec3::zeros());
    }
}
