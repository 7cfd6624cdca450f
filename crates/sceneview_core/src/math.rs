//! Pose math shared by the scene graph and the manipulation controllers.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World up direction.
pub const UP: Vec3 = Vec3::Y;

/// Forward direction of a node with identity rotation.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// A rigid transform: position plus rotation, no scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Decompose a matrix, discarding scale.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (_, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation: rotation.normalize(),
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Transform a point from this pose's space into the enclosing space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Express a point given in the enclosing space in this pose's space.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// The direction this pose's local up axis points to.
    pub fn up(&self) -> Vec3 {
        self.rotation * UP
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-frame interpolation factor for exponential-style smoothing.
///
/// `clamp(delta_seconds * speed, 0, 1)` so a long frame snaps instead of
/// overshooting.
#[inline]
pub fn smoothing_factor(delta_seconds: f32, speed: f32) -> f32 {
    (delta_seconds * speed).clamp(0.0, 1.0)
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Inputs need not be normalized. A degenerate (zero-length) input yields
/// the identity rotation.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Quat::IDENTITY;
    };
    Quat::from_rotation_arc(from, to)
}

/// Absolute quaternion dot product; 1.0 means the same orientation
/// regardless of the double cover sign.
#[inline]
pub fn rotation_alignment(a: Quat, b: Quat) -> f32 {
    a.dot(b).abs()
}

/// Wrap an angle in radians into `(-PI, PI]`.
pub fn wrap_angle(radians: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut wrapped = radians % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_smoothing_factor_clamps() {
        assert!((smoothing_factor(1.0 / 60.0, 12.0) - 0.2).abs() < 1e-6);
        assert_eq!(smoothing_factor(0.5, 12.0), 1.0);
        assert_eq!(smoothing_factor(-0.1, 12.0), 0.0);
    }

    #[test]
    fn test_rotation_between_maps_up_onto_target() {
        let target = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = rotation_between(UP, target);
        assert!((q * UP - target).length() < 1e-5);
    }

    #[test]
    fn test_rotation_between_opposite_vectors() {
        let q = rotation_between(FORWARD, -FORWARD);
        assert!((q * FORWARD + FORWARD).length() < 1e-5);
    }

    #[test]
    fn test_rotation_between_degenerate_is_identity() {
        assert_eq!(rotation_between(Vec3::ZERO, UP), Quat::IDENTITY);
    }

    #[test]
    fn test_rotation_alignment_ignores_sign() {
        let q = Quat::from_rotation_y(0.3);
        assert!((rotation_alignment(q, -q) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI / 2.0) + FRAC_PI_2).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - FRAC_PI_2).abs() < 1e-5);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_pose_matrix_round_trip_drops_scale() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_x(0.4));
        let scaled = pose.to_matrix() * Mat4::from_scale(Vec3::splat(2.0));
        let back = Pose::from_matrix(&scaled);
        assert!((back.position - pose.position).length() < 1e-5);
        assert!(rotation_alignment(back.rotation, pose.rotation) > 0.9999);
    }

    #[test]
    fn test_pose_inverse_transform_point() {
        let pose = Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let world = pose.transform_point(Vec3::X);
        let local = pose.inverse_transform_point(world);
        assert!((local - Vec3::X).length() < 1e-5);
    }
}
