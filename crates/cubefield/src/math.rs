//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] component provides position,
//! rotation, and scale for every spatial entity.
//!
//! Conventions: right-handed, Y up, and "forward" is `-Z` in local space.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// A 3D transform: position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_position(Vec3::new(x, y, z))
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Return a copy with the given rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Return a copy with a per-axis scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compute the 4x4 model matrix (translate · rotate · scale).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Local `-Z` rotated into world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Local `+X` rotated into world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local `+Y` rotated into world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Convert a quaternion to a scaled-axis vector (axis * angle), the rotation
/// format rapier's builders take.
pub fn quat_to_scaled_axis(q: Quat) -> Vec3 {
    let (axis, angle) = q.to_axis_angle();
    if angle.abs() < 1e-6 {
        Vec3::ZERO
    } else {
        axis * angle
    }
}

/// Rotate `rotation` by an angular velocity (axis-angle, radians per second)
/// over `dt` seconds, keeping the result normalized.
pub fn integrate_rotation(rotation: Quat, angular: Vec3, dt: f32) -> Quat {
    let speed = angular.length();
    if speed <= 0.0 {
        return rotation;
    }
    let delta = Quat::from_axis_angle(angular / speed, speed * dt);
    (delta * rotation).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_directions() {
        let t = Transform::IDENTITY;
        assert_eq!(t.forward(), Vec3::NEG_Z);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.up(), Vec3::Y);
    }

    #[test]
    fn yaw_turns_forward() {
        let t = Transform::default().with_rotation(Quat::from_rotation_y(FRAC_PI_2));
        assert!(approx(t.forward(), Vec3::NEG_X));
        assert!(approx(t.right(), Vec3::NEG_Z));
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0)
            .with_rotation(Quat::from_rotation_y(FRAC_PI_2))
            .with_scale(Vec3::splat(2.0));
        let p = t.matrix().transform_point3(Vec3::X);
        // scale → (2,0,0), rotate 90° about Y → (0,0,-2), translate.
        assert!(approx(p, Vec3::new(1.0, 2.0, 1.0)));
    }

    #[test]
    fn scaled_axis_round_trip() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.75);
        let v = quat_to_scaled_axis(q);
        assert!(approx(v, Vec3::new(0.0, 0.75, 0.0)));
        assert_eq!(quat_to_scaled_axis(Quat::IDENTITY), Vec3::ZERO);
    }

    #[test]
    fn integrate_rotation_about_y() {
        let r = integrate_rotation(Quat::IDENTITY, Vec3::new(0.0, FRAC_PI_2, 0.0), 1.0);
        assert!(approx(r * Vec3::NEG_Z, Vec3::NEG_X));
        assert_eq!(integrate_rotation(Quat::IDENTITY, Vec3::ZERO, 1.0), Quat::IDENTITY);
    }
}
