//! Rigid-body transforms.
//!
//! A [`Transform`] pairs a translation with a unit-quaternion rotation.  The
//! transform from frame A to frame B is the pose of B expressed in A: it maps
//! a point given in B's coordinates into A's coordinates by rotating it and
//! then adding the translation.
//!
//! Composition order is fixed across the whole crate: `a.apply(b)` performs
//! `b`'s displacement first and `a`'s second, so chaining the edges of a path
//! in source→target order is `result = result.apply(step)`.
//!
//! # Example
//!
//! ```rust
//! use kinematic_geometry::transform::Transform;
//! use nalgebra::Vector3;
//!
//! let base_to_arm = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));
//! let arm_to_tool = Transform::from_translation(Vector3::new(0.5, 0.0, 0.0));
//!
//! let base_to_tool = base_to_arm.apply(arm_to_tool);
//! assert!((base_to_tool.translation.x - 1.5).abs() < 1e-12);
//!
//! let round_trip = base_to_tool.apply(base_to_tool.inverse());
//! assert!(round_trip.translation.norm() < 1e-12);
//! ```

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::warn;

/// Quaternions read from raw input with a norm at or below this value cannot
/// be normalised and resolve to the identity rotation.
pub const MIN_QUATERNION_NORM: f64 = 1e-12;

// ────────────────────────────────────────────────────────────────────────────
// Transform
// ────────────────────────────────────────────────────────────────────────────

/// A rigid 3-D pose: translation plus unit-norm rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create a transform from a translation and rotation.
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// A pure translation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(translation, UnitQuaternion::identity())
    }

    /// A pure rotation.
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self::new(Vector3::zeros(), rotation)
    }

    /// Build a transform from raw components.  The quaternion is normalised.
    pub fn from_components(x: f64, y: f64, z: f64, qw: f64, qx: f64, qy: f64, qz: f64) -> Self {
        Self::new(Vector3::new(x, y, z), normalize_quaternion(qw, qx, qy, qz))
    }

    /// Compose `self` with `other`: `other`'s displacement first, then
    /// `self`'s.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn apply(self, other: Self) -> Self {
        Self::new(
            self.translation + self.rotation * other.translation,
            self.rotation * other.rotation,
        )
    }

    /// The transform that exactly undoes this one.
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.inverse();
        Self::new(-(rotation * self.translation), rotation)
    }

    /// Map a point expressed in the child frame into the parent frame.
    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }

    /// Rotate a direction vector (translation is ignored).
    pub fn rotate_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Roll-pitch-yaw (radians) to quaternion.
    ///
    /// Every Euler-angle entry point in the crate goes through this single
    /// conversion.  Roll about X is applied first, then pitch about Y, then
    /// yaw about Z, all about fixed axes.
    pub fn to_quaternion(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(roll, pitch, yaw)
    }
}

/// Normalise raw quaternion components (w, x, y, z) into a unit quaternion.
///
/// Components whose norm is at or below [`MIN_QUATERNION_NORM`] fall back to
/// the identity rotation.
pub fn normalize_quaternion(qw: f64, qx: f64, qy: f64, qz: f64) -> UnitQuaternion<f64> {
    match UnitQuaternion::try_new(Quaternion::new(qw, qx, qy, qz), MIN_QUATERNION_NORM) {
        Some(rotation) => rotation,
        None => {
            warn!(qw, qx, qy, qz, "degenerate quaternion, using identity rotation");
            UnitQuaternion::identity()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    const EPS: f64 = 1e-9;

    fn assert_vec(v: Vector3<f64>, x: f64, y: f64, z: f64) {
        assert!((v.x - x).abs() < EPS, "x={} expected {x}", v.x);
        assert!((v.y - y).abs() < EPS, "y={} expected {y}", v.y);
        assert!((v.z - z).abs() < EPS, "z={} expected {z}", v.z);
    }

    fn is_identity(t: &Transform) -> bool {
        t.translation.norm() < EPS && t.rotation.angle() < 1e-6
    }

    // ── Composition ─────────────────────────────────────────────────────────

    #[test]
    fn identity_apply_is_noop() {
        let t = Transform::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let composed = Transform::identity().apply(t);
        assert_vec(composed.translation, 1.0, 2.0, 3.0);
    }

    #[test]
    fn apply_translations_add() {
        let t1 = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let t2 = Transform::from_translation(Vector3::new(2.0, 0.0, 0.0));
        assert_vec(t1.apply(t2).translation, 3.0, 0.0, 0.0);
    }

    #[test]
    fn apply_performs_other_first() {
        // Rotate 90° about Z, then offset 1 m along the rotated X axis.
        let yaw = Transform::from_rotation(Transform::to_quaternion(0.0, 0.0, FRAC_PI_2));
        let forward = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));

        assert_vec(yaw.apply(forward).translation, 0.0, 1.0, 0.0);
        assert_vec(forward.apply(yaw).translation, 1.0, 0.0, 0.0);
    }

    #[test]
    fn apply_is_associative() {
        let a = Transform::from_components(1.0, 0.0, 0.5, 0.9, 0.1, 0.2, 0.3);
        let b = Transform::from_components(-0.2, 2.0, 0.0, 0.5, -0.5, 0.5, 0.5);
        let c = Transform::from_components(0.0, 0.3, -1.0, 1.0, 0.0, 0.0, 0.4);

        let left = a.apply(b).apply(c);
        let right = a.apply(b.apply(c));
        assert!((left.translation - right.translation).norm() < EPS);
        assert!(left.rotation.angle_to(&right.rotation) < 1e-6);
    }

    // ── Inversion ───────────────────────────────────────────────────────────

    #[test]
    fn apply_inverse_is_identity() {
        let t = Transform::from_components(0.3, -1.2, 4.0, 0.7, 0.1, -0.4, 0.2);
        assert!(is_identity(&t.apply(t.inverse())));
        assert!(is_identity(&t.inverse().apply(t)));
    }

    #[test]
    fn inverse_of_pure_translation_negates() {
        let t = Transform::from_translation(Vector3::new(1.0, -2.0, 3.0));
        assert_vec(t.inverse().translation, -1.0, 2.0, -3.0);
    }

    #[test]
    fn inverse_undoes_point_mapping() {
        let t = Transform::from_components(1.0, 2.0, 3.0, FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let p = Vector3::new(0.4, -0.7, 2.5);
        let back = t.inverse().transform_point(&t.transform_point(&p));
        assert_vec(back, p.x, p.y, p.z);
    }

    // ── Rotation ────────────────────────────────────────────────────────────

    #[test]
    fn yaw_quarter_turn_rotates_x_to_y() {
        let t = Transform::from_components(0.0, 0.0, 0.0, FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        assert_vec(t.rotate_vector(&Vector3::x()), 0.0, 1.0, 0.0);
    }

    #[test]
    fn to_quaternion_matches_known_yaw() {
        let q = Transform::to_quaternion(0.0, 0.0, FRAC_PI_2);
        assert!((q.w - FRAC_1_SQRT_2).abs() < EPS);
        assert!(q.i.abs() < EPS);
        assert!(q.j.abs() < EPS);
        assert!((q.k - FRAC_1_SQRT_2).abs() < EPS);
    }

    #[test]
    fn to_quaternion_is_deterministic() {
        let a = Transform::to_quaternion(0.1, -0.2, 0.3);
        let b = Transform::to_quaternion(0.1, -0.2, 0.3);
        assert_eq!(a, b);
    }

    #[test]
    fn from_components_normalises_rotation() {
        let t = Transform::from_components(0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0);
        assert!((t.rotation.quaternion().norm() - 1.0).abs() < EPS);
        assert!((t.rotation.w - FRAC_1_SQRT_2).abs() < EPS);
    }

    #[test]
    fn degenerate_quaternion_falls_back_to_identity() {
        let q = normalize_quaternion(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q, UnitQuaternion::identity());
    }
}
