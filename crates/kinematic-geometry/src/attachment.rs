//! Attachments: parent→child transforms as a function of the state vector.
//!
//! Each variant is named after which of {translation, rotation} is fixed at
//! construction and which is read from the state vector on every call:
//!
//! | Variant | Translation | Rotation |
//! |---------|-------------|----------|
//! | [`Ftfr`] | fixed | fixed |
//! | [`Ftdr`] | fixed | state `qw, qx, qy, qz` |
//! | [`Dtfr`] | state `x, y, z` | fixed |
//! | [`Dtdr`] | state `x, y, z` | state `qw, qx, qy, qz` |
//! | [`JointAttachment`] | one state value along the axis (prismatic) | or about it (revolute) |
//!
//! State indices are not validated here.  An index outside the state vector
//! is a programming error and panics inside `DVector`'s bounds check.
//!
//! # Example
//!
//! ```rust
//! use kinematic_geometry::attachment::{Attachment, Dtfr};
//! use nalgebra::DVector;
//!
//! let slider: Attachment = Dtfr::new([0, 1, 2], 1.0, 0.0, 0.0, 0.0).into();
//! let state = DVector::from_vec(vec![0.5, -0.25, 2.0]);
//! let t = slider.get_transform(&state);
//! assert!((t.translation.z - 2.0).abs() < 1e-12);
//! ```

use nalgebra::{DVector, UnitQuaternion, Vector3};

use crate::object::{FrameId, Joint};
use crate::transform::{Transform, normalize_quaternion};

/// Whether an attachment depends on the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Fixed,
    Dynamic,
}

fn read_translation(state_vector: &DVector<f64>, [x, y, z]: [usize; 3]) -> Vector3<f64> {
    Vector3::new(state_vector[x], state_vector[y], state_vector[z])
}

fn read_rotation(state_vector: &DVector<f64>, [qw, qx, qy, qz]: [usize; 4]) -> UnitQuaternion<f64> {
    normalize_quaternion(
        state_vector[qw],
        state_vector[qx],
        state_vector[qy],
        state_vector[qz],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// FTFR
// ────────────────────────────────────────────────────────────────────────────

/// Fixed translation, fixed rotation: a rigid, state-independent offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ftfr {
    transform: Transform,
}

impl Ftfr {
    /// Construct from a translation and quaternion components (normalised).
    pub fn new(x: f64, y: f64, z: f64, qw: f64, qx: f64, qy: f64, qz: f64) -> Self {
        Self {
            transform: Transform::from_components(x, y, z, qw, qx, qy, qz),
        }
    }

    /// Construct from a translation and roll-pitch-yaw angles (radians).
    pub fn from_euler(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        let q = Transform::to_quaternion(roll, pitch, yaw);
        Self::new(x, y, z, q.w, q.i, q.j, q.k)
    }

    /// A pure offset with no rotation.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 1.0, 0.0, 0.0, 0.0)
    }

    pub fn get_transform(&self, _state_vector: &DVector<f64>) -> Transform {
        self.transform
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FTDR
// ────────────────────────────────────────────────────────────────────────────

/// Fixed translation, rotation read from four state indices `[qw, qx, qy, qz]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ftdr {
    translation: Vector3<f64>,
    rotation_indices: [usize; 4],
}

impl Ftdr {
    pub fn new(x: f64, y: f64, z: f64, rotation_indices: [usize; 4]) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            rotation_indices,
        }
    }

    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        Transform::new(
            self.translation,
            read_rotation(state_vector, self.rotation_indices),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DTFR
// ────────────────────────────────────────────────────────────────────────────

/// Translation read from three state indices `[x, y, z]`, fixed rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dtfr {
    translation_indices: [usize; 3],
    rotation: UnitQuaternion<f64>,
}

impl Dtfr {
    /// Construct from translation indices and quaternion components
    /// (normalised).
    pub fn new(translation_indices: [usize; 3], qw: f64, qx: f64, qy: f64, qz: f64) -> Self {
        Self {
            translation_indices,
            rotation: normalize_quaternion(qw, qx, qy, qz),
        }
    }

    /// Construct from translation indices and roll-pitch-yaw angles (radians).
    pub fn from_euler(translation_indices: [usize; 3], roll: f64, pitch: f64, yaw: f64) -> Self {
        let q = Transform::to_quaternion(roll, pitch, yaw);
        Self::new(translation_indices, q.w, q.i, q.j, q.k)
    }

    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        Transform::new(
            read_translation(state_vector, self.translation_indices),
            self.rotation,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DTDR
// ────────────────────────────────────────────────────────────────────────────

/// Translation and rotation both read from the state vector (seven indices).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dtdr {
    translation_indices: [usize; 3],
    rotation_indices: [usize; 4],
}

impl Dtdr {
    pub fn new(translation_indices: [usize; 3], rotation_indices: [usize; 4]) -> Self {
        Self {
            translation_indices,
            rotation_indices,
        }
    }

    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        Transform::new(
            read_translation(state_vector, self.translation_indices),
            read_rotation(state_vector, self.rotation_indices),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Joint attachment
// ────────────────────────────────────────────────────────────────────────────

/// A committed joint seen as the attachment to the frames hung below it.
///
/// Only [`Design::joint_attachment`][crate::design::Design::joint_attachment]
/// creates one, from the sealed joint it owns, and the design only accepts it
/// under that same joint as parent.
#[derive(Debug, Clone, PartialEq)]
pub struct JointAttachment {
    pub(crate) frame: FrameId,
    pub(crate) joint: Joint,
}

impl JointAttachment {
    /// Handle of the joint frame this attachment belongs to.
    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub fn joint(&self) -> &Joint {
        &self.joint
    }

    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        self.joint.get_transform(state_vector)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Attachment
// ────────────────────────────────────────────────────────────────────────────

/// The parent→child link of a design instruction or graph edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Ftfr(Ftfr),
    Ftdr(Ftdr),
    Dtfr(Dtfr),
    Dtdr(Dtdr),
    /// A committed joint acting as the attachment to its child.
    Joint(JointAttachment),
}

impl Attachment {
    /// Parent→child transform at the given configuration.
    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        match self {
            Attachment::Ftfr(a) => a.get_transform(state_vector),
            Attachment::Ftdr(a) => a.get_transform(state_vector),
            Attachment::Dtfr(a) => a.get_transform(state_vector),
            Attachment::Dtdr(a) => a.get_transform(state_vector),
            Attachment::Joint(joint) => joint.get_transform(state_vector),
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        match self {
            Attachment::Ftfr(_) => AttachmentKind::Fixed,
            _ => AttachmentKind::Dynamic,
        }
    }
}

impl From<Ftfr> for Attachment {
    fn from(a: Ftfr) -> Self {
        Attachment::Ftfr(a)
    }
}

impl From<Ftdr> for Attachment {
    fn from(a: Ftdr) -> Self {
        Attachment::Ftdr(a)
    }
}

impl From<Dtfr> for Attachment {
    fn from(a: Dtfr) -> Self {
        Attachment::Dtfr(a)
    }
}

impl From<Dtdr> for Attachment {
    fn from(a: Dtdr) -> Self {
        Attachment::Dtdr(a)
    }
}
