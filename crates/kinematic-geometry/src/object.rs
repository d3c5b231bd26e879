//! Frames: links and joints.
//!
//! Frames are built as free-standing drafts ([`Link`], [`Joint`]) and handed
//! to a [`Design`][crate::design::Design], which takes ownership and returns a
//! [`FrameId`].  A committed frame is sealed: there is no route back to a
//! mutable draft, so properties such as a joint's axis are fixed from the
//! moment the frame joins the design.
//!
//! A [`Joint`] is both a frame and an attachment.  As a frame it is a node of
//! the graph; as an attachment ([`Attachment::Joint`][crate::attachment::Attachment::Joint])
//! it drives the transform from the joint frame to whatever child is attached
//! through it.

use std::fmt;

use kinematic_types::KinematicsError;
use nalgebra::{DVector, Unit, UnitQuaternion, Vector3};

use crate::transform::Transform;

// ────────────────────────────────────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────────────────────────────────────

/// Stable handle to a frame committed to a design.
///
/// Handles compare by identity: two frames with the same name added to two
/// different designs (or twice to one design) have distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId {
    pub(crate) design: u64,
    pub(crate) index: usize,
}

impl FrameId {
    /// Position of the frame's instruction in its design.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// What kind of node a frame is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Link,
    Joint,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Link => write!(f, "link"),
            FrameKind::Joint => write!(f, "joint"),
        }
    }
}

/// Motion a joint's state variable drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointType {
    /// Rotation of `state` radians about the axis.
    Revolute,
    /// Translation of `state` metres along the axis.
    Prismatic,
}

// ────────────────────────────────────────────────────────────────────────────
// Link
// ────────────────────────────────────────────────────────────────────────────

/// A rigid body frame with no motion of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    name: String,
}

impl Link {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Joint
// ────────────────────────────────────────────────────────────────────────────

/// A single-degree-of-freedom joint driven by one state variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    joint_type: JointType,
    state_index: usize,
    axis: Unit<Vector3<f64>>,
}

impl Joint {
    /// Create a joint reading its coordinate from `state_index`.  The axis
    /// defaults to +Z.
    pub fn new(name: impl Into<String>, joint_type: JointType, state_index: usize) -> Self {
        Self {
            name: name.into(),
            joint_type,
            state_index,
            axis: Vector3::z_axis(),
        }
    }

    /// Set the joint axis.  The axis is normalised.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::InvalidAxis`] for a zero-length axis; the
    /// previous axis is kept.
    pub fn set_axis_definition(&mut self, x: f64, y: f64, z: f64) -> Result<(), KinematicsError> {
        self.axis = Unit::try_new(Vector3::new(x, y, z), f64::EPSILON).ok_or_else(|| {
            KinematicsError::InvalidAxis {
                frame: self.name.clone(),
            }
        })?;
        Ok(())
    }

    /// Builder form of [`set_axis_definition`][Self::set_axis_definition].
    pub fn with_axis(mut self, x: f64, y: f64, z: f64) -> Result<Self, KinematicsError> {
        self.set_axis_definition(x, y, z)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    pub fn state_index(&self) -> usize {
        self.state_index
    }

    /// The unit axis of motion.
    pub fn axis_definition(&self) -> Vector3<f64> {
        self.axis.into_inner()
    }

    /// Transform from the joint frame to its child at the given state.
    ///
    /// A revolute joint yields a pure rotation, a prismatic joint a pure
    /// translation; the two are never combined.
    ///
    /// # Panics
    ///
    /// Panics if `state_index` is out of range for `state_vector`.
    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        let value = state_vector[self.state_index];
        match self.joint_type {
            JointType::Revolute => {
                Transform::from_rotation(UnitQuaternion::from_axis_angle(&self.axis, value))
            }
            JointType::Prismatic => Transform::from_translation(self.axis.into_inner() * value),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Frame
// ────────────────────────────────────────────────────────────────────────────

/// A named node of the kinematic graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Link(Link),
    Joint(Joint),
}

impl Frame {
    pub fn name(&self) -> &str {
        match self {
            Frame::Link(link) => link.name(),
            Frame::Joint(joint) => joint.name(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Link(_) => FrameKind::Link,
            Frame::Joint(_) => FrameKind::Joint,
        }
    }

    /// The joint view of this frame, if it is one.
    pub fn as_joint(&self) -> Option<&Joint> {
        match self {
            Frame::Joint(joint) => Some(joint),
            Frame::Link(_) => None,
        }
    }
}

impl From<Link> for Frame {
    fn from(link: Link) -> Self {
        Frame::Link(link)
    }
}

impl From<Joint> for Frame {
    fn from(joint: Joint) -> Self {
        Frame::Joint(joint)
    }
}
