//! `kinematic-types` – shared error taxonomy for the kinematic model stack.
//!
//! Every fallible operation in `kinematic-geometry` and `kinematic-model`
//! returns a [`KinematicsError`].  Failures raised by external collaborators
//! (the geometry plugin and the state estimator) travel across the seam as a
//! [`BoxError`] and are wrapped, never flattened, so the original cause stays
//! reachable through [`std::error::Error::source`].

use std::fmt;

use thiserror::Error;

/// Boxed error type used at the external-collaborator seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a design refused to record an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignViolation {
    /// The frame has no name and therefore no identity in the graph.
    EmptyName,
    /// The given parent has not been added to this design.
    ParentNotFound,
    /// A parent was given without an attachment.
    ParentWithoutAttachment,
    /// An attachment was given without a parent.
    AttachmentWithoutParent,
    /// A joint attachment was used under a parent other than its own joint.
    ForeignJointAttachment,
}

impl fmt::Display for DesignViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignViolation::EmptyName => write!(f, "frame name is empty"),
            DesignViolation::ParentNotFound => write!(f, "parent does not exist"),
            DesignViolation::ParentWithoutAttachment => {
                write!(f, "given parent with no attachment")
            }
            DesignViolation::AttachmentWithoutParent => {
                write!(f, "cannot use attachment without a parent")
            }
            DesignViolation::ForeignJointAttachment => {
                write!(f, "joint attachment does not belong to the given parent")
            }
        }
    }
}

/// Why a graph could not be built from a design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphBuildViolation {
    /// Two frames share the same name.
    DuplicateName(String),
    /// An instruction references a parent that was not inserted before it.
    OrphanedParent { frame: String },
}

impl fmt::Display for GraphBuildViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphBuildViolation::DuplicateName(name) => {
                write!(f, "duplicate frame name [{name}]")
            }
            GraphBuildViolation::OrphanedParent { frame } => {
                write!(f, "parent of frame [{frame}] was not inserted before it")
            }
        }
    }
}

/// Global error type for design validation, graph construction, frame
/// editing, and the model facade.
#[derive(Error, Debug)]
pub enum KinematicsError {
    #[error("failed to add object [{frame}] to model design ({reason})")]
    Design {
        frame: String,
        reason: DesignViolation,
    },

    #[error("failed to build graph ({0})")]
    GraphBuild(GraphBuildViolation),

    #[error("failed to edit frame [{frame}] (editing is locked)")]
    EditLocked { frame: String },

    #[error("invalid axis for joint [{frame}] (axis has zero length)")]
    InvalidAxis { frame: String },

    #[error("frame [{frame}] is not a joint")]
    NotAJoint { frame: String },

    #[error("frame handle does not belong to this design")]
    UnknownFrame,

    #[error("state vector has {actual} variables, model declares {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("failed to build geometry ({0})")]
    Initialization(#[source] BoxError),

    #[error("state estimation failed ({0})")]
    StateEstimation(#[source] BoxError),
}
