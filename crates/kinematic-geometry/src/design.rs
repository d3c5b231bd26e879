//! [`Design`] – validated, append-only build plan for a frame graph.
//!
//! A geometry plugin describes a mechanism by adding frames to a design,
//! parents before children.  Each call is checked in order:
//!
//! 1. the frame has a name,
//! 2. a given parent was previously added to *this* design (by handle, not by
//!    name),
//! 3. parent and attachment are either both present or both absent,
//! 4. a joint attachment hangs below the very joint it was taken from.
//!
//! The first violation is returned as [`KinematicsError::Design`] and nothing
//! is recorded; the design stays usable for further calls.  On success the
//! frame is moved into the design, which seals it, and a [`FrameId`] is
//! returned for use as a later parent.
//!
//! # Example
//!
//! ```rust
//! use kinematic_geometry::attachment::Ftfr;
//! use kinematic_geometry::design::Design;
//! use kinematic_geometry::object::{Joint, JointType, Link};
//!
//! let mut design = Design::new();
//! let base = design.add_root(Link::new("base")).unwrap();
//! let elbow = design
//!     .add_child(Joint::new("elbow", JointType::Revolute, 0), base, Ftfr::translation(0.0, 0.0, 0.3))
//!     .unwrap();
//! let through_elbow = design.joint_attachment(elbow).unwrap();
//! design.add_child(Link::new("forearm"), elbow, through_elbow).unwrap();
//!
//! assert_eq!(design.instructions().len(), 3);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use kinematic_types::{DesignViolation, KinematicsError};
use tracing::debug;

use crate::attachment::{Attachment, JointAttachment};
use crate::object::{Frame, FrameId};

static NEXT_DESIGN_ID: AtomicU64 = AtomicU64::new(1);

/// One recorded `(frame, parent, attachment)` step of a design.
#[derive(Debug, Clone)]
pub struct Instruction {
    id: FrameId,
    frame: Frame,
    parent: Option<FrameId>,
    attachment: Option<Attachment>,
}

impl Instruction {
    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// `None` for a root frame.
    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    /// `None` for a root frame.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

/// Ordered list of frame instructions.  Insertion order is a valid
/// topological order: every parent precedes its children.
#[derive(Debug)]
pub struct Design {
    id: u64,
    instructions: Vec<Instruction>,
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl Design {
    /// Create an empty design.
    pub fn new() -> Self {
        Self {
            id: NEXT_DESIGN_ID.fetch_add(1, Ordering::Relaxed),
            instructions: Vec::new(),
        }
    }

    /// Validate and record one instruction.
    ///
    /// # Errors
    ///
    /// [`KinematicsError::Design`] carrying the frame's name and the first
    /// [`DesignViolation`] found.
    pub fn add_object(
        &mut self,
        frame: impl Into<Frame>,
        parent: Option<FrameId>,
        attachment: Option<Attachment>,
    ) -> Result<FrameId, KinematicsError> {
        let frame = frame.into();
        let reject = |frame: &Frame, reason| KinematicsError::Design {
            frame: frame.name().to_string(),
            reason,
        };

        if frame.name().is_empty() {
            return Err(reject(&frame, DesignViolation::EmptyName));
        }
        if let Some(parent) = parent
            && !self.owns(parent)
        {
            return Err(reject(&frame, DesignViolation::ParentNotFound));
        }
        match (parent.is_some(), attachment.is_some()) {
            (true, false) => return Err(reject(&frame, DesignViolation::ParentWithoutAttachment)),
            (false, true) => return Err(reject(&frame, DesignViolation::AttachmentWithoutParent)),
            _ => {}
        }
        if let (Some(parent), Some(Attachment::Joint(through))) = (parent, attachment.as_ref())
            && through.frame_id() != parent
        {
            return Err(reject(&frame, DesignViolation::ForeignJointAttachment));
        }

        let id = FrameId {
            design: self.id,
            index: self.instructions.len(),
        };
        debug!(
            frame = frame.name(),
            kind = %frame.kind(),
            root = parent.is_none(),
            "design instruction added"
        );
        self.instructions.push(Instruction {
            id,
            frame,
            parent,
            attachment,
        });
        Ok(id)
    }

    /// Add a root frame (no parent, no attachment).
    pub fn add_root(&mut self, frame: impl Into<Frame>) -> Result<FrameId, KinematicsError> {
        self.add_object(frame, None, None)
    }

    /// Add a frame attached to `parent` through `attachment`.
    pub fn add_child(
        &mut self,
        frame: impl Into<Frame>,
        parent: FrameId,
        attachment: impl Into<Attachment>,
    ) -> Result<FrameId, KinematicsError> {
        self.add_object(frame, Some(parent), Some(attachment.into()))
    }

    /// All recorded instructions in insertion order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The committed frame behind `id`, if `id` belongs to this design.
    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        if self.owns(id) {
            Some(&self.instructions[id.index].frame)
        } else {
            None
        }
    }

    /// The attachment view of a committed joint, used to attach its child.
    ///
    /// This is the only way to obtain an [`Attachment::Joint`], so the
    /// transform it drives always matches the sealed joint in this design.
    ///
    /// # Errors
    ///
    /// - [`KinematicsError::UnknownFrame`] – `id` is not from this design.
    /// - [`KinematicsError::NotAJoint`] – `id` refers to a link.
    pub fn joint_attachment(&self, id: FrameId) -> Result<Attachment, KinematicsError> {
        let frame = self.frame(id).ok_or(KinematicsError::UnknownFrame)?;
        frame
            .as_joint()
            .map(|joint| {
                Attachment::Joint(JointAttachment {
                    frame: id,
                    joint: joint.clone(),
                })
            })
            .ok_or_else(|| KinematicsError::NotAJoint {
                frame: frame.name().to_string(),
            })
    }

    /// Reject an axis edit on a committed frame.
    ///
    /// This never succeeds and never reads the axis components.  It exists
    /// only to report [`KinematicsError::EditLocked`] when a caller tries to
    /// change a joint after handing it to the design.  Set the axis on the
    /// [`Joint`][crate::object::Joint] draft before adding it.
    ///
    /// # Errors
    ///
    /// - [`KinematicsError::EditLocked`] – `id` is a committed joint.
    /// - [`KinematicsError::NotAJoint`] – `id` refers to a link.
    /// - [`KinematicsError::UnknownFrame`] – `id` is not from this design.
    pub fn set_axis_definition(
        &mut self,
        id: FrameId,
        _x: f64,
        _y: f64,
        _z: f64,
    ) -> Result<(), KinematicsError> {
        let frame = self.frame(id).ok_or(KinematicsError::UnknownFrame)?;
        let name = frame.name().to_string();
        match frame.as_joint() {
            Some(_) => Err(KinematicsError::EditLocked { frame: name }),
            None => Err(KinematicsError::NotAJoint { frame: name }),
        }
    }

    fn owns(&self, id: FrameId) -> bool {
        id.design == self.id && id.index < self.instructions.len()
    }
}
