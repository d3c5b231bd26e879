//! `kinematic-geometry` – frames, attachments, and the frame graph.
//!
//! Describes the kinematic structure of a mechanism as a forest of named
//! reference frames joined by parameterised attachments, and turns a state
//! vector into rigid transforms between any two connected frames.
//!
//! # Modules
//!
//! - [`transform`] – [`Transform`][transform::Transform]: translation +
//!   unit-quaternion pose with composition and inversion.
//! - [`attachment`] – [`Attachment`][attachment::Attachment]: the four
//!   fixed/dynamic translation-rotation variants plus joints, each mapping a
//!   state vector to a parent→child transform.
//! - [`object`] – [`Link`][object::Link], [`Joint`][object::Joint] and
//!   [`Frame`][object::Frame]: graph nodes, sealed once committed.
//! - [`design`] – [`Design`][design::Design]: validated, append-only list of
//!   `(frame, parent, attachment)` instructions.
//! - [`graph`] – [`Graph`][graph::Graph]: the immutable forest built from a
//!   design, with a BFS path solver and per-pair path cache.

pub mod attachment;
pub mod design;
pub mod graph;
pub mod object;
pub mod transform;

pub use attachment::{Attachment, AttachmentKind, Dtdr, Dtfr, Ftdr, Ftfr, JointAttachment};
pub use design::{Design, Instruction};
pub use graph::{Direction, Graph, Path, Step};
pub use object::{Frame, FrameId, FrameKind, Joint, JointType, Link};
pub use transform::Transform;
