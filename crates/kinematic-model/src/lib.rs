//! `kinematic-model` – the kinematic model facade.
//!
//! Couples a state estimator to a frame graph and answers "what is the rigid
//! transform between frame A and frame B right now?" once per control cycle.
//!
//! # Modules
//!
//! - [`model`] – [`KinematicModel`][model::KinematicModel]: builds the graph
//!   through a [`GeometryPlugin`], delegates estimation to a
//!   [`StateEstimator`], and caches resolved transforms for one cycle.
//! - [`estimator`] – the [`StateEstimator`] and [`GeometryPlugin`] seams.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber with optional OTLP span export.
//!
//! Everything runs synchronously on the calling thread.  Neither the
//! transform cache nor the graph's path cache is locked; callers sharing a
//! model across threads serialise `iterate`/`get_transform` themselves.

pub mod estimator;
pub mod model;
pub mod telemetry;

pub use estimator::{GeometryPlugin, StateEstimator};
pub use model::{CacheStats, KinematicModel, ModelDimensions};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
