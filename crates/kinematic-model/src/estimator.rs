//! Seams to the model's external collaborators.
//!
//! - [`StateEstimator`] – the recursive estimator that owns and refines the
//!   state vector.  The model only calls [`StateEstimator::iterate`] and
//!   reads [`StateEstimator::state_vector`]; it never writes to the state.
//! - [`GeometryPlugin`] – describes a particular mechanism by adding frames
//!   to a [`Design`].  Invoked exactly once per
//!   [`KinematicModel::initialize`][crate::model::KinematicModel::initialize].
//!
//! Both report failures as [`BoxError`] so that any estimator or plugin error
//! type can cross the seam; the model wraps them in
//! [`KinematicsError`][kinematic_types::KinematicsError] with the cause kept.

use kinematic_geometry::Design;
use kinematic_types::BoxError;
use nalgebra::DVector;

/// A state estimator advancing one step per control cycle.
pub trait StateEstimator {
    /// Run one estimation step.
    fn iterate(&mut self) -> Result<(), BoxError>;

    /// The current state estimate.  Its length is fixed for the estimator's
    /// lifetime.
    fn state_vector(&self) -> &DVector<f64>;
}

/// Builds the frame design of a specific mechanism.
pub trait GeometryPlugin {
    /// Add every frame of the mechanism to `design`, parents before children.
    fn build_geometry(&self, design: &mut Design) -> Result<(), BoxError>;
}

impl<F> GeometryPlugin for F
where
    F: Fn(&mut Design) -> Result<(), BoxError>,
{
    fn build_geometry(&self, design: &mut Design) -> Result<(), BoxError> {
        self(design)
    }
}
