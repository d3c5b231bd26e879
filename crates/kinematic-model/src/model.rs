//! [`KinematicModel`] – state estimation plus frame-to-frame transforms.
//!
//! The model owns a [`Graph`] built from a [`GeometryPlugin`] and delegates
//! estimation to a [`StateEstimator`].  Each control cycle looks like:
//!
//! 1. [`KinematicModel::iterate`] advances the estimator and clears the
//!    transform cache, whether or not the estimator succeeded.
//! 2. [`KinematicModel::get_transform`] answers queries against the current
//!    state vector.  The first query for a pair resolves the graph path and
//!    caches both the result and its inverse under the reversed pair, so
//!    repeated queries in either direction are lookups until the next
//!    `iterate`.
//!
//! A missing transform (unknown frame, disconnected trees, model not yet
//! initialised) is `None`, not an error.
//!
//! # Example
//!
//! ```rust
//! use kinematic_geometry::{Design, Ftfr, Link};
//! use kinematic_model::{KinematicModel, ModelDimensions, StateEstimator};
//! use kinematic_types::BoxError;
//! use nalgebra::DVector;
//!
//! struct Frozen(DVector<f64>);
//!
//! impl StateEstimator for Frozen {
//!     fn iterate(&mut self) -> Result<(), BoxError> { Ok(()) }
//!     fn state_vector(&self) -> &DVector<f64> { &self.0 }
//! }
//!
//! let geometry = |design: &mut Design| -> Result<(), BoxError> {
//!     let base = design.add_root(Link::new("base"))?;
//!     design.add_child(Link::new("camera"), base, Ftfr::translation(0.0, 0.0, 1.2))?;
//!     Ok(())
//! };
//!
//! let dimensions = ModelDimensions { n_state_variables: 1, n_sensors: 0 };
//! let mut model = KinematicModel::new(dimensions, Frozen(DVector::zeros(1)), geometry);
//! model.initialize().unwrap();
//!
//! let t = model.get_transform("base", "camera").unwrap();
//! assert!((t.translation.z - 1.2).abs() < 1e-12);
//! ```

use std::collections::HashMap;

use kinematic_geometry::{Design, Graph, Transform};
use kinematic_types::KinematicsError;
use nalgebra::DVector;
use tracing::{debug, info, instrument, warn};

use crate::estimator::{GeometryPlugin, StateEstimator};

/// Size of the estimation problem declared by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDimensions {
    /// Number of variables in the state vector.
    pub n_state_variables: usize,
    /// Number of sensors providing observations to the estimator.
    pub n_sensors: usize,
}

/// Transform cache counters since the model was constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Facade over the frame graph and the external state estimator.
pub struct KinematicModel<E, G> {
    dimensions: ModelDimensions,
    estimator: E,
    geometry: G,
    graph: Option<Graph>,
    /// `transform_cache[source][target]`, valid for one cycle.
    transform_cache: HashMap<String, HashMap<String, Transform>>,
    stats: CacheStats,
}

impl<E: StateEstimator, G: GeometryPlugin> KinematicModel<E, G> {
    /// Create an uninitialised model.  Call [`initialize`][Self::initialize]
    /// before querying transforms.
    pub fn new(dimensions: ModelDimensions, estimator: E, geometry: G) -> Self {
        Self {
            dimensions,
            estimator,
            geometry,
            graph: None,
            transform_cache: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Build the frame graph from the geometry plugin.
    ///
    /// Any previously built graph is discarded first, so a failed call leaves
    /// the model uninitialised rather than half-built.
    ///
    /// # Errors
    ///
    /// - [`KinematicsError::DimensionMismatch`] – the estimator's state vector
    ///   does not have `n_state_variables` entries.
    /// - [`KinematicsError::Initialization`] – the plugin failed; wraps its
    ///   error.
    /// - [`KinematicsError::GraphBuild`] – the design could not be turned into
    ///   a graph.
    #[instrument(skip(self), fields(n_state_variables = self.dimensions.n_state_variables))]
    pub fn initialize(&mut self) -> Result<(), KinematicsError> {
        self.graph = None;
        self.transform_cache.clear();

        let actual = self.estimator.state_vector().len();
        if actual != self.dimensions.n_state_variables {
            return Err(KinematicsError::DimensionMismatch {
                expected: self.dimensions.n_state_variables,
                actual,
            });
        }

        let mut design = Design::new();
        self.geometry
            .build_geometry(&mut design)
            .map_err(KinematicsError::Initialization)?;

        let graph = Graph::build(&design)?;
        info!(
            frames = graph.len(),
            n_sensors = self.dimensions.n_sensors,
            "kinematic model initialised"
        );
        self.graph = Some(graph);
        Ok(())
    }

    /// Run one estimation step and invalidate the transform cache.
    ///
    /// The cache is cleared even when the estimator fails, since a failed
    /// step may still have touched the estimator's state.
    ///
    /// # Errors
    ///
    /// [`KinematicsError::StateEstimation`] wrapping the estimator's error.
    #[instrument(skip(self))]
    pub fn iterate(&mut self) -> Result<(), KinematicsError> {
        let result = self.estimator.iterate();
        self.transform_cache.clear();
        result.map_err(|e| {
            warn!(error = %e, "state estimation step failed");
            KinematicsError::StateEstimation(e)
        })
    }

    /// Transform from `source` to `target` at the current state estimate:
    /// the pose of `target` expressed in `source`.
    ///
    /// Returns `None` when no path joins the two frames.
    pub fn get_transform(&mut self, source: &str, target: &str) -> Option<Transform> {
        if let Some(transform) = self
            .transform_cache
            .get(source)
            .and_then(|targets| targets.get(target))
        {
            self.stats.hits += 1;
            return Some(*transform);
        }
        self.stats.misses += 1;

        let Some(graph) = self.graph.as_mut() else {
            debug!(source, target, "transform requested before initialisation");
            return None;
        };
        let path = graph.solve_path(source, target)?;
        let transform = path.resolve(self.estimator.state_vector());
        debug!(source, target, steps = path.len(), "transform resolved");

        self.transform_cache
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string(), transform);
        self.transform_cache
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string(), transform.inverse());
        Some(transform)
    }

    /// Transform from `source` to `target` at a caller-supplied state vector.
    ///
    /// Bypasses the transform cache; solved paths are still cached by the
    /// graph.
    ///
    /// # Panics
    ///
    /// Panics if an attachment on the path reads an index outside
    /// `state_vector`.
    pub fn get_transform_at(
        &mut self,
        source: &str,
        target: &str,
        state_vector: &DVector<f64>,
    ) -> Option<Transform> {
        let path = self.graph.as_mut()?.solve_path(source, target)?;
        Some(path.resolve(state_vector))
    }

    pub fn is_initialized(&self) -> bool {
        self.graph.is_some()
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    pub fn dimensions(&self) -> ModelDimensions {
        self.dimensions
    }

    pub fn state_vector(&self) -> &DVector<f64> {
        self.estimator.state_vector()
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of ordered frame pairs currently cached.
    pub fn cached_transforms(&self) -> usize {
        self.transform_cache.values().map(HashMap::len).sum()
    }
}
