//! # Fitting Configuration
//!
//! Knobs for the EM iteration loop: the iteration budget, the log-likelihood
//! convergence tolerance and the responsibility mass below which a component
//! is treated as collapsed.

use crate::errors::{MixtureError, MixtureResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Default absolute log-likelihood change that counts as converged
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Configuration for [`ExpectationMaximization`](crate::em::ExpectationMaximization)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmConfig {
    /// Maximum number of E/M iterations; must be at least 1. This is also the
    /// only cancellation knob: the loop never runs longer than this.
    pub max_iterations: usize,
    /// Stop once `|LL[t] - LL[t-1]| < tolerance`
    pub tolerance: f64,
    /// A component whose summed responsibility is at or below this value is
    /// degenerate and aborts the fit
    pub min_component_mass: f64,
}

impl Default for EmConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            min_component_mass: f64::MIN_POSITIVE,
        }
    }
}

impl EmConfig {
    /// Configuration with the given budget and tolerance, other fields default.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            ..Self::default()
        }
    }

    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the degeneracy threshold
    pub fn with_min_component_mass(mut self, min_component_mass: f64) -> Self {
        self.min_component_mass = min_component_mass;
        self
    }

    /// Check that the configuration can drive a fit.
    pub fn validate(&self) -> MixtureResult<()> {
        if self.max_iterations < 1 {
            return Err(MixtureError::InvalidParameter {
                parameter: "max_iter".to_string(),
                value: self.max_iterations as f64,
                constraint: ">= 1".to_string(),
            });
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MixtureError::InvalidParameter {
                parameter: "tol".to_string(),
                value: self.tolerance,
                constraint: "a finite value >= 0".to_string(),
            });
        }

        if !self.min_component_mass.is_finite() || self.min_component_mass < 0.0 {
            return Err(MixtureError::InvalidParameter {
                parameter: "min_component_mass".to_string(),
                value: self.min_component_mass,
                constraint: "a finite value >= 0".to_string(),
            });
        }

        Ok(())
    }
}
