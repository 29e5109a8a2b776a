//! Error types and validation functions for mixture fitting.
//!
//! Every failure in this crate is raised at the point of detection and aborts the
//! whole operation. There is no partial-result recovery: a fit either returns a
//! complete [`FitResult`](crate::results::FitResult) or one of these errors.

use thiserror::Error;

/// Error types for mixture density evaluation and EM fitting.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MixtureError {
    /// Parameter sequences of unequal length.
    #[error("Dimension mismatch: {parameter} has {actual} entries, expected {expected}")]
    DimensionMismatch {
        /// Sequence whose length disagrees with `mu`
        parameter: String,
        /// Number of components implied by `mu`
        expected: usize,
        /// Actual length of the offending sequence
        actual: usize,
    },

    /// Invalid parameter value, such as a non-positive standard deviation.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name, including the component index where relevant
        parameter: String,
        /// Invalid value provided or computed
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// A component's responsibility mass collapsed during fitting.
    #[error(
        "Degenerate component: component {component} has responsibility mass {mass} at iteration {iteration}"
    )]
    DegenerateComponent {
        /// Zero-based component index
        component: usize,
        /// EM iteration whose M-step hit the collapse
        iteration: usize,
        /// Summed responsibility of the component
        mass: f64,
    },

    /// Fitting against zero observations.
    #[error("Empty sample: at least one observation is required")]
    EmptySample,

    /// Observation that is NaN or infinite.
    #[error("Non-finite observation at index {index}: {value}")]
    NonFiniteObservation {
        /// Position of the observation in the sample
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Numerical computation failure not covered by a more specific variant.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
    },
}

/// Result type for mixture operations.
pub type MixtureResult<T> = Result<T, MixtureError>;

/// Validates that a sample is non-empty and contains only finite values.
///
/// # Example
/// ```rust
/// use gaussian_mixture_em::errors::{validate_sample, MixtureError};
///
/// assert!(validate_sample(&[1.0, 2.0]).is_ok());
/// assert_eq!(validate_sample(&[]), Err(MixtureError::EmptySample));
/// ```
pub fn validate_sample(data: &[f64]) -> MixtureResult<()> {
    if data.is_empty() {
        return Err(MixtureError::EmptySample);
    }

    validate_all_finite(data)
}

/// Validates that every value is finite, reporting the first offending index.
///
/// An empty slice is accepted.
pub fn validate_all_finite(data: &[f64]) -> MixtureResult<()> {
    match data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(MixtureError::NonFiniteObservation { index, value }),
        None => Ok(()),
    }
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> MixtureResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MixtureError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "a finite value".to_string(),
        })
    }
}

/// Validates that a value is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> MixtureResult<()> {
    // NaN fails the comparison and lands here too
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MixtureError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "> 0".to_string(),
        })
    }
}
