//! Log-likelihood of a sample under a Gaussian mixture.

use crate::{density::log_mixture_density, errors::MixtureResult, parameters::MixtureParameters};

/// Sum over all points of the natural log of the mixture density.
///
/// Each term is computed with log-sum-exp over the weighted component
/// log-densities, so a point whose linear mixture density underflows to zero
/// still contributes its exact (very negative) log value. The result can only
/// be negative infinity when a standardized distance `(x - mu) / sigma`
/// overflows on squaring for every component at some point, e.g. `x = 1e200`
/// against unit-scale components. Callers should check `is_finite()` on the
/// result; [`fit`](crate::em::fit) reports this case as `NumericalError`. An
/// empty sample yields `0.0`.
///
/// # Errors
/// Same validation failures as
/// [`evaluate_mixture_density`](crate::density::evaluate_mixture_density).
///
/// # Example
/// ```rust
/// use gaussian_mixture_em::{log_likelihood, MixtureParameters};
///
/// let params = MixtureParameters::new(vec![0.0], vec![1.0], vec![1.0]).unwrap();
/// let ll = log_likelihood(&[0.0], &params).unwrap();
/// assert!((ll + 0.5 * (2.0 * std::f64::consts::PI).ln()).abs() < 1e-12);
/// ```
pub fn log_likelihood(x: &[f64], params: &MixtureParameters) -> MixtureResult<f64> {
    Ok(per_point_log_likelihood(x, params)?.iter().sum())
}

/// Log mixture density of each point, in sample order.
pub fn per_point_log_likelihood(x: &[f64], params: &MixtureParameters) -> MixtureResult<Vec<f64>> {
    log_mixture_density(x, params)
}
