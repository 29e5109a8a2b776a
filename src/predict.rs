//! Hard component assignment for new observations.

use crate::{
    density::{map_points, ComponentTerms},
    errors::{validate_all_finite, MixtureError, MixtureResult},
    math_utils::argmax_first,
    parameters::MixtureParameters,
    responsibilities::{posterior_probabilities, ResponsibilityMatrix},
};

/// Most probable component for each point under `params`.
///
/// Compares `ratio[k] * density_k(point)` across components without dividing by
/// the mixture density, which is the same for every component of a point. The
/// comparison runs on logarithms so far-tail points still resolve to the
/// nearest component instead of an all-zero tie. Exact ties go to the lowest
/// component index.
///
/// # Errors
/// Same validation failures as
/// [`evaluate_mixture_density`](crate::density::evaluate_mixture_density), and
/// `NonFiniteObservation` for the first point that is NaN or infinite.
///
/// # Example
/// ```rust
/// use gaussian_mixture_em::{predict, MixtureParameters};
///
/// let params = MixtureParameters::new(vec![0.0, 10.0], vec![1.0, 1.0], vec![0.5, 0.5]).unwrap();
/// assert_eq!(predict(&params, &[-1.0, 5.0, 11.0]).unwrap(), vec![0, 0, 1]);
/// ```
pub fn predict(params: &MixtureParameters, points: &[f64]) -> MixtureResult<Vec<usize>> {
    let terms = ComponentTerms::prepare(params)?;
    validate_all_finite(points)?;

    map_points(points, |p| argmax_first(&terms.weighted_log_terms(p)))
        .into_iter()
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| MixtureError::NumericalError {
            reason: "component log terms have no maximum".to_string(),
        })
}

/// Posterior component probabilities for new points.
pub fn predict_proba(
    params: &MixtureParameters,
    points: &[f64],
) -> MixtureResult<ResponsibilityMatrix> {
    posterior_probabilities(points, params)
}
