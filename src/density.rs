//! Mixture density evaluation.
//!
//! For a sample and a parameter set this module yields the per-component
//! Gaussian densities at every point and the weighted mixture density. The
//! log-space variants feed the log-likelihood, the E-step and prediction, so
//! underflow in the far tails never turns a responsibility into `0 / 0`.

use crate::{
    errors::{MixtureError, MixtureResult},
    math_utils::log_sum_exp,
    parameters::MixtureParameters,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

/// Densities of every component and of the whole mixture at each sample point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MixtureDensity {
    /// Normalized weights used for the evaluation
    pub weights: Vec<f64>,
    /// `component_densities[i][k]` is the pdf of component `k` at point `i`
    pub component_densities: Vec<Vec<f64>>,
    /// Weighted sum of the component densities at each point
    pub mixture_densities: Vec<f64>,
}

impl MixtureDensity {
    /// Number of evaluated points.
    pub fn num_points(&self) -> usize {
        self.mixture_densities.len()
    }

    /// Number of components.
    pub fn num_components(&self) -> usize {
        self.weights.len()
    }
}

/// Validated components ready for repeated evaluation.
///
/// Built once per public call so validation and weight normalization happen
/// a single time regardless of sample size.
#[derive(Debug, Clone)]
pub(crate) struct ComponentTerms {
    normals: Vec<Normal>,
    weights: Vec<f64>,
    log_weights: Vec<f64>,
}

impl ComponentTerms {
    pub(crate) fn prepare(params: &MixtureParameters) -> MixtureResult<Self> {
        params.validate()?;

        let normals = params
            .mu
            .iter()
            .zip(&params.sigma)
            .enumerate()
            .map(|(k, (&mean, &std_dev))| {
                Normal::new(mean, std_dev).map_err(|e| MixtureError::InvalidParameter {
                    parameter: format!("sigma[{}]", k),
                    value: std_dev,
                    constraint: format!("a valid normal distribution ({})", e),
                })
            })
            .collect::<MixtureResult<Vec<_>>>()?;

        let weights = params.normalized_ratio();
        // ln(0) = -inf marks a component that can never be selected
        let log_weights = weights.iter().map(|w| w.ln()).collect();

        Ok(Self {
            normals,
            weights,
            log_weights,
        })
    }

    pub(crate) fn num_components(&self) -> usize {
        self.normals.len()
    }

    pub(crate) fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Component pdfs at `point`.
    pub(crate) fn densities(&self, point: f64) -> Vec<f64> {
        self.normals.iter().map(|n| n.pdf(point)).collect()
    }

    /// `ln(ratio[k]) + ln pdf_k(point)` for every component.
    pub(crate) fn weighted_log_terms(&self, point: f64) -> Vec<f64> {
        self.normals
            .iter()
            .zip(&self.log_weights)
            .map(|(n, lw)| lw + n.ln_pdf(point))
            .collect()
    }

    /// `ln` of the mixture density at `point`, evaluated with log-sum-exp.
    pub(crate) fn log_mixture_density(&self, point: f64) -> f64 {
        log_sum_exp(&self.weighted_log_terms(point))
    }
}

/// Applies `f` to every point, in parallel when the `parallel` feature is on.
///
/// Each output slot depends on its own point only, so the result is identical
/// either way.
pub(crate) fn map_points<T, F>(x: &[f64], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(f64) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        x.par_iter().map(|&xi| f(xi)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        x.iter().map(|&xi| f(xi)).collect()
    }
}

/// Evaluates component and mixture densities at every point of `x`.
///
/// Weights are normalized before use; the stored parameters are not touched.
///
/// # Errors
/// Fails with [`MixtureError::DimensionMismatch`] or
/// [`MixtureError::InvalidParameter`] when `params` violates its invariants.
///
/// # Example
/// ```rust
/// use gaussian_mixture_em::{evaluate_mixture_density, MixtureParameters};
///
/// let params = MixtureParameters::new(vec![0.0, 3.0], vec![1.0, 1.0], vec![1.0, 1.0]).unwrap();
/// let density = evaluate_mixture_density(&[0.0, 1.5], &params).unwrap();
/// assert_eq!(density.num_points(), 2);
/// assert!(density.mixture_densities[0] > 0.0);
/// ```
pub fn evaluate_mixture_density(
    x: &[f64],
    params: &MixtureParameters,
) -> MixtureResult<MixtureDensity> {
    let terms = ComponentTerms::prepare(params)?;

    let rows = map_points(x, |xi| {
        let densities = terms.densities(xi);
        let mixture = densities
            .iter()
            .zip(terms.weights())
            .map(|(d, w)| w * d)
            .sum::<f64>();
        (densities, mixture)
    });
    let (component_densities, mixture_densities): (Vec<Vec<f64>>, Vec<f64>) =
        rows.into_iter().unzip();

    Ok(MixtureDensity {
        weights: terms.weights().to_vec(),
        component_densities,
        mixture_densities,
    })
}

/// Natural log of the mixture density at each point of `x`.
///
/// Matches `ln` of [`MixtureDensity::mixture_densities`] within floating-point
/// tolerance, but stays finite where the linear density underflows.
pub fn log_mixture_density(x: &[f64], params: &MixtureParameters) -> MixtureResult<Vec<f64>> {
    let terms = ComponentTerms::prepare(params)?;
    Ok(map_points(x, |xi| terms.log_mixture_density(xi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn three_components() -> MixtureParameters {
        MixtureParameters::new(
            vec![-2.0, 0.5, 4.0],
            vec![0.7, 1.3, 2.1],
            vec![2.0, 2.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_mixture_is_weighted_sum_of_components() {
        let params = three_components();
        let points: Vec<f64> = (-40..=40).map(|i| i as f64 * 0.25).collect();
        let density = evaluate_mixture_density(&points, &params).unwrap();

        assert_eq!(density.num_points(), points.len());
        assert_eq!(density.num_components(), 3);

        for (row, &mixture) in density
            .component_densities
            .iter()
            .zip(&density.mixture_densities)
        {
            let weighted: f64 = row.iter().zip(&params.ratio).map(|(d, w)| d * w).sum();
            assert_approx_eq!(weighted, mixture, 1e-15);
        }
    }

    #[test]
    fn test_component_density_matches_closed_form() {
        let params = MixtureParameters::new(vec![1.0], vec![2.0], vec![1.0]).unwrap();
        let density = evaluate_mixture_density(&[1.0, 3.0], &params).unwrap();

        let peak = 1.0 / (2.0 * (2.0 * std::f64::consts::PI).sqrt());
        assert_approx_eq!(density.component_densities[0][0], peak, 1e-14);
        assert_approx_eq!(density.component_densities[1][0], peak * (-0.5f64).exp(), 1e-14);
    }

    #[test]
    fn test_unnormalized_weights_are_normalized_before_use() {
        let raw = MixtureParameters {
            mu: vec![0.0, 1.0, 2.0],
            sigma: vec![1.0; 3],
            ratio: vec![2.0, 2.0, 1.0],
        };
        let density = evaluate_mixture_density(&[0.3], &raw).unwrap();

        assert_approx_eq!(density.weights[0], 0.4, 1e-15);
        assert_approx_eq!(density.weights[2], 0.2, 1e-15);
        assert_approx_eq!(density.weights.iter().sum::<f64>(), 1.0, 1e-15);
        // caller's parameters stay as supplied
        assert_eq!(raw.ratio, vec![2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_log_density_agrees_with_linear_density() {
        let params = three_components();
        let points = [-3.0, 0.0, 2.5, 7.0];
        let linear = evaluate_mixture_density(&points, &params).unwrap();
        let logs = log_mixture_density(&points, &params).unwrap();

        for (l, d) in logs.iter().zip(&linear.mixture_densities) {
            assert_approx_eq!(*l, d.ln(), 1e-12);
        }
    }

    #[test]
    fn test_log_density_finite_in_far_tail() {
        let params = MixtureParameters::new(vec![0.0], vec![1.0], vec![1.0]).unwrap();
        let linear = evaluate_mixture_density(&[60.0], &params).unwrap();
        let logs = log_mixture_density(&[60.0], &params).unwrap();

        assert_eq!(linear.mixture_densities[0], 0.0);
        let expected = -0.5 * (2.0 * std::f64::consts::PI).ln() - 1800.0;
        assert_approx_eq!(logs[0], expected, 1e-9);
    }

    #[test]
    fn test_validation_errors_propagate() {
        let mismatched = MixtureParameters {
            mu: vec![0.0, 1.0],
            sigma: vec![1.0],
            ratio: vec![0.5, 0.5],
        };
        assert!(matches!(
            evaluate_mixture_density(&[0.0], &mismatched),
            Err(MixtureError::DimensionMismatch { .. })
        ));

        let bad_sigma = MixtureParameters {
            mu: vec![0.0, 1.0],
            sigma: vec![1.0, 0.0],
            ratio: vec![0.5, 0.5],
        };
        assert!(matches!(
            log_mixture_density(&[0.0], &bad_sigma),
            Err(MixtureError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_empty_input_yields_empty_evaluation() {
        let density = evaluate_mixture_density(&[], &three_components()).unwrap();
        assert_eq!(density.num_points(), 0);
        assert_eq!(density.num_components(), 3);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_rows_match_sequential_map() {
        let terms = ComponentTerms::prepare(&three_components()).unwrap();
        let x: Vec<f64> = (-20_000..20_000).map(|i| i as f64 * 1e-3).collect();

        let parallel = map_points(&x, |xi| terms.weighted_log_terms(xi));
        let sequential: Vec<Vec<f64>> = x.iter().map(|&xi| terms.weighted_log_terms(xi)).collect();
        assert_eq!(parallel, sequential);

        let parallel = map_points(&x, |xi| terms.log_mixture_density(xi));
        let sequential: Vec<f64> = x.iter().map(|&xi| terms.log_mixture_density(xi)).collect();
        assert_eq!(parallel, sequential);
    }
}
