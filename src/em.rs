//! Expectation-Maximization fitting of univariate Gaussian mixtures.
//!
//! Each iteration runs a full E-step (responsibilities under the current
//! parameters) followed by closed-form maximum-likelihood updates of every
//! component from that same responsibility matrix. The loop stops when the
//! absolute log-likelihood change drops below the tolerance or when the
//! iteration budget is spent; running out of budget is a normal stop, reported
//! through [`FitResult::converged`].
//!
//! Degeneracies are never patched over. A component whose responsibility mass
//! collapses aborts the fit with [`MixtureError::DegenerateComponent`], and a
//! standard deviation that updates to zero aborts with
//! [`MixtureError::InvalidParameter`]. No NaN ever reaches the history.
//!
//! # References
//! Dempster, A. P., Laird, N. M., & Rubin, D. B. (1977). Maximum Likelihood from
//! Incomplete Data via the EM Algorithm. Journal of the Royal Statistical Society:
//! Series B (Methodological), 39(1), 1-22.

use crate::{
    config::EmConfig,
    errors::{validate_sample, MixtureError, MixtureResult},
    likelihood::log_likelihood,
    parameters::MixtureParameters,
    responsibilities::{posterior_probabilities, ResponsibilityMatrix},
    results::{calculate_aic, calculate_bic, FitResult, IterationRecord},
};
use log::{debug, info, warn};

/// Upper bound on history slots reserved up front; longer runs grow the vector.
const HISTORY_PREALLOCATION: usize = 1024;

/// Relative log-likelihood drop that is reported as an ascent violation.
const ASCENT_SLACK: f64 = 1e-10;

/// EM fitter for univariate Gaussian mixtures.
#[derive(Debug, Clone, Default)]
pub struct ExpectationMaximization {
    /// Loop configuration
    pub config: EmConfig,
}

/// What the iteration loop hands back once it stops.
struct IterationOutcome {
    n_iterations: usize,
    converged: bool,
    final_responsibilities: ResponsibilityMatrix,
    history: Vec<IterationRecord>,
}

impl ExpectationMaximization {
    /// Create a fitter with the given configuration.
    pub fn new(config: EmConfig) -> Self {
        Self { config }
    }

    /// Fit a mixture to `x` starting from `initial`.
    ///
    /// `initial` is validated and its weights normalized before the first
    /// iteration; the caller's value is not modified.
    ///
    /// # Errors
    /// * [`MixtureError::DimensionMismatch`] / [`MixtureError::InvalidParameter`]
    ///   for bad initial parameters or configuration
    /// * [`MixtureError::EmptySample`] / [`MixtureError::NonFiniteObservation`]
    ///   for an unusable sample
    /// * [`MixtureError::DegenerateComponent`] / [`MixtureError::InvalidParameter`]
    ///   if a component collapses mid-fit
    pub fn fit(&self, x: &[f64], initial: &MixtureParameters) -> MixtureResult<FitResult> {
        initial.validate()?;
        self.config.validate()?;
        validate_sample(x)?;

        let mut params = initial.clone();
        params.normalize_ratio();

        let outcome = self.run_iterations(x, params)?;
        Ok(Self::assemble(x.len(), outcome))
    }

    fn run_iterations(
        &self,
        x: &[f64],
        initial: MixtureParameters,
    ) -> MixtureResult<IterationOutcome> {
        let tolerance = self.config.tolerance;
        let max_iterations = self.config.max_iterations;

        let mut history =
            Vec::with_capacity(max_iterations.min(HISTORY_PREALLOCATION) + 1);

        let mut previous_ll = checked_log_likelihood(x, &initial, 0)?;
        debug!("EM iteration 0: log-likelihood {:.6}", previous_ll);

        let mut params = initial;
        history.push(IterationRecord {
            iteration: 0,
            params: params.clone(),
            log_likelihood: previous_ll,
        });

        let mut iteration = 0;
        let (final_responsibilities, converged) = loop {
            iteration += 1;

            let gamma = expectation_step(x, &params)?;
            params = maximization_step(x, &gamma, iteration, self.config.min_component_mass)?;

            let ll = checked_log_likelihood(x, &params, iteration)?;
            let delta = ll - previous_ll;
            debug!(
                "EM iteration {}: log-likelihood {:.6} (change {:.3e})",
                iteration, ll, delta
            );

            if delta < -ASCENT_SLACK * (1.0 + previous_ll.abs()) {
                warn!(
                    "EM log-likelihood decreased at iteration {}: {:.6} -> {:.6}",
                    iteration, previous_ll, ll
                );
            }

            history.push(IterationRecord {
                iteration,
                params: params.clone(),
                log_likelihood: ll,
            });

            if delta.abs() < tolerance {
                info!(
                    "EM converged after {} iterations (log-likelihood {:.6})",
                    iteration, ll
                );
                break (gamma, true);
            }

            if iteration >= max_iterations {
                warn!(
                    "EM stopped at the iteration limit ({}) with log-likelihood change {:.3e} >= {:.3e}",
                    max_iterations,
                    delta.abs(),
                    tolerance
                );
                break (gamma, false);
            }

            previous_ll = ll;
        };

        Ok(IterationOutcome {
            n_iterations: iteration,
            converged,
            final_responsibilities,
            history,
        })
    }

    fn assemble(num_observations: usize, outcome: IterationOutcome) -> FitResult {
        let IterationOutcome {
            n_iterations,
            converged,
            final_responsibilities,
            history,
        } = outcome;

        // The loop always pushes iteration 0 and at least one update
        let last = &history[history.len() - 1];
        let final_params = last.params.clone();
        let final_log_likelihood = last.log_likelihood;

        let num_parameters = final_params.num_free_parameters();
        let log_likelihood_history = history
            .iter()
            .map(|record| (record.iteration, record.log_likelihood))
            .collect();

        FitResult {
            aic: calculate_aic(final_log_likelihood, num_parameters),
            bic: calculate_bic(final_log_likelihood, num_parameters, num_observations),
            assignments: final_responsibilities.hard_assignments(),
            responsibilities: final_responsibilities,
            final_params,
            final_log_likelihood,
            num_parameters,
            num_observations,
            n_iterations,
            converged,
            params_history: history,
            log_likelihood_history,
        }
    }
}

/// Fit a Gaussian mixture with `init_mu.len()` components by EM.
///
/// # Example
/// ```rust
/// use gaussian_mixture_em::fit;
///
/// let x = [-0.2, 0.1, 0.3, -0.1, 9.8, 10.1, 10.4, 9.9];
/// let result = fit(&x, 100, 1e-8, &[0.5, 9.0], &[1.0, 1.0], &[1.0, 1.0]).unwrap();
///
/// assert_eq!(result.assignments, vec![0, 0, 0, 0, 1, 1, 1, 1]);
/// assert_eq!(result.n_iterations + 1, result.params_history.len());
/// ```
pub fn fit(
    x: &[f64],
    max_iter: usize,
    tol: f64,
    init_mu: &[f64],
    init_sigma: &[f64],
    init_ratio: &[f64],
) -> MixtureResult<FitResult> {
    let initial = MixtureParameters::new(
        init_mu.to_vec(),
        init_sigma.to_vec(),
        init_ratio.to_vec(),
    )?;
    fit_with_config(x, &initial, EmConfig::new(max_iter, tol))
}

/// Fit with an explicit [`EmConfig`].
pub fn fit_with_config(
    x: &[f64],
    initial: &MixtureParameters,
    config: EmConfig,
) -> MixtureResult<FitResult> {
    ExpectationMaximization::new(config).fit(x, initial)
}

/// E-step: the full responsibility matrix under `params`.
pub fn expectation_step(
    x: &[f64],
    params: &MixtureParameters,
) -> MixtureResult<ResponsibilityMatrix> {
    posterior_probabilities(x, params)
}

/// M-step: closed-form updates of every component from one responsibility matrix.
///
/// Means are updated first and each standard deviation is taken around its
/// new mean. Weights are the average responsibility and are renormalized.
/// `iteration` is only used for error context.
///
/// # Errors
/// * [`MixtureError::DegenerateComponent`] if a column mass is `<= min_component_mass`
///   or not finite
/// * [`MixtureError::InvalidParameter`] if an updated sigma is not strictly
///   positive (all its mass sits on a single value)
pub fn maximization_step(
    x: &[f64],
    gamma: &ResponsibilityMatrix,
    iteration: usize,
    min_component_mass: f64,
) -> MixtureResult<MixtureParameters> {
    if gamma.num_points() != x.len() {
        return Err(MixtureError::DimensionMismatch {
            parameter: "responsibilities".to_string(),
            expected: x.len(),
            actual: gamma.num_points(),
        });
    }

    let k = gamma.num_components();
    let n = x.len() as f64;
    let masses = gamma.column_sums();

    let mut mu = Vec::with_capacity(k);
    let mut sigma = Vec::with_capacity(k);
    let mut ratio = Vec::with_capacity(k);

    for (component, &mass) in masses.iter().enumerate() {
        if !mass.is_finite() || mass <= min_component_mass {
            debug!(
                "component {} lost its responsibility mass ({:e}) at iteration {}",
                component, mass, iteration
            );
            return Err(MixtureError::DegenerateComponent {
                component,
                iteration,
                mass,
            });
        }

        let mean = gamma
            .rows()
            .zip(x)
            .map(|(row, &xi)| row[component] * xi)
            .sum::<f64>()
            / mass;

        let variance = gamma
            .rows()
            .zip(x)
            .map(|(row, &xi)| row[component] * (xi - mean).powi(2))
            .sum::<f64>()
            / mass;
        let std_dev = variance.sqrt();

        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(MixtureError::InvalidParameter {
                parameter: format!("sigma[{}]", component),
                value: std_dev,
                constraint: format!("> 0 after the M-step of iteration {}", iteration),
            });
        }

        mu.push(mean);
        sigma.push(std_dev);
        ratio.push(mass / n);
    }

    MixtureParameters::new(mu, sigma, ratio)
}

fn checked_log_likelihood(
    x: &[f64],
    params: &MixtureParameters,
    iteration: usize,
) -> MixtureResult<f64> {
    let ll = log_likelihood(x, params)?;
    if ll.is_finite() {
        Ok(ll)
    } else {
        Err(MixtureError::NumericalError {
            reason: format!("log-likelihood is {} at iteration {}", ll, iteration),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_single_component_m_step_is_sample_moments() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let params = MixtureParameters::new(vec![0.0], vec![1.0], vec![1.0]).unwrap();

        let gamma = expectation_step(&x, &params).unwrap();
        let updated = maximization_step(&x, &gamma, 1, 0.0).unwrap();

        assert_approx_eq!(updated.mu[0], 2.5, 1e-15);
        assert_approx_eq!(updated.sigma[0], 1.25f64.sqrt(), 1e-15);
        assert_approx_eq!(updated.ratio[0], 1.0, 1e-15);
    }

    #[test]
    fn test_m_step_sigma_uses_updated_mean() {
        let x = [0.0, 2.0];
        let gamma = ResponsibilityMatrix::from_rows(vec![vec![0.75, 0.25], vec![0.25, 0.75]], 2);

        let updated = maximization_step(&x, &gamma, 1, 0.0).unwrap();

        // component 0: mean = 0.5 / 1.0, var = (0.75*0.25 + 0.25*2.25) / 1.0
        assert_approx_eq!(updated.mu[0], 0.5, 1e-15);
        assert_approx_eq!(updated.sigma[0], 0.75f64.sqrt(), 1e-15);
        assert_approx_eq!(updated.mu[1], 1.5, 1e-15);
        assert_approx_eq!(updated.sigma[1], 0.75f64.sqrt(), 1e-15);
        assert_approx_eq!(updated.ratio[0], 0.5, 1e-15);
    }

    #[test]
    fn test_zero_weight_component_is_degenerate() {
        let x = [0.0, 1.0, 2.0];
        let result = fit(&x, 10, 1e-6, &[0.0, 1.0], &[1.0, 1.0], &[1.0, 0.0]);

        match result {
            Err(MixtureError::DegenerateComponent {
                component,
                iteration,
                mass,
            }) => {
                assert_eq!(component, 1);
                assert_eq!(iteration, 1);
                assert_eq!(mass, 0.0);
            }
            other => panic!("Expected DegenerateComponent, got {:?}", other),
        }
    }

    #[test]
    fn test_collapsed_variance_fails_fast() {
        let x = [3.0, 3.0, 3.0];
        let result = fit(&x, 10, 1e-6, &[0.0], &[1.0], &[1.0]);

        match result {
            Err(MixtureError::InvalidParameter {
                parameter,
                value,
                constraint,
            }) => {
                assert_eq!(parameter, "sigma[0]");
                assert_eq!(value, 0.0);
                assert!(constraint.contains("iteration 1"));
            }
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_iteration_limit_is_not_an_error() {
        let x = [-1.2, -0.8, -1.0, 0.9, 1.1, 1.3, 0.7];
        let result = fit(&x, 1, 0.0, &[-0.5, 0.5], &[1.0, 1.0], &[0.5, 0.5]).unwrap();

        assert!(!result.converged);
        assert_eq!(result.n_iterations, 1);
        assert_eq!(result.params_history.len(), 2);
        assert_eq!(result.log_likelihood_history.len(), 2);
    }

    #[test]
    fn test_history_is_consistent_with_final_state() {
        let x = [-2.1, -1.9, -2.3, -1.7, 2.0, 2.2, 1.8, 2.4, 1.6];
        let result = fit(&x, 200, 1e-10, &[-1.0, 1.0], &[1.0, 1.0], &[1.0, 1.0]).unwrap();

        assert!(result.converged);
        assert_eq!(result.n_iterations + 1, result.params_history.len());
        assert_eq!(result.n_iterations + 1, result.log_likelihood_history.len());

        let last = result.params_history.last().unwrap();
        assert_eq!(last.iteration, result.n_iterations);
        assert_eq!(last.params, result.final_params);
        assert_eq!(last.log_likelihood, result.final_log_likelihood);

        for (i, (record, &(it, ll))) in result
            .params_history
            .iter()
            .zip(&result.log_likelihood_history)
            .enumerate()
        {
            assert_eq!(record.iteration, i);
            assert_eq!(it, i);
            assert_eq!(record.log_likelihood, ll);
        }
    }

    #[test]
    fn test_initial_record_holds_normalized_input() {
        let x = [0.0, 0.5, 1.0, 5.0, 5.5, 6.0];
        let result = fit(&x, 5, 1e-9, &[0.0, 5.0], &[1.0, 1.0], &[2.0, 2.0]).unwrap();

        let initial = &result.params_history[0];
        assert_eq!(initial.iteration, 0);
        assert_eq!(initial.params.ratio, vec![0.5, 0.5]);
        assert_eq!(initial.params.mu, vec![0.0, 5.0]);
    }

    #[test]
    fn test_infinite_initial_log_likelihood_is_numerical_error() {
        let x = [0.0, 1.0, 1e200];
        match fit(&x, 10, 1e-6, &[0.0, 1.0], &[1.0, 1.0], &[0.5, 0.5]) {
            Err(MixtureError::NumericalError { reason }) => {
                assert!(reason.contains("iteration 0"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }
    }

    #[test]
    fn test_responsibility_row_count_checked() {
        let gamma = ResponsibilityMatrix::from_rows(vec![vec![1.0]], 1);
        assert!(matches!(
            maximization_step(&[0.0, 1.0], &gamma, 1, 0.0),
            Err(MixtureError::DimensionMismatch { .. })
        ));
    }
}
