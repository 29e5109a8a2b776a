//! # Fit Result Structures
//!
//! Immutable outputs of an EM fit: the final parameters, per-iteration history,
//! information criteria and hard component assignments. Every field is derived
//! from the same terminal iteration, so `n_iterations`, the history lengths and
//! `final_params` always agree.

use crate::{parameters::MixtureParameters, responsibilities::ResponsibilityMatrix};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Snapshot of the parameters after one iteration.
///
/// Iteration 0 is the validated, normalized starting point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationRecord {
    /// Iteration number, 0 for the initial state
    pub iteration: usize,
    /// Parameters at the end of the iteration
    pub params: MixtureParameters,
    /// Log-likelihood of the sample under `params`
    pub log_likelihood: f64,
}

/// Complete output of [`fit`](crate::em::fit).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitResult {
    /// Parameters after the last M-step
    pub final_params: MixtureParameters,
    /// Log-likelihood at `final_params`
    pub final_log_likelihood: f64,
    /// Akaike Information Criterion
    pub aic: f64,
    /// Bayesian Information Criterion
    pub bic: f64,
    /// Free parameters used by the criteria (3K - 1)
    pub num_parameters: usize,
    /// Number of observations fitted
    pub num_observations: usize,
    /// Most probable component per observation, from the last E-step
    pub assignments: Vec<usize>,
    /// Responsibilities from the last E-step
    pub responsibilities: ResponsibilityMatrix,
    /// Number of E/M iterations performed
    pub n_iterations: usize,
    /// Whether the tolerance was met before the iteration budget ran out
    pub converged: bool,
    /// One record per iteration, starting with iteration 0
    pub params_history: Vec<IterationRecord>,
    /// `(iteration, log_likelihood)` pairs, parallel to `params_history`
    pub log_likelihood_history: Vec<(usize, f64)>,
}

/// `AIC = -2 LL + 2 p`
pub fn calculate_aic(log_likelihood: f64, num_parameters: usize) -> f64 {
    -2.0 * log_likelihood + 2.0 * num_parameters as f64
}

/// `BIC = -2 LL + p ln(n)`
pub fn calculate_bic(log_likelihood: f64, num_parameters: usize, num_observations: usize) -> f64 {
    -2.0 * log_likelihood + num_parameters as f64 * (num_observations as f64).ln()
}

impl FitResult {
    /// Number of mixture components.
    pub fn num_components(&self) -> usize {
        self.final_params.num_components()
    }

    /// Count of observations hard-assigned to each component.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_components()];
        for &k in &self.assignments {
            if let Some(size) = sizes.get_mut(k) {
                *size += 1;
            }
        }
        sizes
    }

    /// Plain-text report of the fit.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("=== Gaussian Mixture Fit (EM) ===\n\n");
        s.push_str(&format!(
            "Observations: {}   Components: {}   Free params: {}\n",
            self.num_observations,
            self.num_components(),
            self.num_parameters
        ));
        s.push_str(&format!(
            "Converged: {}   Iterations: {}\n\n",
            self.converged, self.n_iterations
        ));

        s.push_str(&format!("Log-likelihood: {:.4}\n", self.final_log_likelihood));
        s.push_str(&format!("AIC: {:.4}\n", self.aic));
        s.push_str(&format!("BIC: {:.4}\n\n", self.bic));

        s.push_str("--- Components ---\n");
        for (k, (component, size)) in self
            .final_params
            .components()
            .zip(self.component_sizes())
            .enumerate()
        {
            s.push_str(&format!(
                "  [{}] mu={:.6}  sigma={:.6}  ratio={:.6}  n={}\n",
                k, component.mean, component.std_dev, component.weight, size
            ));
        }

        s
    }
}
