//! Posterior component probabilities.
//!
//! The responsibility matrix is the E-step output: row `i` holds the posterior
//! probability of each component having generated observation `i`.

use crate::{
    density::{map_points, ComponentTerms},
    errors::{validate_all_finite, MixtureResult},
    math_utils::{argmax_first, log_sum_exp},
    parameters::MixtureParameters,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// N×K matrix of responsibilities stored row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResponsibilityMatrix {
    num_points: usize,
    num_components: usize,
    values: Vec<f64>,
}

impl ResponsibilityMatrix {
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>, num_components: usize) -> Self {
        let num_points = rows.len();
        let mut values = Vec::with_capacity(num_points * num_components);
        for row in rows {
            debug_assert_eq!(row.len(), num_components);
            values.extend(row);
        }

        Self {
            num_points,
            num_components,
            values,
        }
    }

    /// Number of observations (rows).
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Number of components (columns).
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Responsibility of component `k` for observation `i`.
    ///
    /// # Panics
    /// Panics if `i` or `k` is out of range.
    pub fn get(&self, i: usize, k: usize) -> f64 {
        assert!(k < self.num_components, "component index out of range");
        self.values[i * self.num_components + k]
    }

    /// Row `i`: the posterior over components for one observation.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.num_components;
        &self.values[start..start + self.num_components]
    }

    /// Iterator over rows in observation order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.values.chunks_exact(self.num_components.max(1))
    }

    /// `Σ_i gamma[i][k]` for every component, summed in observation order.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_components];
        for row in self.rows() {
            for (sum, &g) in sums.iter_mut().zip(row) {
                *sum += g;
            }
        }
        sums
    }

    /// Most probable component per observation, ties to the lowest index.
    ///
    /// NaN entries are skipped. A row whose entries are all NaN is labelled 0.
    /// Matrices computed by this crate never hold such a row because
    /// non-finite observations are rejected before the E-step.
    pub fn hard_assignments(&self) -> Vec<usize> {
        self.rows()
            .map(|row| argmax_first(row).unwrap_or(0))
            .collect()
    }
}

/// Responsibilities from already-prepared component terms.
pub(crate) fn responsibilities_with_terms(x: &[f64], terms: &ComponentTerms) -> ResponsibilityMatrix {
    let rows = map_points(x, |xi| {
        let log_terms = terms.weighted_log_terms(xi);
        let log_norm = log_sum_exp(&log_terms);
        log_terms
            .into_iter()
            .map(|t| (t - log_norm).exp())
            .collect::<Vec<f64>>()
    });

    ResponsibilityMatrix::from_rows(rows, terms.num_components())
}

/// Posterior probability of each component for each point.
///
/// `gamma[i][k] = ratio[k] * density_k(x[i]) / mixture_density(x[i])`,
/// evaluated in log space.
///
/// # Errors
/// Same validation failures as
/// [`evaluate_mixture_density`](crate::density::evaluate_mixture_density), and
/// `NonFiniteObservation` for the first point that is NaN or infinite.
pub fn posterior_probabilities(
    x: &[f64],
    params: &MixtureParameters,
) -> MixtureResult<ResponsibilityMatrix> {
    let terms = ComponentTerms::prepare(params)?;
    validate_all_finite(x)?;
    Ok(responsibilities_with_terms(x, &terms))
}
