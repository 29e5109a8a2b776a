//! Parameter sets for univariate Gaussian mixtures.
//!
//! A [`MixtureParameters`] holds three equal-length sequences indexed by
//! component: means, standard deviations and mixing weights. Construction
//! validates the sequences once and normalizes the weights to sum to one.

use crate::errors::{validate_finite, validate_positive, MixtureError, MixtureResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Means, standard deviations and mixing weights of a Gaussian mixture.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MixtureParameters {
    /// Component means, unconstrained
    pub mu: Vec<f64>,
    /// Component standard deviations, strictly positive
    pub sigma: Vec<f64>,
    /// Mixing weights, non-negative and summing to one
    pub ratio: Vec<f64>,
}

/// A single component viewed in isolation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentParameters {
    /// Component mean
    pub mean: f64,
    /// Component standard deviation
    pub std_dev: f64,
    /// Mixing weight
    pub weight: f64,
}

impl MixtureParameters {
    /// Builds a validated parameter set, normalizing `ratio` by its sum.
    ///
    /// # Errors
    /// * [`MixtureError::DimensionMismatch`] if `sigma` or `ratio` differ in length from `mu`
    /// * [`MixtureError::InvalidParameter`] for a non-positive sigma, a negative or
    ///   non-finite weight, weights summing to zero, or a non-finite mean
    ///
    /// # Example
    /// ```rust
    /// use gaussian_mixture_em::MixtureParameters;
    ///
    /// let params = MixtureParameters::new(
    ///     vec![0.0, 5.0, 10.0],
    ///     vec![1.0, 1.0, 2.0],
    ///     vec![2.0, 2.0, 1.0],
    /// ).unwrap();
    /// assert_eq!(params.ratio, vec![0.4, 0.4, 0.2]);
    /// ```
    pub fn new(mu: Vec<f64>, sigma: Vec<f64>, ratio: Vec<f64>) -> MixtureResult<Self> {
        let mut params = Self { mu, sigma, ratio };
        params.validate()?;
        params.normalize_ratio();
        Ok(params)
    }

    /// Checks the structural and value invariants, returning the component count.
    ///
    /// Weights only need a positive sum here; they are not required to be
    /// normalized already.
    pub fn validate(&self) -> MixtureResult<usize> {
        let k = self.mu.len();
        if k == 0 {
            return Err(MixtureError::InvalidParameter {
                parameter: "mu".to_string(),
                value: 0.0,
                constraint: "at least one component".to_string(),
            });
        }

        for (name, len) in [("sigma", self.sigma.len()), ("ratio", self.ratio.len())] {
            if len != k {
                return Err(MixtureError::DimensionMismatch {
                    parameter: name.to_string(),
                    expected: k,
                    actual: len,
                });
            }
        }

        for (i, &m) in self.mu.iter().enumerate() {
            validate_finite(m, &format!("mu[{}]", i))?;
        }
        for (i, &s) in self.sigma.iter().enumerate() {
            validate_positive(s, &format!("sigma[{}]", i))?;
        }
        for (i, &w) in self.ratio.iter().enumerate() {
            if !w.is_finite() || w < 0.0 {
                return Err(MixtureError::InvalidParameter {
                    parameter: format!("ratio[{}]", i),
                    value: w,
                    constraint: "a finite value >= 0".to_string(),
                });
            }
        }

        let total = self.ratio_sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(MixtureError::InvalidParameter {
                parameter: "ratio".to_string(),
                value: total,
                constraint: "weights with a positive, finite sum".to_string(),
            });
        }

        Ok(k)
    }

    /// Number of mixture components `K`.
    pub fn num_components(&self) -> usize {
        self.mu.len()
    }

    /// Free parameters of the model: mean, sd and weight per component, minus
    /// one for the sum-to-one constraint on the weights.
    pub fn num_free_parameters(&self) -> usize {
        (3 * self.num_components()).saturating_sub(1)
    }

    /// Weights divided by their sum. Does not mutate `self`.
    pub fn normalized_ratio(&self) -> Vec<f64> {
        let total = self.ratio_sum();
        self.ratio.iter().map(|w| w / total).collect()
    }

    /// Rescales the stored weights in place so they sum to one.
    pub fn normalize_ratio(&mut self) {
        self.ratio = self.normalized_ratio();
    }

    /// Component `k` as a single record, if it exists.
    pub fn component(&self, k: usize) -> Option<ComponentParameters> {
        Some(ComponentParameters {
            mean: *self.mu.get(k)?,
            std_dev: *self.sigma.get(k)?,
            weight: *self.ratio.get(k)?,
        })
    }

    /// Iterator over all components in index order.
    pub fn components(&self) -> impl Iterator<Item = ComponentParameters> + '_ {
        self.mu
            .iter()
            .zip(&self.sigma)
            .zip(&self.ratio)
            .map(|((&mean, &std_dev), &weight)| ComponentParameters {
                mean,
                std_dev,
                weight,
            })
    }

    fn ratio_sum(&self) -> f64 {
        self.ratio.iter().sum()
    }
}
