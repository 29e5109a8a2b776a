//! Synthetic data generation from a Gaussian mixture.
//!
//! Sampling is a collaborator of the fitter, not part of it: it only consumes
//! [`MixtureParameters`]. Seeded generation goes through ChaCha20 so a given
//! seed reproduces the same sample on every platform.

use crate::{
    errors::{MixtureError, MixtureResult},
    parameters::MixtureParameters,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::Normal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for synthetic sample generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Number of observations to draw
    pub length: usize,
    /// Random seed for reproducible generation; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 1000,
            seed: None,
        }
    }
}

/// Draw observations together with the component that generated each one.
///
/// # Example
/// ```rust
/// use gaussian_mixture_em::{generate_labelled_mixture_sample, GeneratorConfig, MixtureParameters};
///
/// let params = MixtureParameters::new(vec![0.0, 10.0], vec![1.0, 1.0], vec![0.5, 0.5]).unwrap();
/// let config = GeneratorConfig { length: 100, seed: Some(7) };
/// let (x, labels) = generate_labelled_mixture_sample(&params, &config).unwrap();
/// assert_eq!(x.len(), 100);
/// assert!(labels.iter().all(|&k| k < 2));
/// ```
pub fn generate_labelled_mixture_sample(
    params: &MixtureParameters,
    config: &GeneratorConfig,
) -> MixtureResult<(Vec<f64>, Vec<usize>)> {
    params.validate()?;

    let weights = params.normalized_ratio();
    let chooser = WeightedIndex::new(&weights).map_err(|e| MixtureError::InvalidParameter {
        parameter: "ratio".to_string(),
        value: weights.iter().sum(),
        constraint: format!("usable sampling weights ({})", e),
    })?;

    let normals = params
        .components()
        .enumerate()
        .map(|(k, c)| {
            Normal::new(c.mean, c.std_dev).map_err(|e| MixtureError::InvalidParameter {
                parameter: format!("sigma[{}]", k),
                value: c.std_dev,
                constraint: format!("a valid normal distribution ({})", e),
            })
        })
        .collect::<MixtureResult<Vec<_>>>()?;

    let mut rng = match config.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let mut values = Vec::with_capacity(config.length);
    let mut labels = Vec::with_capacity(config.length);
    for _ in 0..config.length {
        let k = chooser.sample(&mut rng);
        values.push(normals[k].sample(&mut rng));
        labels.push(k);
    }

    Ok((values, labels))
}

/// Draw observations from the mixture, discarding component labels.
pub fn generate_mixture_sample(
    params: &MixtureParameters,
    config: &GeneratorConfig,
) -> MixtureResult<Vec<f64>> {
    generate_labelled_mixture_sample(params, config).map(|(values, _)| values)
}
