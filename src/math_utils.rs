//! Shared numerical helpers for mixture computations.

/// Numerically stable `ln(Σ exp(v))`.
///
/// Returns negative infinity for an empty slice or when every term is
/// negative infinity (all weighted densities are exactly zero).
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max.is_infinite() {
        return max;
    }

    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Index of the largest value; ties resolve to the lowest index.
///
/// NaN entries never win. Returns `None` for an empty slice.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            // Strict comparison keeps the earliest index on ties
            Some((_, best_value)) if value <= best_value || value.is_nan() => {}
            _ if value.is_nan() => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}
