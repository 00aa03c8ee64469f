//! Likelihood scoring and weight normalization.
//!
//! The score used here is an ad hoc Gaussian-kernel plausibility measure,
//! not a calibrated log-likelihood: the variance in the exponent is the
//! candidate's own sample variance, recomputed for every candidate, rather
//! than a fixed measurement-noise variance.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::{Ml4ScmError, Result};

/// Factor converting simulated concentrations (mol/kgw) into the units of
/// the measured data.
pub const UNIT_SCALE: f64 = 1e6;

fn check_lengths(simulated: usize, measured: usize) -> Result<()> {
    if simulated != measured {
        return Err(Ml4ScmError::DimensionMismatch(format!(
            "simulated vector has {} values, measured vector has {}",
            simulated, measured
        )));
    }
    if simulated == 0 {
        return Err(Ml4ScmError::InvalidInput(
            "cannot score an empty concentration vector".to_string(),
        ));
    }
    Ok(())
}

/// Plausibility score of one simulated concentration vector.
///
/// Computes `exp(-sum((c * 1e6 - m)^2) / var(c * 1e6))` where `var` is the
/// population variance of the scaled simulated vector.
///
/// # Errors
///
/// * `DimensionMismatch` if the vectors differ in length
/// * `DegenerateVariance` if every simulated value is identical
pub fn likelihood(concs: ArrayView1<f64>, measured: ArrayView1<f64>) -> Result<f64> {
    check_lengths(concs.len(), measured.len())?;

    let scaled = concs.mapv(|c| c * UNIT_SCALE);
    let sse: f64 = scaled
        .iter()
        .zip(measured.iter())
        .map(|(c, m)| (c - m).powi(2))
        .sum();

    let variance = scaled.var(0.0);
    if variance == 0.0 || !variance.is_finite() {
        return Err(Ml4ScmError::DegenerateVariance);
    }

    Ok((-sse / variance).exp())
}

/// Bind [`likelihood`] to a measured vector, for use as a grid scoring
/// function.
pub fn likelihood_fn(measured: Array1<f64>) -> impl Fn(ArrayView1<f64>) -> Result<f64> {
    move |concs| likelihood(concs, measured.view())
}

/// Residual sum of squares between measured data and scaled simulated values.
pub fn residual_sum_of_squares(concs: ArrayView1<f64>, measured: ArrayView1<f64>) -> Result<f64> {
    check_lengths(concs.len(), measured.len())?;

    Ok(measured
        .iter()
        .zip(concs.iter())
        .map(|(m, c)| (m - c * UNIT_SCALE).powi(2))
        .sum())
}

/// Turn raw scores into weights summing to one, `w_i = s_i / sum(s)`.
///
/// # Errors
///
/// * `InvalidScore` for the first score that is negative, infinite or NaN
/// * `DegenerateWeights` if the scores sum to zero or underflow
pub fn normalize_weights(scores: &[f64]) -> Result<Array1<f64>> {
    if scores.is_empty() {
        return Err(Ml4ScmError::InvalidInput(
            "cannot normalize an empty score vector".to_string(),
        ));
    }
    if let Some((index, &value)) = scores
        .iter()
        .enumerate()
        .find(|(_, s)| !(s.is_finite() && **s >= 0.0))
    {
        return Err(Ml4ScmError::InvalidScore { index, value });
    }

    let sum: f64 = scores.iter().sum();
    if !(sum >= f64::MIN_POSITIVE) || !sum.is_finite() {
        return Err(Ml4ScmError::DegenerateWeights { sum });
    }

    Ok(scores.iter().map(|s| s / sum).collect())
}

/// Score every member (row) of a concentration matrix against the measured
/// vector and normalize the scores into weights.
pub fn norm_weights(concentrations: ArrayView2<f64>, measured: ArrayView1<f64>) -> Result<Array1<f64>> {
    let rows: Vec<ArrayView1<f64>> = concentrations.axis_iter(Axis(0)).collect();
    let scores = rows
        .into_par_iter()
        .map(|row| likelihood(row, measured))
        .collect::<Result<Vec<f64>>>()?;

    normalize_weights(&scores)
}
