//! Grid evaluation and grid resampling.
//!
//! A "grid" is any matrix of parameter sets (rows are members, columns
//! follow the problem's parameter order). The evaluators submit the whole
//! matrix to the simulator in one call and keep member order throughout.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::error::{Ml4ScmError, Result};
use crate::estimators::{normalize_weights, residual_sum_of_squares, UNIT_SCALE};
use crate::parameters::Problem;
use crate::simulation::{results_to_matrix, Simulator, DEFAULT_ANALYTE};

/// Evaluate a grid for the default analyte and return the raw
/// `(members x values)` output matrix.
pub fn grid_search<S: Simulator + ?Sized>(
    sim: &S,
    problem: &Problem,
    params: ArrayView2<f64>,
) -> Result<Array2<f64>> {
    grid_search_analytes(sim, problem, params, &[DEFAULT_ANALYTE.to_string()])
}

/// Evaluate a grid for the given analytes.
pub fn grid_search_analytes<S: Simulator + ?Sized>(
    sim: &S,
    problem: &Problem,
    params: ArrayView2<f64>,
    analytes: &[String],
) -> Result<Array2<f64>> {
    let results = sim.run_problem(problem, params, analytes)?;
    results_to_matrix(&results, params.nrows())
}

/// Evaluate a grid and return the residual sum of squares of every member
/// against the measured values (simulated values scaled by 1e6).
pub fn grid_search_rss<S: Simulator + ?Sized>(
    sim: &S,
    problem: &Problem,
    params: ArrayView2<f64>,
    measured: ArrayView1<f64>,
) -> Result<Array1<f64>> {
    let res = grid_search(sim, problem, params)?;
    res.axis_iter(Axis(0))
        .map(|row| residual_sum_of_squares(row, measured))
        .collect()
}

/// Evaluate a grid and score every member with `func`.
///
/// `func` receives the member's output scaled by [`UNIT_SCALE`].
pub fn grid_search_with<S, F>(
    sim: &S,
    problem: &Problem,
    params: ArrayView2<f64>,
    func: F,
) -> Result<Array1<f64>>
where
    S: Simulator + ?Sized,
    F: Fn(ArrayView1<f64>) -> Result<f64>,
{
    let res = grid_search(sim, problem, params)?;
    res.axis_iter(Axis(0))
        .map(|row| func(row.mapv(|c| c * UNIT_SCALE).view()))
        .collect()
}

/// Resample grid indices by weight.
///
/// Returns a `(num_trials x cells)` index matrix. Row 0 is the identity
/// `0..cells`; every further row holds `cells` independent draws with
/// replacement, each index drawn with probability equal to its normalized
/// grid weight. The same weights are used for every trial.
pub fn gs_resample(
    num_trials: usize,
    grid_weights: ArrayView1<f64>,
    rng: &mut impl Rng,
) -> Result<Array2<usize>> {
    if num_trials == 0 {
        return Err(Ml4ScmError::InvalidConfig(
            "num_trials must be at least 1".to_string(),
        ));
    }

    let cells = grid_weights.len();
    let weights = normalize_weights(&grid_weights.to_vec())?;
    let dist = WeightedIndex::new(weights.iter())
        .map_err(|e| Ml4ScmError::Sampling(e.to_string()))?;

    let mut indices = Array2::zeros((num_trials, cells));
    indices.row_mut(0).assign(&Array1::from_iter(0..cells));
    for mut row in indices.rows_mut().into_iter().skip(1) {
        for idx in row.iter_mut() {
            *idx = dist.sample(rng);
        }
    }

    Ok(indices)
}
