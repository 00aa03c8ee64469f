//! Parameter samplers
//!
//! All samplers take an explicit random number generator so that every run
//! can be seeded independently.

use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::bounds::Bound;
use crate::error::{Ml4ScmError, Result};

/// Default number of evenly spaced candidates per parameter.
pub const DEFAULT_POOL_SIZE: usize = 100;

/// Draw one parameter set.
///
/// Every parameter is drawn independently and uniformly from an evenly
/// spaced grid of `pool_size` points over its bound.
///
/// # Arguments
///
/// * `bounds` - Bounds of each parameter, in problem order
/// * `pool_size` - Number of grid points per parameter
/// * `rng` - Random number generator
pub fn sample_one_set(bounds: &[Bound], pool_size: usize, rng: &mut impl Rng) -> Result<Array1<f64>> {
    if pool_size == 0 {
        return Err(Ml4ScmError::InvalidConfig(
            "pool_size must be at least 1".to_string(),
        ));
    }

    let pick = Uniform::new(0, pool_size);
    let values: Vec<f64> = bounds
        .iter()
        .map(|bound| {
            let pool = bound.linspace(pool_size);
            pool[pick.sample(rng)]
        })
        .collect();

    Ok(Array1::from_vec(values))
}

/// Build an initial generation of `num_sets` parameter sets.
///
/// Rows are members, columns are parameters in problem order. Each row comes
/// from [`sample_one_set`], so the generation approximates a discretized
/// uniform prior with independent coordinates.
pub fn init_params(
    num_sets: usize,
    bounds: &[Bound],
    pool_size: usize,
    rng: &mut impl Rng,
) -> Result<Array2<f64>> {
    if num_sets == 0 {
        return Err(Ml4ScmError::InvalidConfig(
            "num_sets must be at least 1".to_string(),
        ));
    }

    let mut params = Array2::zeros((num_sets, bounds.len()));
    for mut row in params.rows_mut() {
        row.assign(&sample_one_set(bounds, pool_size, rng)?);
    }

    Ok(params)
}

/// Draw `n` parameter sets from the continuous uniform distribution over the
/// bounds, `lower + u * (upper - lower)` with `u` in `[0, 1)`.
///
/// Values are drawn row by row, parameter by parameter.
pub fn get_random_values(bounds: &[Bound], n: usize, rng: &mut impl Rng) -> Array2<f64> {
    let mut values = Array2::zeros((n, bounds.len()));
    for mut row in values.rows_mut() {
        for (value, bound) in row.iter_mut().zip(bounds) {
            let u: f64 = rng.gen();
            *value = bound.lower() + u * bound.width();
        }
    }
    values
}
