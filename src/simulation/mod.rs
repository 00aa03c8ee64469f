//! Simulator collaborators.
//!
//! The inference code never talks to a simulation executable directly; it
//! goes through the [`Simulator`] trait. Two implementations are provided:
//!
//! - [`SimulationRunner`] drives the external PHREEQC binary (feature
//!   `phreeqc`, enabled by default).
//! - [`FnSimulator`] evaluates an in-process closure, useful for surrogate
//!   models and tests.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Ml4ScmError, Result};
use crate::parameters::Problem;

#[cfg(feature = "phreeqc")]
pub mod phreeqc;
#[cfg(feature = "phreeqc")]
mod runner;
pub mod selected_output;

#[cfg(feature = "phreeqc")]
pub use phreeqc::{Phreeqc, PhreeqcOutput};
#[cfg(feature = "phreeqc")]
pub use runner::SimulationRunner;
pub use selected_output::SelectedOutput;

/// Analyte evaluated when the caller does not name one.
pub const DEFAULT_ANALYTE: &str = "U";

/// Output of one simulated parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Position of the parameter set in the submitted batch
    pub simulation_id: usize,

    /// Simulated analyte values. With several analytes, the series of each
    /// analyte follow one another in the requested order.
    pub concentrations: Array1<f64>,
}

/// Something that can evaluate a batch of parameter sets.
pub trait Simulator {
    /// Evaluate every row of `values` and return one result per row, in row
    /// order.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem whose parameters the columns of `values` follow
    /// * `values` - Parameter sets, one per row
    /// * `analytes` - Names of the observed quantities to report
    fn run_problem(
        &self,
        problem: &Problem,
        values: ArrayView2<f64>,
        analytes: &[String],
    ) -> Result<Vec<SimulationResult>>;
}

/// Check that a batch of parameter sets fits the problem.
pub(crate) fn check_batch(problem: &Problem, values: &ArrayView2<f64>) -> Result<()> {
    if values.ncols() != problem.num_vars() {
        return Err(Ml4ScmError::DimensionMismatch(format!(
            "parameter matrix has {} columns, problem declares {} parameters",
            values.ncols(),
            problem.num_vars()
        )));
    }
    if values.nrows() == 0 {
        return Err(Ml4ScmError::InvalidInput(
            "parameter matrix has no rows".to_string(),
        ));
    }
    Ok(())
}

/// Stack per-member results into a `(members x values)` matrix.
///
/// The results must come back in submission order, one per member, all of
/// the same length.
pub fn results_to_matrix(results: &[SimulationResult], members: usize) -> Result<Array2<f64>> {
    if results.len() != members {
        return Err(Ml4ScmError::MalformedOutput(format!(
            "expected {} simulation results, got {}",
            members,
            results.len()
        )));
    }

    let width = results.first().map_or(0, |r| r.concentrations.len());
    let mut matrix = Array2::zeros((members, width));
    for (i, (result, mut row)) in results.iter().zip(matrix.rows_mut()).enumerate() {
        if result.simulation_id != i {
            return Err(Ml4ScmError::MalformedOutput(format!(
                "result {} reports simulation id {}",
                i, result.simulation_id
            )));
        }
        if result.concentrations.len() != width {
            return Err(Ml4ScmError::MalformedOutput(format!(
                "simulation {} returned {} values, expected {}",
                i,
                result.concentrations.len(),
                width
            )));
        }
        row.assign(&result.concentrations);
    }

    Ok(matrix)
}

/// A [`Simulator`] backed by a closure mapping one parameter set to its
/// concentrations.
///
/// The closure sees the parameter row and the requested analytes.
pub struct FnSimulator<F> {
    model: F,
}

impl<F> FnSimulator<F>
where
    F: Fn(ArrayView1<f64>, &[String]) -> Result<Array1<f64>>,
{
    pub fn new(model: F) -> Self {
        Self { model }
    }
}

impl<F> Simulator for FnSimulator<F>
where
    F: Fn(ArrayView1<f64>, &[String]) -> Result<Array1<f64>>,
{
    fn run_problem(
        &self,
        problem: &Problem,
        values: ArrayView2<f64>,
        analytes: &[String],
    ) -> Result<Vec<SimulationResult>> {
        check_batch(problem, &values)?;

        values
            .rows()
            .into_iter()
            .enumerate()
            .map(|(simulation_id, row)| {
                Ok(SimulationResult {
                    simulation_id,
                    concentrations: (self.model)(row, analytes)?,
                })
            })
            .collect()
    }
}
