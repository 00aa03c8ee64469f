//! PHREEQC-backed [`Simulator`].

use log::debug;
use ndarray::ArrayView2;

use super::phreeqc::Phreeqc;
use super::{check_batch, SimulationResult, Simulator};
use crate::error::Result;
use crate::parameters::Problem;

/// Runs a [`Problem`] through PHREEQC, one parameter set at a time.
///
/// For every row the database template named by the problem is rendered
/// with the row's values, PHREEQC is run on the problem's input file, and
/// the requested analytes are read from the selected output. Runs are
/// strictly sequential because they share the rendered database and output
/// files.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    phreeqc: Phreeqc,
}

impl SimulationRunner {
    pub fn new(phreeqc: Phreeqc) -> Self {
        Self { phreeqc }
    }

    pub fn phreeqc(&self) -> &Phreeqc {
        &self.phreeqc
    }
}

impl Simulator for SimulationRunner {
    fn run_problem(
        &self,
        problem: &Problem,
        values: ArrayView2<f64>,
        analytes: &[String],
    ) -> Result<Vec<SimulationResult>> {
        check_batch(problem, &values)?;

        let template = problem.db_template_filename();
        let mut results = Vec::with_capacity(values.nrows());
        for (simulation_id, row) in values.rows().into_iter().enumerate() {
            let row = row.to_vec();
            Phreeqc::write_db_from_template(template, problem.names(), &row, None)?;

            let run = self.phreeqc.run_with_output(
                template,
                problem.input_filename(),
                problem.output_filename(),
                Some(analytes),
            )?;
            debug!(
                "simulation {}: {} react rows for {:?}",
                simulation_id,
                run.output.simulations.len(),
                analytes
            );

            results.push(SimulationResult {
                simulation_id,
                concentrations: run.output.concentrations(),
            });
        }

        Ok(results)
    }
}
