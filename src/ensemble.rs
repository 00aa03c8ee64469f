//! Ensemble evaluation with optional persistence.
//!
//! An ensemble is a batch of parameter sets simulated together, typically
//! sampled with [`get_random_values`](crate::parameters::get_random_values)
//! for sensitivity studies. Results can be written to a JSON file next to
//! the parameter sets that produced them.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::error::{Ml4ScmError, Result};
use crate::grid_search::grid_search_analytes;
use crate::parameters::Problem;
use crate::simulation::Simulator;

const SAVE_EXTENSION: &str = "json";
const PARAMS_SUFFIX: &str = "_p";

fn check_extension(path: &Path) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION) {
        return Err(Ml4ScmError::InvalidInput(format!(
            "file name '{}' must end in .{}",
            path.display(),
            SAVE_EXTENSION
        )));
    }
    Ok(())
}

/// Path of the parameter file saved alongside `savefile`:
/// `results.json` becomes `results_p.json`.
pub fn params_path(savefile: &Path) -> Result<PathBuf> {
    check_extension(savefile)?;
    let stem = savefile
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Ml4ScmError::InvalidInput(format!("'{}' has no file stem", savefile.display()))
        })?;
    Ok(savefile.with_file_name(format!("{}{}.{}", stem, PARAMS_SUFFIX, SAVE_EXTENSION)))
}

fn save_json(path: &Path, values: &Array2<f64>) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(file, values)?;
    Ok(())
}

/// Simulate every row of `params` and stack the outputs.
///
/// # Arguments
///
/// * `sim` - The simulator
/// * `problem` - Parameter names and bounds
/// * `params` - Parameter sets, one per row
/// * `analytes` - Observed quantities to report
/// * `savefile` - If given, the `(members x values)` result is saved there
///   and `params` to [`params_path`]`(savefile)`. Must end in `.json`; this
///   is checked before anything is simulated.
///
/// # Returns
///
/// * `Result<Array2<f64>>` - One row of outputs per parameter set
pub fn ensemble_sim<S: Simulator + ?Sized>(
    sim: &S,
    problem: &Problem,
    params: ArrayView2<f64>,
    analytes: &[String],
    savefile: Option<&Path>,
) -> Result<Array2<f64>> {
    let params_file = savefile.map(params_path).transpose()?;

    let output = grid_search_analytes(sim, problem, params, analytes)?;

    if let (Some(savefile), Some(params_file)) = (savefile, params_file) {
        save_json(savefile, &output)?;
        save_json(&params_file, &params.to_owned())?;
        debug!(
            "saved ensemble of {} members to {}",
            output.nrows(),
            savefile.display()
        );
    }

    Ok(output)
}

/// Load a matrix saved by [`ensemble_sim`], either the results or the
/// parameter file.
pub fn load_sim(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    let path = path.as_ref();
    check_extension(path)?;
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
