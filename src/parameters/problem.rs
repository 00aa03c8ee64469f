//! Problem description
//!
//! A [`Problem`] names the parameters being inferred, their bounds, and the
//! files the external simulator reads and writes. It is created once per
//! experiment and read-only afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::bounds::Bound;
use crate::error::{Ml4ScmError, Result};

/// Serializable form of a problem, as written in a JSON description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSpec {
    pub names: Vec<String>,
    pub bounds: Vec<Bound>,
    pub num_vars: usize,
    pub input_filename: PathBuf,
    pub output_filename: PathBuf,
    pub db_template_filename: PathBuf,
}

/// An ordered, named parameter space plus simulator file references.
///
/// Invariant: `names().len() == bounds().len() == num_vars()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProblemSpec", into = "ProblemSpec")]
pub struct Problem {
    names: Vec<String>,
    bounds: Vec<Bound>,
    num_vars: usize,
    input_filename: PathBuf,
    output_filename: PathBuf,
    db_template_filename: PathBuf,
}

impl Problem {
    /// Create a new problem, checking that names, bounds and `num_vars` agree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ml4scm_rs::parameters::{Bound, Problem};
    ///
    /// let bounds = vec![Bound::new(1.0, 2.0).unwrap(), Bound::new(3.0, 4.0).unwrap()];
    /// let problem = Problem::new(
    ///     vec!["a".to_string(), "b".to_string()],
    ///     bounds,
    ///     2,
    ///     "input.file",
    ///     "output.file",
    ///     "db_template.file",
    /// )
    /// .unwrap();
    /// assert_eq!(problem.num_vars(), 2);
    /// ```
    pub fn new(
        names: Vec<String>,
        bounds: Vec<Bound>,
        num_vars: usize,
        input_filename: impl Into<PathBuf>,
        output_filename: impl Into<PathBuf>,
        db_template_filename: impl Into<PathBuf>,
    ) -> Result<Self> {
        if names.len() != num_vars || bounds.len() != num_vars {
            return Err(Ml4ScmError::InvalidProblem(format!(
                "expected {} names and bounds, got {} names and {} bounds",
                num_vars,
                names.len(),
                bounds.len()
            )));
        }
        if num_vars == 0 {
            return Err(Ml4ScmError::InvalidProblem(
                "a problem needs at least one parameter".to_string(),
            ));
        }
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(Ml4ScmError::InvalidProblem(format!(
                    "parameter {} has an empty name",
                    i
                )));
            }
            if names[..i].contains(name) {
                return Err(Ml4ScmError::InvalidProblem(format!(
                    "duplicate parameter name '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            names,
            bounds,
            num_vars,
            input_filename: input_filename.into(),
            output_filename: output_filename.into(),
            db_template_filename: db_template_filename.into(),
        })
    }

    /// Parse a problem from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: ProblemSpec = serde_json::from_str(json)?;
        Self::try_from(spec)
    }

    /// Read and parse a JSON problem description from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Lower ends of all bounds, in parameter order.
    pub fn lower(&self) -> Vec<f64> {
        self.bounds.iter().map(Bound::lower).collect()
    }

    /// Upper ends of all bounds, in parameter order.
    pub fn upper(&self) -> Vec<f64> {
        self.bounds.iter().map(Bound::upper).collect()
    }

    pub fn input_filename(&self) -> &Path {
        &self.input_filename
    }

    pub fn output_filename(&self) -> &Path {
        &self.output_filename
    }

    pub fn db_template_filename(&self) -> &Path {
        &self.db_template_filename
    }
}

impl TryFrom<ProblemSpec> for Problem {
    type Error = Ml4ScmError;

    fn try_from(spec: ProblemSpec) -> Result<Self> {
        Problem::new(
            spec.names,
            spec.bounds,
            spec.num_vars,
            spec.input_filename,
            spec.output_filename,
            spec.db_template_filename,
        )
    }
}

impl From<Problem> for ProblemSpec {
    fn from(problem: Problem) -> Self {
        ProblemSpec {
            names: problem.names,
            bounds: problem.bounds,
            num_vars: problem.num_vars,
            input_filename: problem.input_filename,
            output_filename: problem.output_filename,
            db_template_filename: problem.db_template_filename,
        }
    }
}
