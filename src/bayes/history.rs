//! Resampling history.

use ndarray::{stack, Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Ml4ScmError, Result};

/// One evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Parameter sets, `(num_sets x num_vars)`
    pub parameters: Array2<f64>,

    /// Simulated concentrations, `(num_sets x values)`
    pub concentrations: Array2<f64>,

    /// Normalized weights, one per member
    pub weights: Array1<f64>,
}

impl Generation {
    pub fn len(&self) -> usize {
        self.parameters.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every generation a resampling run produced, oldest first.
///
/// Grows by one generation per iteration and is never edited afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResamplingHistory {
    generations: Vec<Generation>,
}

impl ResamplingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a generation. All generations must share the same shapes.
    pub(crate) fn push(&mut self, generation: Generation) -> Result<()> {
        if generation.concentrations.nrows() != generation.len()
            || generation.weights.len() != generation.len()
        {
            return Err(Ml4ScmError::DimensionMismatch(format!(
                "generation has {} parameter sets, {} concentration rows and {} weights",
                generation.len(),
                generation.concentrations.nrows(),
                generation.weights.len()
            )));
        }
        if let Some(first) = self.generations.first() {
            if first.parameters.dim() != generation.parameters.dim()
                || first.concentrations.dim() != generation.concentrations.dim()
            {
                return Err(Ml4ScmError::DimensionMismatch(format!(
                    "generation shapes {:?}/{:?} differ from {:?}/{:?}",
                    generation.parameters.dim(),
                    generation.concentrations.dim(),
                    first.parameters.dim(),
                    first.concentrations.dim()
                )));
            }
        }
        self.generations.push(generation);
        Ok(())
    }

    /// Number of generations.
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    pub fn first(&self) -> Option<&Generation> {
        self.generations.first()
    }

    pub fn last(&self) -> Option<&Generation> {
        self.generations.last()
    }

    /// Parameters of every generation, `(generations x num_sets x num_vars)`.
    pub fn parameters(&self) -> Result<Array3<f64>> {
        self.stack2(|g| &g.parameters)
    }

    /// Concentrations of every generation, `(generations x num_sets x values)`.
    pub fn concentrations(&self) -> Result<Array3<f64>> {
        self.stack2(|g| &g.concentrations)
    }

    /// Weights of every generation, `(generations x num_sets)`.
    pub fn weights(&self) -> Result<Array2<f64>> {
        self.require_generations()?;
        let views: Vec<_> = self.generations.iter().map(|g| g.weights.view()).collect();
        stack(Axis(0), &views).map_err(|e| Ml4ScmError::DimensionMismatch(e.to_string()))
    }

    fn stack2(&self, field: impl Fn(&Generation) -> &Array2<f64>) -> Result<Array3<f64>> {
        self.require_generations()?;
        let views: Vec<_> = self.generations.iter().map(|g| field(g).view()).collect();
        stack(Axis(0), &views).map_err(|e| Ml4ScmError::DimensionMismatch(e.to_string()))
    }

    fn require_generations(&self) -> Result<()> {
        if self.generations.is_empty() {
            return Err(Ml4ScmError::InvalidInput(
                "resampling history is empty".to_string(),
            ));
        }
        Ok(())
    }
}
