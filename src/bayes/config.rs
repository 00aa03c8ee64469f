//! Configuration options for the Bayesian resampler.

use serde::{Deserialize, Serialize};

use crate::error::{Ml4ScmError, Result};
use crate::parameters::DEFAULT_POOL_SIZE;
use crate::simulation::DEFAULT_ANALYTE;

/// Configuration options for [`BayesResampler`](super::BayesResampler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesConfig {
    /// Total number of generations to evaluate, including the initial one. Default: 10
    pub num_trials: usize,

    /// Number of parameter sets per generation. Default: 100
    pub num_sets: usize,

    /// Number of evenly spaced candidates per parameter when drawing the
    /// initial generation. Default: 100
    pub pool_size: usize,

    /// Analytes the simulator reports. Default: ["U"]
    pub analytes: Vec<String>,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self {
            num_trials: 10,
            num_sets: 100,
            pool_size: DEFAULT_POOL_SIZE,
            analytes: vec![DEFAULT_ANALYTE.to_string()],
        }
    }
}

impl BayesConfig {
    /// Create a configuration with the given trial and set counts and
    /// defaults elsewhere.
    pub fn new(num_trials: usize, num_sets: usize) -> Self {
        Self {
            num_trials,
            num_sets,
            ..Self::default()
        }
    }

    /// Set the number of generations.
    pub fn with_num_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    /// Set the generation size.
    pub fn with_num_sets(mut self, num_sets: usize) -> Self {
        self.num_sets = num_sets;
        self
    }

    /// Set the per-parameter candidate pool size.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the reported analytes.
    pub fn with_analytes<I, S>(mut self, analytes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analytes = analytes.into_iter().map(Into::into).collect();
        self
    }

    /// Check that every count is at least one and an analyte is named.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("num_trials", self.num_trials),
            ("num_sets", self.num_sets),
            ("pool_size", self.pool_size),
        ] {
            if value == 0 {
                return Err(Ml4ScmError::InvalidConfig(format!(
                    "{} must be at least 1",
                    name
                )));
            }
        }
        if self.analytes.is_empty() {
            return Err(Ml4ScmError::InvalidConfig(
                "at least one analyte is required".to_string(),
            ));
        }
        Ok(())
    }
}
