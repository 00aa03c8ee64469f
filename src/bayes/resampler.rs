//! Likelihood-weighted importance resampling.

use std::fmt;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use super::config::BayesConfig;
use super::history::{Generation, ResamplingHistory};
use crate::error::{Ml4ScmError, Result};
use crate::estimators::norm_weights;
use crate::grid_search::grid_search_analytes;
use crate::parameters::{init_params, Problem};
use crate::simulation::Simulator;

/// Where a resampling run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplerState {
    /// Nothing drawn or evaluated yet
    Init,

    /// The latest generation has been simulated and weighted
    Evaluated,

    /// A new generation has been drawn but not yet simulated
    Resampled,

    /// All requested generations are in the history
    Finished,
}

impl fmt::Display for ResamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResamplerState::Init => "init",
            ResamplerState::Evaluated => "evaluated",
            ResamplerState::Resampled => "resampled",
            ResamplerState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Simulate a generation and weight its members against the measured data.
pub fn evaluate_generation<S: Simulator + ?Sized>(
    sim: &S,
    problem: &Problem,
    params: Array2<f64>,
    measured: ArrayView1<f64>,
    analytes: &[String],
) -> Result<Generation> {
    let concentrations = grid_search_analytes(sim, problem, params.view(), analytes)?;
    let weights = norm_weights(concentrations.view(), measured)?;

    Ok(Generation {
        parameters: params,
        concentrations,
        weights,
    })
}

/// Draw the next generation from `previous`.
///
/// Each of the `previous.len()` slots independently copies one member of
/// `previous`, picked with probability equal to its weight. Members may be
/// picked several times or not at all.
pub fn resample_generation(previous: &Generation, rng: &mut impl Rng) -> Result<Array2<f64>> {
    let dist = WeightedIndex::new(previous.weights.iter())
        .map_err(|e| Ml4ScmError::Sampling(e.to_string()))?;

    let mut params = Array2::zeros(previous.parameters.dim());
    for mut row in params.rows_mut() {
        row.assign(&previous.parameters.row(dist.sample(rng)));
    }
    Ok(params)
}

/// Bayesian importance resampler.
///
/// Drives the loop
///
/// ```text
/// Init -> Evaluated -> Resampled -> Evaluated -> ... -> Finished
/// ```
///
/// The initial generation is drawn from a discretized uniform prior over the
/// problem bounds; each later generation is drawn from the previous one in
/// proportion to its likelihood weights and then simulated and weighted in
/// turn. After `num_trials` evaluated generations the full history is
/// available.
///
/// Any error (simulator failure, degenerate likelihood, weights that cannot
/// be normalized) ends the run; the state stays where it was.
pub struct BayesResampler<'a, S: Simulator + ?Sized> {
    simulator: &'a S,
    problem: &'a Problem,
    measured: Array1<f64>,
    config: BayesConfig,
    state: ResamplerState,
    pending: Option<Array2<f64>>,
    history: ResamplingHistory,
}

impl<'a, S: Simulator + ?Sized> BayesResampler<'a, S> {
    /// Create a resampler.
    ///
    /// # Arguments
    ///
    /// * `simulator` - Evaluates each generation
    /// * `problem` - Parameter names and bounds
    /// * `measured` - Measured values the simulations are compared to
    /// * `config` - Trial, set and pool counts plus analytes
    pub fn new(
        simulator: &'a S,
        problem: &'a Problem,
        measured: Array1<f64>,
        config: BayesConfig,
    ) -> Result<Self> {
        config.validate()?;
        if measured.is_empty() {
            return Err(Ml4ScmError::InvalidInput(
                "measured vector is empty".to_string(),
            ));
        }

        Ok(Self {
            simulator,
            problem,
            measured,
            config,
            state: ResamplerState::Init,
            pending: None,
            history: ResamplingHistory::new(),
        })
    }

    pub fn state(&self) -> ResamplerState {
        self.state
    }

    pub fn config(&self) -> &BayesConfig {
        &self.config
    }

    pub fn history(&self) -> &ResamplingHistory {
        &self.history
    }

    /// Give up the resampler and keep its history.
    pub fn into_history(self) -> ResamplingHistory {
        self.history
    }

    /// Perform one state transition and return the new state.
    pub fn step(&mut self, rng: &mut impl Rng) -> Result<ResamplerState> {
        match self.state {
            ResamplerState::Init => {
                let params = init_params(
                    self.config.num_sets,
                    self.problem.bounds(),
                    self.config.pool_size,
                    rng,
                )?;
                self.evaluate(params)?;
            }
            ResamplerState::Evaluated => {
                if self.history.len() >= self.config.num_trials {
                    self.state = ResamplerState::Finished;
                } else {
                    let previous = self.history.last().ok_or_else(|| {
                        Ml4ScmError::InvalidInput("no evaluated generation".to_string())
                    })?;
                    self.pending = Some(resample_generation(previous, rng)?);
                    self.state = ResamplerState::Resampled;
                }
            }
            ResamplerState::Resampled => {
                let params = self.pending.take().ok_or_else(|| {
                    Ml4ScmError::InvalidInput("no resampled generation pending".to_string())
                })?;
                self.evaluate(params)?;
            }
            ResamplerState::Finished => {}
        }

        Ok(self.state)
    }

    /// Run until `num_trials` generations are evaluated and return the history.
    pub fn run(mut self, rng: &mut impl Rng) -> Result<ResamplingHistory> {
        while self.step(rng)? != ResamplerState::Finished {}
        Ok(self.history)
    }

    fn evaluate(&mut self, params: Array2<f64>) -> Result<()> {
        let generation = match evaluate_generation(
            self.simulator,
            self.problem,
            params.clone(),
            self.measured.view(),
            &self.config.analytes,
        ) {
            Ok(generation) => generation,
            Err(e) => {
                if self.state == ResamplerState::Resampled {
                    self.pending = Some(params);
                }
                return Err(e);
            }
        };

        let best = generation
            .weights
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        self.history.push(generation)?;
        self.state = ResamplerState::Evaluated;

        info!(
            "generation {}/{} evaluated, max weight {:.4e}",
            self.history.len(),
            self.config.num_trials,
            best
        );
        debug!("resampler state: {}", self.state);
        Ok(())
    }
}

/// Run a complete resampling in one call.
///
/// Equivalent to [`BayesResampler::new`] followed by
/// [`BayesResampler::run`].
pub fn bayes_resample<S: Simulator + ?Sized>(
    sim: &S,
    problem: &Problem,
    measured: Array1<f64>,
    config: BayesConfig,
    rng: &mut impl Rng,
) -> Result<ResamplingHistory> {
    BayesResampler::new(sim, problem, measured, config)?.run(rng)
}
