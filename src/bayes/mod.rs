//! Bayesian parameter estimation by importance resampling.
//!
//! This module provides a particle-style estimator: a generation of
//! parameter sets is simulated, every member is weighted by its likelihood
//! score, and the next generation is drawn from the current one in
//! proportion to those weights. Repeating this concentrates the ensemble in
//! the parameter regions that best explain the measured data; the empirical
//! density of the accumulated history approximates the posterior.
//!
//! ## Components
//!
//! - [`BayesConfig`]: trial, set and pool counts plus reported analytes
//! - [`BayesResampler`]: the resampling state machine
//! - [`ResamplingHistory`]: every evaluated [`Generation`], oldest first
//!
//! ## Example
//!
//! ```
//! use ml4scm_rs::bayes::{bayes_resample, BayesConfig};
//! use ml4scm_rs::parameters::{Bound, Problem};
//! use ml4scm_rs::simulation::FnSimulator;
//! use ndarray::{arr1, Array1, ArrayView1};
//! use rand::SeedableRng;
//!
//! let problem = Problem::new(
//!     vec!["k".to_string()],
//!     vec![Bound::new(0.5, 1.5).unwrap()],
//!     1,
//!     "input.pqi",
//!     "output.out",
//!     "db",
//! )
//! .unwrap();
//!
//! // Surrogate model: concentrations grow linearly with k
//! let sim = FnSimulator::new(|row: ArrayView1<f64>, _: &[String]| {
//!     Ok(Array1::from_iter((1..=3).map(|t| row[0] * t as f64 * 1e-6)))
//! });
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let history = bayes_resample(
//!     &sim,
//!     &problem,
//!     arr1(&[1.0, 2.0, 3.0]),
//!     BayesConfig::new(3, 20),
//!     &mut rng,
//! )
//! .unwrap();
//! assert_eq!(history.len(), 3);
//! ```

mod config;
mod history;
mod resampler;

pub use config::BayesConfig;
pub use history::{Generation, ResamplingHistory};
pub use resampler::{
    bayes_resample, evaluate_generation, resample_generation, BayesResampler, ResamplerState,
};
