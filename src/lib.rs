//! # ml4scm-rs
//!
//! `ml4scm-rs` infers the parameters of surface complexation models run in
//! the PHREEQC geochemical simulator from measured concentrations.
//!
//! The library provides:
//! - A Gaussian likelihood score comparing simulated and measured series
//! - Grid evaluation of parameter sets and weight-proportional grid resampling
//! - A Bayesian importance resampler producing a history of weighted generations
//! - Posterior summaries: per-vector resampling counts and 2-D grid modes
//! - A PHREEQC process wrapper behind a `Simulator` trait, so that any
//!   in-process model can stand in for the external binary
//!
//! ## Basic Usage
//!
//! ```
//! use ml4scm_rs::bayes::{bayes_resample, BayesConfig};
//! use ml4scm_rs::parameters::{Bound, Problem};
//! use ml4scm_rs::posterior::param_count;
//! use ml4scm_rs::simulation::FnSimulator;
//! use ndarray::{arr1, Array1, ArrayView1};
//! use rand::SeedableRng;
//!
//! let problem = Problem::new(
//!     vec!["k".to_string(), "c".to_string()],
//!     vec![Bound::new(0.5, 1.5).unwrap(), Bound::new(0.0, 1.0).unwrap()],
//!     2,
//!     "input.pqi",
//!     "output.out",
//!     "db",
//! )
//! .unwrap();
//!
//! let sim = FnSimulator::new(|row: ArrayView1<f64>, _: &[String]| {
//!     Ok(Array1::from_iter((1..=4).map(|t| (row[0] * t as f64 + row[1]) * 1e-6)))
//! });
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let history = bayes_resample(
//!     &sim,
//!     &problem,
//!     arr1(&[1.5, 2.5, 3.5, 4.5]),
//!     BayesConfig::new(4, 25),
//!     &mut rng,
//! )
//! .unwrap();
//!
//! let counts = param_count(history.parameters().unwrap().view()).unwrap();
//! // 25 initial vectors counted once plus 3 resampled generations of 25
//! assert_eq!(counts.sum(), 100.0);
//! ```

pub mod error;

pub mod parameters;

pub mod estimators;

pub mod simulation;

pub mod grid_search;

pub mod bayes;

pub mod posterior;

pub mod ensemble;

pub mod utils;

// Re-exports for convenience
pub use error::{Ml4ScmError, Result};

pub use bayes::{bayes_resample, BayesConfig, BayesResampler, ResamplingHistory};
pub use parameters::{Bound, Problem};
pub use simulation::{FnSimulator, Simulator};

#[cfg(feature = "phreeqc")]
pub use simulation::{Phreeqc, SimulationRunner};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
