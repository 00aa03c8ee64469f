//! # Parameter Space
//!
//! This module describes what is being inferred: the bounded, named
//! parameters of a simulation problem and the ways parameter sets are drawn
//! from them.
//!
//! ## Core Components
//!
//! - [`Bound`]: admissible `[lower, upper]` range of one parameter
//! - [`Problem`]: ordered names and bounds plus simulator file references
//! - [`sample_one_set`], [`init_params`]: discretized uniform draws used to
//!   seed the Bayesian resampler
//! - [`get_random_values`]: continuous uniform draws
//!
//! ## Example Usage
//!
//! ```rust
//! use ml4scm_rs::parameters::{init_params, Bound, Problem};
//! use rand::SeedableRng;
//!
//! let problem = Problem::from_json(r#"{
//!     "names": ["a", "b"],
//!     "bounds": [[1.0, 2.0], [3.0, 4.0]],
//!     "num_vars": 2,
//!     "input_filename": "input.file",
//!     "output_filename": "output.file",
//!     "db_template_filename": "db_template.file"
//! }"#).unwrap();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let params = init_params(10, problem.bounds(), 100, &mut rng).unwrap();
//! assert_eq!(params.dim(), (10, 2));
//! ```

pub mod bounds;
pub mod problem;
pub mod sampling;

pub use bounds::{Bound, BoundsError};
pub use problem::{Problem, ProblemSpec};
pub use sampling::{get_random_values, init_params, sample_one_set, DEFAULT_POOL_SIZE};
