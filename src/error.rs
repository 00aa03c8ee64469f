use thiserror::Error;

use crate::parameters::bounds::BoundsError;

/// Error types for the ml4scm-rs library.
#[derive(Error, Debug)]
pub enum Ml4ScmError {
    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error for an inconsistent problem description.
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Error for invalid configuration values (counts, step sizes, analytes).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error for bound construction problems.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// The candidate concentrations have zero variance, so the likelihood
    /// score is undefined.
    #[error("Likelihood undefined: simulated concentrations have zero variance")]
    DegenerateVariance,

    /// A likelihood score that cannot be used as an importance weight.
    #[error("Invalid likelihood score {value} for member {index}")]
    InvalidScore { index: usize, value: f64 },

    /// The scores of an ensemble sum to zero (or underflow), so they cannot
    /// be normalized.
    #[error("Cannot normalize weights: scores sum to {sum}")]
    DegenerateWeights { sum: f64 },

    /// The weighted sampler rejected a weight vector.
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// A parameter vector that has no counterpart in the original catalogue.
    #[error("Parameter vector not found in catalogue: {0}")]
    UnknownParameterVector(String),

    /// The simulator executable could not be located.
    #[error("Simulator not found: {0}")]
    SimulatorNotFound(String),

    /// The simulator ran but exited unsuccessfully.
    #[error("Simulator exited with status {status}: {stderr}")]
    SimulatorFailed { status: String, stderr: String },

    /// Simulator output that cannot be interpreted.
    #[error("Malformed simulator output: {0}")]
    MalformedOutput(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for ml4scm-rs operations.
pub type Result<T> = std::result::Result<T, Ml4ScmError>;
