//! Parameter bounds
//!
//! A [`Bound`] is the admissible closed range `[lower, upper]` of one scalar
//! parameter. Bounds are immutable values compared by value; every sampler in
//! this crate draws from within them.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a bound
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: lower ({lower}) must not exceed upper ({upper})")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Bounds must be finite, got [{lower}, {upper}]")]
    NonFinite { lower: f64, upper: f64 },
}

/// Admissible range of a single scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Bound {
    lower: f64,
    upper: f64,
}

impl Bound {
    /// Create a new bound.
    ///
    /// # Arguments
    ///
    /// * `lower` - Smallest admissible value
    /// * `upper` - Largest admissible value
    ///
    /// # Returns
    ///
    /// A new `Bound` if both ends are finite and `lower <= upper`
    ///
    /// # Examples
    ///
    /// ```
    /// use ml4scm_rs::parameters::Bound;
    ///
    /// let bound = Bound::new(1.0, 2.0).unwrap();
    /// assert_eq!(bound.lower(), 1.0);
    /// assert_eq!(bound.upper(), 2.0);
    /// assert!(Bound::new(2.0, 1.0).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64) -> Result<Self, BoundsError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(BoundsError::NonFinite { lower, upper });
        }
        if lower > upper {
            return Err(BoundsError::InvalidBounds { lower, upper });
        }

        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Width of the range, `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if a value lies within the closed range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Evenly spaced grid of `num` points over `[lower, upper]`, both ends
    /// included. A single point grid is `[lower]`.
    pub fn linspace(&self, num: usize) -> Array1<f64> {
        Array1::linspace(self.lower, self.upper, num)
    }
}

impl TryFrom<(f64, f64)> for Bound {
    type Error = BoundsError;

    fn try_from((lower, upper): (f64, f64)) -> Result<Self, Self::Error> {
        Bound::new(lower, upper)
    }
}

impl From<Bound> for (f64, f64) {
    fn from(bound: Bound) -> Self {
        (bound.lower, bound.upper)
    }
}
