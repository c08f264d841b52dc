//! Training losses for the boosting ensemble.
//!
//! Each variant carries the pair of functions a boosting round needs: the
//! negative gradient that the next tree is fitted to, and the optimal
//! constant step for a leaf region. Adding a loss means adding a variant
//! and its two match arms.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::GBoostError;

/// Differentiable loss minimized by the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Loss {
    /// Squared error, `½ · (y − ŷ)²` summed over rows.
    #[default]
    SquaredError,
}

impl Loss {
    /// Negative gradient of the loss at the current predictions, one entry
    /// per row. This is the pseudo-residual the next tree is fitted to.
    pub fn gradient(&self, y: &Array1<f64>, predictions: &Array1<f64>) -> Array1<f64> {
        match self {
            Loss::SquaredError => y - predictions,
        }
    }

    /// Loss-optimal constant step (gamma) for one leaf region, given the
    /// residuals of the rows routed to that leaf. Callers guarantee the
    /// region is non-empty.
    pub fn leaf_step(&self, residuals: &Array1<f64>) -> f64 {
        match self {
            Loss::SquaredError => residuals.sum() / residuals.len() as f64,
        }
    }
}

impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loss::SquaredError => f.write_str("squared_error"),
        }
    }
}

impl FromStr for Loss {
    type Err = GBoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "squared_error" => Ok(Loss::SquaredError),
            other => Err(GBoostError::UnsupportedLoss(other.to_string())),
        }
    }
}
