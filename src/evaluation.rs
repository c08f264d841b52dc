//! Evaluation metrics for fitted regression models.
//!
//! These are the loss functions the resampling harnesses in
//! [`crate::model_selection`] aggregate over held-out rows.

use ndarray::Array1;

/// Compute the mean squared error.
pub fn mean_squared_error(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let n = actual.len();
    if n == 0 {
        return 0.0;
    }
    let sum_sq: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    sum_sq / n as f64
}

/// Compute the root mean squared error.
pub fn root_mean_squared_error(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    mean_squared_error(actual, predicted).sqrt()
}

/// Compute the mean absolute error.
pub fn mean_absolute_error(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let n = actual.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    sum / n as f64
}
