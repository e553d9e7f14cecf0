//! Standard early-warning indicators of a scalar series.
//!
//! Variance and lag-1 autocorrelation both rise on the approach to a
//! critical point (critical slowing down), which makes them the baseline
//! that EI has to beat.

use serde::{Deserialize, Serialize};

/// Arithmetic mean; 0.0 for an empty series
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Population variance (divides by n); 0.0 for an empty series
pub fn variance(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let m = mean(series);
    series.iter().map(|x| (x - m).powi(2)).sum::<f64>() / series.len() as f64
}

/// Lag-1 autocorrelation Σ (xₜ - x̄)(xₜ₊₁ - x̄) / Σ (xₜ - x̄)²
///
/// A constant or too-short series has no defined correlation and yields 0.0.
pub fn lag1_autocorrelation(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let m = mean(series);
    let denom: f64 = series.iter().map(|x| (x - m).powi(2)).sum();
    if denom <= 0.0 {
        return 0.0;
    }
    let numer: f64 = series
        .windows(2)
        .map(|w| (w[0] - m) * (w[1] - m))
        .sum();
    numer / denom
}

/// Mean, variance and lag-1 autocorrelation of one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesIndicators {
    pub mean: f64,
    pub variance: f64,
    pub autocorrelation: f64,
}

impl SeriesIndicators {
    pub fn from_series(series: &[f64]) -> Self {
        Self {
            mean: mean(series),
            variance: variance(series),
            autocorrelation: lag1_autocorrelation(series),
        }
    }
}
