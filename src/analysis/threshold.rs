//! Baseline-relative threshold crossing and lead time.
//!
//! A stretch of the sweep known to lie far from the critical point serves
//! as the reference regime. An indicator "fires" at the first sweep point
//! outside that stretch where it exceeds μ₀ + n·σ₀ of the baseline.

use serde::{Deserialize, Serialize};

use crate::error::{invalid, EwsError, Result};

/// Default number of baseline standard deviations for a trigger
pub const DEFAULT_N_SIGMA: f64 = 2.0;

/// Closed interval of control-parameter values used as baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineRange {
    pub low: f64,
    pub high: f64,
}

impl BaselineRange {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(invalid(format!("invalid baseline range [{low}, {high}]")));
        }
        Ok(Self { low, high })
    }

    pub fn contains(&self, parameter: f64) -> bool {
        parameter >= self.low && parameter <= self.high
    }
}

/// Baseline statistics of one indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineThreshold {
    /// Baseline mean μ₀
    pub mean: f64,
    /// Baseline population std σ₀
    pub std: f64,
    /// Multiplier n in μ₀ + n·σ₀
    pub n_sigma: f64,
    /// Points in the baseline
    pub n_points: usize,
}

impl BaselineThreshold {
    /// Calibrate from baseline values
    pub fn calibrate(values: &[f64], n_sigma: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(invalid("baseline contains no sweep points"));
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
        Ok(Self {
            mean,
            std,
            n_sigma,
            n_points: values.len(),
        })
    }

    /// μ₀ + n·σ₀
    pub fn threshold(&self) -> f64 {
        self.mean + self.n_sigma * self.std
    }

    pub fn is_exceeded(&self, value: f64) -> bool {
        value > self.threshold()
    }
}

/// Sweep point at which an indicator fired
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Position in the sweep
    pub index: usize,
    /// Control parameter at that position
    pub parameter: f64,
    /// Indicator value that fired
    pub value: f64,
}

/// Order in which the sweep visits the control parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepDirection {
    Ascending,
    Descending,
}

impl SweepDirection {
    /// Direction from the first and last parameter values
    pub fn of(parameters: &[f64]) -> Self {
        match (parameters.first(), parameters.last()) {
            (Some(first), Some(last)) if last < first => SweepDirection::Descending,
            _ => SweepDirection::Ascending,
        }
    }
}

pub(crate) fn check_aligned(parameters: &[f64], values: &[f64]) -> Result<()> {
    if parameters.len() != values.len() {
        return Err(EwsError::DimensionMismatch {
            expected: parameters.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

/// Baseline values of an indicator, in sweep order
pub(crate) fn baseline_values(parameters: &[f64], values: &[f64], baseline: BaselineRange) -> Vec<f64> {
    parameters
        .iter()
        .zip(values)
        .filter(|&(&p, _)| baseline.contains(p))
        .map(|(_, &v)| v)
        .collect()
}

/// First point outside the baseline whose value exceeds μ₀ + n·σ₀
///
/// Returns the calibrated baseline alongside the trigger (if any).
pub fn find_trigger(
    parameters: &[f64],
    values: &[f64],
    baseline: BaselineRange,
    n_sigma: f64,
) -> Result<(BaselineThreshold, Option<Trigger>)> {
    check_aligned(parameters, values)?;
    let threshold = BaselineThreshold::calibrate(&baseline_values(parameters, values, baseline), n_sigma)?;

    let trigger = parameters
        .iter()
        .zip(values)
        .enumerate()
        .find(|&(_, (&p, &v))| !baseline.contains(p) && threshold.is_exceeded(v))
        .map(|(index, (&parameter, &value))| Trigger {
            index,
            parameter,
            value,
        });

    Ok((threshold, trigger))
}

/// Signed distance from trigger to critical point along the sweep
///
/// Positive means the indicator fired before the sweep reached the
/// critical point.
pub fn lead_time(trigger_parameter: f64, critical_parameter: f64, direction: SweepDirection) -> f64 {
    match direction {
        SweepDirection::Ascending => critical_parameter - trigger_parameter,
        SweepDirection::Descending => trigger_parameter - critical_parameter,
    }
}
