//! CUSUM Detector: Sequential Change-Point Detection over a Sweep
//!
//! Page's one-sided CUSUM on a standardized indicator:
//!
//!   C(k) = max(0, C(k-1) + (S(k) - μ₀)/σ₀ - a)
//!
//! with μ₀, σ₀ taken from the baseline stretch of the sweep and allowance a.
//! The detector fires when C(k) > h. Unlike the single-point μ₀ + 2σ₀ rule
//! it accumulates small, persistent rises, so it is reported next to the
//! threshold trigger rather than instead of it.

use serde::{Deserialize, Serialize};

use super::threshold::{baseline_values, check_aligned, BaselineRange, Trigger};
use crate::error::{invalid, Result};

/// Floor on σ₀ so a flat baseline does not divide by zero
const MIN_REFERENCE_STD: f64 = 1e-10;

/// Allowance and threshold, both in units of σ₀
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CusumParams {
    /// Allowance a (slack per step)
    pub allowance: f64,
    /// Detection threshold h
    pub threshold: f64,
}

impl Default for CusumParams {
    fn default() -> Self {
        Self {
            allowance: 0.5,
            threshold: 4.0,
        }
    }
}

/// One-sided CUSUM detector
#[derive(Debug, Clone)]
pub struct CusumDetector {
    /// Reference mean μ₀
    reference_mean: f64,
    /// Reference std σ₀
    reference_std: f64,
    params: CusumParams,
    /// Current CUSUM value
    current: f64,
    /// History of CUSUM values
    history: Vec<f64>,
}

impl CusumDetector {
    /// Calibrate from reference data (the baseline regime)
    pub fn calibrate(reference_data: &[f64], params: CusumParams) -> Result<Self> {
        if reference_data.is_empty() {
            return Err(invalid("CUSUM reference data is empty"));
        }
        let n = reference_data.len() as f64;
        let reference_mean = reference_data.iter().sum::<f64>() / n;
        let variance = reference_data
            .iter()
            .map(|x| (x - reference_mean).powi(2))
            .sum::<f64>()
            / (n - 1.0).max(1.0);

        Ok(Self {
            reference_mean,
            reference_std: variance.sqrt().max(MIN_REFERENCE_STD),
            params,
            current: 0.0,
            history: Vec::new(),
        })
    }

    /// Process a single observation; true once C exceeds h
    pub fn update(&mut self, statistic: f64) -> bool {
        let z = (statistic - self.reference_mean) / self.reference_std;
        self.current = (self.current + z - self.params.allowance).max(0.0);
        self.history.push(self.current);
        self.current > self.params.threshold
    }

    /// Current CUSUM value
    pub fn current_value(&self) -> f64 {
        self.current
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn reference_mean(&self) -> f64 {
        self.reference_mean
    }

    pub fn reference_std(&self) -> f64 {
        self.reference_std
    }
}

/// First post-baseline sweep point at which the CUSUM fires
///
/// Baseline points calibrate the detector; the remaining points are fed in
/// sweep order.
pub fn cusum_trigger(
    parameters: &[f64],
    values: &[f64],
    baseline: BaselineRange,
    params: CusumParams,
) -> Result<Option<Trigger>> {
    check_aligned(parameters, values)?;
    let mut detector = CusumDetector::calibrate(&baseline_values(parameters, values, baseline), params)?;

    for (index, (&parameter, &value)) in parameters.iter().zip(values).enumerate() {
        if baseline.contains(parameter) {
            continue;
        }
        if detector.update(value) {
            return Ok(Some(Trigger {
                index,
                parameter,
                value,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cusum_detects_shift() {
        let mut detector = CusumDetector::calibrate(&[0.0, 0.1, -0.1, 0.05, -0.05], CusumParams::default()).unwrap();
        let detected = (0..50).any(|_| detector.update(3.0));
        assert!(detected, "CUSUM should detect mean shift");
        assert!(detector.current_value() > 4.0);
    }

    #[test]
    fn test_cusum_quiet_on_reference() {
        let reference: Vec<f64> = (0..100).map(|i| (i as f64 * 0.7).sin()).collect();
        let mut detector = CusumDetector::calibrate(&reference, CusumParams::default()).unwrap();
        let fired = reference.iter().any(|&x| detector.update(x));
        assert!(!fired);
        assert_eq!(detector.history().len(), 100);
    }

    #[test]
    fn test_cusum_trigger_accumulates_small_rise() {
        // A persistent +1σ rise never crosses μ₀ + 2σ₀ but does accumulate
        let params: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let mut values = vec![0.0, 1.0, -1.0, 1.0, -1.0, 0.0];
        values.extend(std::iter::repeat(1.5).take(14));
        let baseline = BaselineRange::new(0.0, 5.0).unwrap();

        let trigger = cusum_trigger(&params, &values, baseline, CusumParams::default())
            .unwrap()
            .unwrap();
        assert!(trigger.index > 6);

        let (_, single) = super::super::threshold::find_trigger(&params, &values, baseline, 2.0).unwrap();
        assert!(single.is_none());
    }
}
