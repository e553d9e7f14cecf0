//! Early-warning verdict for a completed sweep.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::sweep::SweepResults;
use crate::analysis::{
    causal_emergence_events, cusum_trigger, ei_ratio, find_trigger, kendall_tau, lead_time,
    BaselineRange, BaselineThreshold, CausalEmergence, CusumParams, KendallTau, SweepDirection,
    Trigger, DEFAULT_N_SIGMA,
};
use crate::error::{invalid, Result};

/// How to turn a sweep into warnings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Parameter range treated as far from the transition
    pub baseline: BaselineRange,
    /// Overrides the sweep's theoretical critical point
    pub critical_point: Option<f64>,
    pub n_sigma: f64,
    pub cusum: CusumParams,
}

impl AnalysisConfig {
    pub fn with_baseline(low: f64, high: f64) -> Result<Self> {
        Ok(Self {
            baseline: BaselineRange::new(low, high)?,
            ..Default::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.n_sigma.is_finite() || self.n_sigma < 0.0 {
            return Err(invalid(format!("n_sigma must be finite and non-negative, got {}", self.n_sigma)));
        }
        if let Some(c) = self.critical_point {
            if !c.is_finite() {
                return Err(invalid("critical point must be finite"));
            }
        }
        if !(self.cusum.allowance.is_finite() && self.cusum.threshold.is_finite()) || self.cusum.threshold <= 0.0 {
            return Err(invalid("CUSUM allowance and threshold must be finite, threshold positive"));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    /// Low-temperature baseline of the default Ising sweep
    fn default() -> Self {
        Self {
            baseline: BaselineRange { low: 1.5, high: 1.8 },
            critical_point: None,
            n_sigma: DEFAULT_N_SIGMA,
            cusum: CusumParams::default(),
        }
    }
}

/// Threshold and CUSUM outcome for one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWarning {
    pub name: String,
    pub baseline: BaselineThreshold,
    pub trigger: Option<Trigger>,
    /// Positive when the trigger precedes the critical point
    pub lead_time: Option<f64>,
    pub cusum_trigger: Option<Trigger>,
    pub cusum_lead_time: Option<f64>,
}

impl IndicatorWarning {
    fn evaluate(
        name: impl Into<String>,
        parameters: &[f64],
        values: &[f64],
        config: &AnalysisConfig,
        critical_point: f64,
        direction: SweepDirection,
    ) -> Result<Self> {
        let (baseline, trigger) = find_trigger(parameters, values, config.baseline, config.n_sigma)?;
        let cusum = cusum_trigger(parameters, values, config.baseline, config.cusum)?;
        let lead = |t: &Trigger| lead_time(t.parameter, critical_point, direction);

        Ok(Self {
            name: name.into(),
            baseline,
            lead_time: trigger.as_ref().map(lead),
            trigger,
            cusum_lead_time: cusum.as_ref().map(lead),
            cusum_trigger: cusum,
        })
    }

    /// Fired before the critical point
    pub fn is_early(&self) -> bool {
        self.lead_time.is_some_and(|l| l > 0.0)
    }
}

/// EI-ratio analysis at one coarse-graining scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleReport {
    pub block_size: usize,
    /// EI(macro) / EI(micro) per sweep point
    pub ei_ratio: Vec<f64>,
    pub ratio_vs_variance: Option<KendallTau>,
    pub ratio_vs_autocorrelation: Option<KendallTau>,
    pub warning: IndicatorWarning,
}

/// Full early-warning verdict for one sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyWarningReport {
    pub critical_point: f64,
    pub direction: SweepDirection,
    pub variance_vs_autocorrelation: Option<KendallTau>,
    pub variance: IndicatorWarning,
    pub autocorrelation: IndicatorWarning,
    pub scales: Vec<ScaleReport>,
    pub causal_emergence: CausalEmergence,
}

impl EarlyWarningReport {
    pub fn analyze(results: &SweepResults, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let params = &results.parameters;
        let critical_point = config.critical_point.unwrap_or(results.critical_point);
        let direction = SweepDirection::of(params);

        let variance_vs_autocorrelation = kendall_tau(&results.variance, &results.autocorrelation)?;
        let variance = IndicatorWarning::evaluate("variance", params, &results.variance, config, critical_point, direction)?;
        let autocorrelation = IndicatorWarning::evaluate(
            "autocorrelation",
            params,
            &results.autocorrelation,
            config,
            critical_point,
            direction,
        )?;

        let mut scales = Vec::with_capacity(results.scales.len());
        for scale in &results.scales {
            let ratio = ei_ratio(&scale.ei_micro, &scale.ei_macro)?;
            let warning = IndicatorWarning::evaluate(
                format!("ei_ratio_b{}", scale.block_size),
                params,
                &ratio,
                config,
                critical_point,
                direction,
            )?;
            debug!(
                block_size = scale.block_size,
                trigger = ?warning.trigger.map(|t| t.parameter),
                "ei ratio evaluated"
            );
            scales.push(ScaleReport {
                block_size: scale.block_size,
                ratio_vs_variance: kendall_tau(&ratio, &results.variance)?,
                ratio_vs_autocorrelation: kendall_tau(&ratio, &results.autocorrelation)?,
                ei_ratio: ratio,
                warning,
            });
        }

        let causal_emergence = causal_emergence_events(
            params,
            results
                .scales
                .iter()
                .map(|s| (s.block_size, s.ei_micro.as_slice(), s.ei_macro.as_slice())),
        )?;

        info!(
            critical_point,
            variance_trigger = ?variance.trigger.map(|t| t.parameter),
            autocorrelation_trigger = ?autocorrelation.trigger.map(|t| t.parameter),
            emergence_events = causal_emergence.count,
            "early-warning analysis done"
        );

        Ok(Self {
            critical_point,
            direction,
            variance_vs_autocorrelation,
            variance,
            autocorrelation,
            scales,
            causal_emergence,
        })
    }

    /// Every indicator, standard ones first
    pub fn warnings(&self) -> impl Iterator<Item = &IndicatorWarning> {
        [&self.variance, &self.autocorrelation]
            .into_iter()
            .chain(self.scales.iter().map(|s| &s.warning))
    }

    /// Indicator with the largest positive threshold lead time
    pub fn earliest_warning(&self) -> Option<&IndicatorWarning> {
        self.warnings()
            .filter(|w| w.is_early())
            .max_by(|a, b| {
                let la = a.lead_time.unwrap_or(f64::NEG_INFINITY);
                let lb = b.lead_time.unwrap_or(f64::NEG_INFINITY);
                la.total_cmp(&lb)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sweep::{ScaleSeries, SystemKind};
    use approx::assert_abs_diff_eq;

    /// Synthetic sweep: indicators rise from index 6, critical point at 2.0
    fn synthetic() -> SweepResults {
        let parameters: Vec<f64> = (0..11).map(|i| 1.0 + 0.1 * i as f64).collect();
        let variance = vec![1.0, 1.1, 0.9, 1.0, 1.05, 0.95, 1.6, 2.5, 3.5, 5.0, 7.0];
        let autocorrelation = vec![0.2, 0.22, 0.18, 0.2, 0.21, 0.19, 0.3, 0.45, 0.6, 0.75, 0.9];
        let ei_micro = vec![0.5; 11];
        let ei_macro = vec![0.25, 0.26, 0.24, 0.25, 0.25, 0.25, 0.4, 0.55, 0.7, 0.4, 0.3];
        SweepResults {
            system: SystemKind::Ising,
            parameters,
            critical_point: 2.0,
            mean_order: vec![0.9; 11],
            variance,
            autocorrelation,
            ei_micro: ei_micro.clone(),
            scales: vec![ScaleSeries {
                block_size: 2,
                ei_micro,
                ei_macro,
                n_transitions: vec![100; 11],
                n_rows_micro: vec![16; 11],
                n_rows_macro: vec![16; 11],
            }],
        }
    }

    #[test]
    fn test_report_triggers_and_lead_times() {
        let results = synthetic();
        let config = AnalysisConfig::with_baseline(1.0, 1.55).unwrap();
        let report = EarlyWarningReport::analyze(&results, &config).unwrap();

        assert_eq!(report.direction, SweepDirection::Ascending);
        let trigger = report.variance.trigger.unwrap();
        assert_eq!(trigger.index, 6);
        assert_abs_diff_eq!(report.variance.lead_time.unwrap(), 0.4, epsilon = 1e-9);
        assert!(report.variance.is_early());
        assert_eq!(report.autocorrelation.trigger.unwrap().index, 6);

        let tau = report.variance_vs_autocorrelation.unwrap();
        assert_abs_diff_eq!(tau.tau, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_report_ei_ratio_and_emergence() {
        let results = synthetic();
        let config = AnalysisConfig::with_baseline(1.0, 1.55).unwrap();
        let report = EarlyWarningReport::analyze(&results, &config).unwrap();

        let scale = &report.scales[0];
        assert_eq!(scale.ei_ratio.len(), 11);
        assert_abs_diff_eq!(scale.ei_ratio[8], 1.4, epsilon = 1e-12);
        assert_eq!(scale.warning.trigger.unwrap().index, 6);
        assert!(scale.ratio_vs_variance.is_some());

        // Only index 7 (0.55) and 8 (0.7) beat micro EI 0.5
        assert_eq!(report.causal_emergence.count, 2);
        assert_eq!(report.causal_emergence.points(), vec![7, 8]);

        assert_eq!(report.warnings().count(), 3);
        assert!(report.earliest_warning().is_some());
    }

    #[test]
    fn test_critical_point_override() {
        let results = synthetic();
        let config = AnalysisConfig {
            critical_point: Some(1.5),
            ..AnalysisConfig::with_baseline(1.0, 1.55).unwrap()
        };
        let report = EarlyWarningReport::analyze(&results, &config).unwrap();
        assert!(report.variance.lead_time.unwrap() < 0.0);
        assert!(report.earliest_warning().is_none());
    }

    #[test]
    fn test_baseline_outside_sweep_is_an_error() {
        let config = AnalysisConfig::with_baseline(5.0, 6.0).unwrap();
        assert!(EarlyWarningReport::analyze(&synthetic(), &config).is_err());
    }
}
