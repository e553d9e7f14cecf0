//! Control-parameter sweeps: simulate → encode → estimate → EI at every point.
//!
//! Each sweep point owns a fresh generator seeded with
//! `base_seed.wrapping_add(index)`, so points are independent and can be
//! recomputed in isolation. A point whose statistics are degenerate still
//! contributes (EI = 0.0) and the output stays index-aligned.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{IsingSweepConfig, KuramotoSweepConfig};
use crate::analysis::SeriesIndicators;
use crate::coarse::{coarsegrain, coarsegrain_phases, to_patch_states, PhaseEncoder};
use crate::error::Result;
use crate::information::{compute_ei_equalized, EqualizedEi, TransitionSample};
use crate::systems::{
    natural_frequencies, simulate_ising_with_rng, simulate_kuramoto_with_rng, IsingConfig,
    KuramotoConfig,
};

/// Which reference system produced a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemKind {
    Ising,
    Kuramoto,
}

/// Micro vs macro EI at one coarse-graining scale, across the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSeries {
    /// Block side (lattice) or group size (oscillators)
    pub block_size: usize,
    pub ei_micro: Vec<f64>,
    pub ei_macro: Vec<f64>,
    /// Transitions behind each EI pair
    pub n_transitions: Vec<usize>,
    pub n_rows_micro: Vec<usize>,
    pub n_rows_macro: Vec<usize>,
}

impl ScaleSeries {
    fn new(block_size: usize, capacity: usize) -> Self {
        Self {
            block_size,
            ei_micro: Vec::with_capacity(capacity),
            ei_macro: Vec::with_capacity(capacity),
            n_transitions: Vec::with_capacity(capacity),
            n_rows_micro: Vec::with_capacity(capacity),
            n_rows_macro: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, ei: &EqualizedEi) {
        self.ei_micro.push(ei.ei_micro);
        self.ei_macro.push(ei.ei_macro);
        self.n_transitions.push(ei.n_transitions_used);
        self.n_rows_micro.push(ei.n_rows_micro);
        self.n_rows_macro.push(ei.n_rows_macro);
    }
}

/// Everything recorded over one sweep, indexed by sweep position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    pub system: SystemKind,
    /// Control parameter (temperature or coupling) in sweep order
    pub parameters: Vec<f64>,
    /// Theoretical critical parameter of the system
    pub critical_point: f64,
    /// Mean |m| (Ising) or mean r (Kuramoto)
    pub mean_order: Vec<f64>,
    pub variance: Vec<f64>,
    pub autocorrelation: Vec<f64>,
    /// Micro EI on the full, unsubsampled transition stream
    pub ei_micro: Vec<f64>,
    pub scales: Vec<ScaleSeries>,
}

impl SweepResults {
    fn new(system: SystemKind, parameters: &[f64], critical_point: f64, scale_sizes: &[usize]) -> Self {
        let n = parameters.len();
        Self {
            system,
            parameters: parameters.to_vec(),
            critical_point,
            mean_order: Vec::with_capacity(n),
            variance: Vec::with_capacity(n),
            autocorrelation: Vec::with_capacity(n),
            ei_micro: Vec::with_capacity(n),
            scales: scale_sizes.iter().map(|&b| ScaleSeries::new(b, n)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    fn push_indicators(&mut self, series: &[f64]) {
        let indicators = SeriesIndicators::from_series(series);
        self.mean_order.push(indicators.mean);
        self.variance.push(indicators.variance);
        self.autocorrelation.push(indicators.autocorrelation);
    }
}

/// Micro/macro EI at one scale, equalized or on the raw streams
fn measure_scale<R: Rng + ?Sized>(
    micro: &TransitionSample,
    macro_scale: &TransitionSample,
    min_observations: f64,
    equalize: bool,
    rng: &mut R,
) -> Result<EqualizedEi> {
    if equalize {
        return compute_ei_equalized(micro, macro_scale, min_observations, rng);
    }
    let tm_micro = micro.estimate()?;
    let tm_macro = macro_scale.estimate()?;
    Ok(EqualizedEi {
        ei_micro: tm_micro.effective_information(min_observations)?,
        ei_macro: tm_macro.effective_information(min_observations)?,
        n_transitions_used: macro_scale.len(),
        n_rows_micro: tm_micro.rows_observed(min_observations),
        n_rows_macro: tm_macro.rows_observed(min_observations),
    })
}

fn log_scale(parameter: f64, block_size: usize, ei: &EqualizedEi) {
    debug!(
        parameter,
        block_size,
        ei_micro = ei.ei_micro,
        ei_macro = ei.ei_macro,
        n_transitions = ei.n_transitions_used,
        rows_micro = ei.n_rows_micro,
        rows_macro = ei.n_rows_macro,
        "scale measured"
    );
    if ei.n_rows_macro < 2 {
        warn!(
            parameter,
            block_size,
            rows_macro = ei.n_rows_macro,
            "macro scale too sparse, EI is uninformative"
        );
    }
}

/// Sweep temperature through the Ising transition
pub fn run_ising_sweep(config: &IsingSweepConfig) -> Result<SweepResults> {
    config.validate()?;
    info!(
        n_points = config.temperatures.len(),
        size = config.size,
        patch_size = config.patch_size,
        block_sizes = ?config.block_sizes,
        dynamics = ?config.dynamics,
        "starting ising sweep"
    );

    let mut results = SweepResults::new(
        SystemKind::Ising,
        &config.temperatures,
        config.critical_point(),
        &config.block_sizes,
    );

    for (index, &temperature) in config.temperatures.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(config.base_seed.wrapping_add(index as u64));
        let point = IsingConfig {
            size: config.size,
            temperature,
            n_steps: config.n_steps,
            n_equilib: config.n_equilib,
            dynamics: config.dynamics,
            initial_state: config.initial_state,
        };
        let trajectory = simulate_ising_with_rng(&point, &mut rng)?;

        let micro = TransitionSample::from_patch_states(&to_patch_states(&trajectory.configs, config.patch_size)?);
        let ei_micro = micro.estimate()?.effective_information(config.min_observations)?;
        results.ei_micro.push(ei_micro);

        for (scale, &block_size) in results.scales.iter_mut().zip(&config.block_sizes) {
            let coarse = coarsegrain(&trajectory.configs, block_size)?;
            let macro_scale = TransitionSample::from_patch_states(&to_patch_states(&coarse, config.patch_size)?);
            let ei = measure_scale(&micro, &macro_scale, config.min_observations, config.equalize, &mut rng)?;
            log_scale(temperature, block_size, &ei);
            scale.push(&ei);
        }

        let magnetization = trajectory.magnetization.to_vec();
        results.push_indicators(&magnetization);
        debug!(index, temperature, ei_micro, "sweep point done");
    }

    info!(n_points = results.len(), "ising sweep finished");
    Ok(results)
}

/// Sweep coupling through the Kuramoto synchronization transition
///
/// Natural frequencies and oscillator triplets are drawn once from
/// `base_seed` and shared by every point, so only K changes along the sweep.
pub fn run_kuramoto_sweep(config: &KuramotoSweepConfig) -> Result<SweepResults> {
    config.validate()?;
    info!(
        n_points = config.couplings.len(),
        n_oscillators = config.n_oscillators,
        n_triplets = config.n_triplets,
        n_bins = config.n_bins,
        group_sizes = ?config.group_sizes,
        "starting kuramoto sweep"
    );

    let mut setup_rng = StdRng::seed_from_u64(config.base_seed);
    let frequencies = natural_frequencies(config.n_oscillators, config.freq_spread, &mut setup_rng)?;
    let micro_encoder =
        PhaseEncoder::random(config.n_oscillators, config.n_triplets, config.n_bins, &mut setup_rng)?;
    let macro_encoders = config
        .group_sizes
        .iter()
        .map(|&g| PhaseEncoder::random(config.n_oscillators / g, config.n_triplets, config.n_bins, &mut setup_rng))
        .collect::<Result<Vec<_>>>()?;

    let mut results = SweepResults::new(
        SystemKind::Kuramoto,
        &config.couplings,
        config.critical_point(),
        &config.group_sizes,
    );

    for (index, &coupling) in config.couplings.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(config.base_seed.wrapping_add(index as u64));
        let point = KuramotoConfig {
            coupling,
            n_steps: config.n_steps,
            n_equilib: config.n_equilib,
            dt: config.dt,
            noise: config.noise,
        };
        let trajectory = simulate_kuramoto_with_rng(&point, &frequencies, &mut rng)?;

        let micro = TransitionSample::from_patch_states(&micro_encoder.encode(&trajectory.phases)?);
        let ei_micro = micro.estimate()?.effective_information(config.min_observations)?;
        results.ei_micro.push(ei_micro);

        for ((scale, &group_size), encoder) in results
            .scales
            .iter_mut()
            .zip(&config.group_sizes)
            .zip(&macro_encoders)
        {
            let grouped: Array2<f64> = coarsegrain_phases(&trajectory.phases, group_size)?;
            let macro_scale = TransitionSample::from_patch_states(&encoder.encode(&grouped)?);
            let ei = measure_scale(&micro, &macro_scale, config.min_observations, config.equalize, &mut rng)?;
            log_scale(coupling, group_size, &ei);
            scale.push(&ei);
        }

        let r = trajectory.order_parameter.to_vec();
        results.push_indicators(&r);
        debug!(index, coupling, ei_micro, "sweep point done");
    }

    info!(n_points = results.len(), "kuramoto sweep finished");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_ising() -> IsingSweepConfig {
        IsingSweepConfig {
            temperatures: vec![1.5, 2.27, 3.5],
            size: 8,
            n_steps: 40,
            n_equilib: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_ising_sweep_is_index_aligned() {
        let results = run_ising_sweep(&small_ising()).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results.ei_micro.len(), 3);
        assert_eq!(results.variance.len(), 3);
        assert_eq!(results.scales.len(), 1);
        let scale = &results.scales[0];
        assert_eq!(scale.block_size, 2);
        assert_eq!(scale.ei_macro.len(), 3);
        assert!(scale.ei_micro.iter().chain(&scale.ei_macro).all(|&ei| ei >= 0.0));
        // 8x8 → 4x4 coarse → 4 patches x 39 transitions
        assert!(scale.n_transitions.iter().all(|&n| n == 4 * 39));
    }

    #[test]
    fn test_ising_sweep_reproducible() {
        let config = small_ising();
        assert_eq!(run_ising_sweep(&config).unwrap(), run_ising_sweep(&config).unwrap());
    }

    #[test]
    fn test_ising_sweep_rejects_bad_config() {
        let config = IsingSweepConfig {
            block_sizes: vec![3],
            ..small_ising()
        };
        assert!(run_ising_sweep(&config).is_err());
    }

    #[test]
    fn test_unequalized_uses_full_streams() {
        let config = IsingSweepConfig {
            equalize: false,
            ..small_ising()
        };
        let results = run_ising_sweep(&config).unwrap();
        assert_eq!(results.scales[0].ei_micro, results.ei_micro);
    }

    #[test]
    fn test_kuramoto_sweep_shapes() {
        let config = KuramotoSweepConfig {
            couplings: vec![0.0, 1.0, 3.0],
            n_oscillators: 24,
            n_triplets: 2,
            n_bins: 3,
            group_sizes: vec![2, 4],
            n_steps: 60,
            n_equilib: 100,
            ..Default::default()
        };
        let results = run_kuramoto_sweep(&config).unwrap();
        assert_eq!(results.system, SystemKind::Kuramoto);
        assert_eq!(results.scales.len(), 2);
        assert_eq!(results.scales[1].block_size, 4);
        assert!(results.mean_order.iter().all(|&r| (0.0..=1.0).contains(&r)));
        assert!(results.mean_order[2] > results.mean_order[0]);
        assert!(results.scales[0].n_transitions.iter().all(|&n| n == 2 * 59));
    }
}
