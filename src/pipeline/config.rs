//! Sweep configurations.

use serde::{Deserialize, Serialize};

use crate::coarse::MAX_STATES;
use crate::error::{invalid, Result};
use crate::systems::{onsager_critical_temperature, InitialState, IsingDynamics};

/// Largest sweep grid `linspace_inclusive` will build
pub const MAX_GRID_POINTS: usize = 100_000;

/// `start, start + step, ...` up to and including `stop`
///
/// The point count is rounded, so accumulated float error in
/// `(stop - start) / step` never drops the last value.
pub fn linspace_inclusive(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite()) || step == 0.0 {
        return Err(invalid(format!("invalid grid {start}..={stop} step {step}")));
    }
    let span = (stop - start) / step;
    if span < -1e-9 {
        return Err(invalid(format!("step {step} does not lead from {start} to {stop}")));
    }
    if !span.is_finite() || span.round() >= MAX_GRID_POINTS as f64 {
        return Err(invalid(format!(
            "step {step} from {start} to {stop} exceeds {MAX_GRID_POINTS} points"
        )));
    }
    let n = span.round() as usize + 1;
    Ok((0..n).map(|i| start + i as f64 * step).collect())
}

fn check_grid(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(invalid(format!("{name} grid is empty")));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(invalid(format!("{name} grid contains {bad}")));
    }
    Ok(())
}

fn check_min_observations(min_observations: f64) -> Result<()> {
    if !min_observations.is_finite() || min_observations < 0.0 {
        return Err(invalid(format!(
            "min_observations must be finite and non-negative, got {min_observations}"
        )));
    }
    Ok(())
}

/// Temperature sweep of the 2D Ising model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingSweepConfig {
    /// Temperatures in sweep order
    pub temperatures: Vec<f64>,
    /// Lattice side L
    pub size: usize,
    /// Patch side p for state encoding (2^(p²) states)
    pub patch_size: usize,
    /// Majority-vote block sides for the macro scales
    pub block_sizes: Vec<usize>,
    pub n_steps: usize,
    pub n_equilib: usize,
    pub dynamics: IsingDynamics,
    pub initial_state: InitialState,
    /// Sweep point i is simulated with seed `base_seed + i`
    pub base_seed: u64,
    /// Rows with fewer real transitions are left out of EI
    pub min_observations: f64,
    /// Compare scales on equal transition counts
    pub equalize: bool,
}

impl Default for IsingSweepConfig {
    fn default() -> Self {
        Self {
            temperatures: (0..31).map(|i| 1.5 + 0.05 * i as f64).collect(),
            size: 32,
            patch_size: 2,
            block_sizes: vec![2],
            n_steps: 200,
            n_equilib: 500,
            dynamics: IsingDynamics::Metropolis,
            initial_state: InitialState::Ordered,
            base_seed: 42,
            min_observations: 5.0,
            equalize: true,
        }
    }
}

impl IsingSweepConfig {
    pub fn validate(&self) -> Result<()> {
        check_grid("temperature", &self.temperatures)?;
        if let Some(bad) = self.temperatures.iter().find(|&&t| t <= 0.0) {
            return Err(invalid(format!("temperature must be positive, got {bad}")));
        }
        if self.size == 0 || self.patch_size == 0 {
            return Err(invalid("lattice and patch sizes must be positive"));
        }
        if self.size % self.patch_size != 0 {
            return Err(invalid(format!(
                "patch size {} does not divide lattice size {}",
                self.patch_size, self.size
            )));
        }
        if self.patch_size * self.patch_size > MAX_STATES.trailing_zeros() as usize {
            return Err(invalid(format!(
                "patch size {} gives more than {MAX_STATES} states",
                self.patch_size
            )));
        }
        if self.block_sizes.is_empty() {
            return Err(invalid("need at least one block size"));
        }
        for &b in &self.block_sizes {
            if b == 0 || self.size % b != 0 {
                return Err(invalid(format!("block size {b} does not divide lattice size {}", self.size)));
            }
            if (self.size / b) % self.patch_size != 0 {
                return Err(invalid(format!(
                    "patch size {} does not divide coarse lattice size {} (block {b})",
                    self.patch_size,
                    self.size / b
                )));
            }
        }
        if self.n_steps < 2 {
            return Err(invalid("n_steps must be at least 2 to form transitions"));
        }
        check_min_observations(self.min_observations)
    }

    /// Onsager T_c
    pub fn critical_point(&self) -> f64 {
        onsager_critical_temperature()
    }
}

/// Coupling sweep of the noisy Kuramoto model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KuramotoSweepConfig {
    /// Couplings K in sweep order
    pub couplings: Vec<f64>,
    pub n_oscillators: usize,
    /// Std of the Gaussian natural frequencies
    pub freq_spread: f64,
    /// Disjoint oscillator triplets encoded at every scale
    pub n_triplets: usize,
    /// Phase bins k (k³ states)
    pub n_bins: usize,
    /// Oscillators merged by circular mean for each macro scale
    pub group_sizes: Vec<usize>,
    pub n_steps: usize,
    pub n_equilib: usize,
    pub dt: f64,
    pub noise: f64,
    /// Frequencies and triplets come from `base_seed`, point i from `base_seed + i`
    pub base_seed: u64,
    pub min_observations: f64,
    pub equalize: bool,
}

impl Default for KuramotoSweepConfig {
    fn default() -> Self {
        Self {
            couplings: (0..21).map(|i| 0.1 * i as f64).collect(),
            n_oscillators: 96,
            freq_spread: 0.5,
            n_triplets: 8,
            n_bins: 4,
            group_sizes: vec![2, 4],
            n_steps: 500,
            n_equilib: 2000,
            dt: 0.05,
            noise: 0.1,
            base_seed: 42,
            min_observations: 5.0,
            equalize: true,
        }
    }
}

impl KuramotoSweepConfig {
    pub fn validate(&self) -> Result<()> {
        check_grid("coupling", &self.couplings)?;
        if let Some(bad) = self.couplings.iter().find(|&&k| k < 0.0) {
            return Err(invalid(format!("coupling must be non-negative, got {bad}")));
        }
        if !self.freq_spread.is_finite() || self.freq_spread <= 0.0 {
            return Err(invalid(format!("frequency spread must be positive, got {}", self.freq_spread)));
        }
        if self.n_triplets == 0 || 3 * self.n_triplets > self.n_oscillators {
            return Err(invalid(format!(
                "{} triplets need {} oscillators, have {}",
                self.n_triplets,
                3 * self.n_triplets,
                self.n_oscillators
            )));
        }
        if self.group_sizes.is_empty() {
            return Err(invalid("need at least one group size"));
        }
        for &g in &self.group_sizes {
            if g == 0 || self.n_oscillators % g != 0 {
                return Err(invalid(format!(
                    "group size {g} does not divide {} oscillators",
                    self.n_oscillators
                )));
            }
            if 3 * self.n_triplets > self.n_oscillators / g {
                return Err(invalid(format!(
                    "{} triplets need {} oscillators, group size {g} leaves {}",
                    self.n_triplets,
                    3 * self.n_triplets,
                    self.n_oscillators / g
                )));
            }
        }
        if self.n_steps < 2 {
            return Err(invalid("n_steps must be at least 2 to form transitions"));
        }
        check_min_observations(self.min_observations)
    }

    /// K_c for the Gaussian frequency distribution
    pub fn critical_point(&self) -> f64 {
        crate::systems::gaussian_critical_coupling(self.freq_spread)
    }
}
