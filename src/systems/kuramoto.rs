//! Kuramoto Model: Noisy Coupled Oscillator Synchronization
//!
//! N phase oscillators θᵢ with natural frequencies ωᵢ:
//!
//!   dθᵢ = [ωᵢ + (K/N) Σⱼ sin(θⱼ - θᵢ)] dt + D dWᵢ
//!
//! where K is the coupling strength and D the phase-noise amplitude.
//! With r·e^{iψ} = (1/N) Σⱼ e^{iθⱼ} the coupling term equals
//! K·r·sin(ψ - θᵢ), which is how it is evaluated (O(N) per step).
//!
//! ## Phase Transition
//!
//! For Gaussian frequencies of std σ, g(0) = 1/(σ√(2π)) and
//!   K_c = 2 / (π g(0)) = σ √(8/π) ≈ 1.596 σ
//! - K < K_c: Incoherent phase (r ~ 1/√N)
//! - K > K_c: Synchronized phase (r → 1)
//!
//! Natural frequencies are drawn once per analysis and passed in, so a
//! coupling sweep compares the same oscillator population at every K.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use super::traits::{Controllable, DynamicalSystem};
use crate::error::{invalid, Result};

/// Critical coupling for Gaussian natural frequencies of std `freq_std`
pub fn gaussian_critical_coupling(freq_std: f64) -> f64 {
    freq_std * (8.0 / PI).sqrt()
}

/// Draw `n` natural frequencies ωᵢ ~ N(0, spread²)
pub fn natural_frequencies<R: Rng + ?Sized>(n: usize, spread: f64, rng: &mut R) -> Result<Array1<f64>> {
    let normal = Normal::new(0.0, spread)
        .map_err(|e| invalid(format!("frequency spread {spread}: {e}")))?;
    Ok(Array1::from_iter((0..n).map(|_| normal.sample(&mut *rng))))
}

/// Order parameter r·e^(iψ) = (1/N) Σⱼ e^(iθⱼ), returned as (r, ψ)
pub fn order_parameter_of(phases: &[f64]) -> (f64, f64) {
    if phases.is_empty() {
        return (0.0, 0.0);
    }
    let n = phases.len() as f64;
    let sum_cos: f64 = phases.iter().map(|&theta| theta.cos()).sum();
    let sum_sin: f64 = phases.iter().map(|&theta| theta.sin()).sum();

    let r = ((sum_cos / n).powi(2) + (sum_sin / n).powi(2)).sqrt();
    let psi = (sum_sin / n).atan2(sum_cos / n);
    (r, psi)
}

/// Kuramoto oscillator system
#[derive(Debug, Clone)]
pub struct KuramotoSystem {
    /// Natural frequencies
    frequencies: Array1<f64>,
    /// Current phases in [0, 2π)
    phases: Array1<f64>,
    /// Coupling strength
    coupling: f64,
    /// Integration timestep
    dt: f64,
    /// Phase-noise amplitude D
    noise: f64,
}

impl KuramotoSystem {
    /// Create a system with uniformly random initial phases
    ///
    /// # Arguments
    /// * `frequencies` - Natural frequencies ωᵢ (fixes N)
    /// * `coupling` - Coupling strength K
    /// * `dt` - Integration timestep
    /// * `noise` - Phase-noise amplitude D
    pub fn new<R: Rng + ?Sized>(
        frequencies: Array1<f64>,
        coupling: f64,
        dt: f64,
        noise: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(invalid("need at least one oscillator"));
        }
        check_coupling(coupling)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(invalid(format!("dt must be finite and positive, got {dt}")));
        }
        if !noise.is_finite() || noise < 0.0 {
            return Err(invalid(format!("noise must be finite and non-negative, got {noise}")));
        }

        let phases = Array1::from_iter((0..frequencies.len()).map(|_| rng.random::<f64>() * 2.0 * PI));

        Ok(Self {
            frequencies,
            phases,
            coupling,
            dt,
            noise,
        })
    }

    /// Euler–Maruyama step with independent Gaussian phase noise
    fn integrate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let dt = self.dt;
        let k = self.coupling;
        let diffusion = self.noise * dt.sqrt();
        let (r, psi) = self.compute_order_parameter();

        for (theta, &omega) in self.phases.iter_mut().zip(self.frequencies.iter()) {
            let xi: f64 = StandardNormal.sample(&mut *rng);
            let drift = omega + k * r * (psi - *theta).sin();
            *theta = (*theta + drift * dt + diffusion * xi).rem_euclid(2.0 * PI);
        }
    }

    fn compute_order_parameter(&self) -> (f64, f64) {
        match self.phases.as_slice() {
            Some(phases) => order_parameter_of(phases),
            None => order_parameter_of(&self.phases.to_vec()),
        }
    }

    /// Set coupling strength
    pub fn set_coupling(&mut self, coupling: f64) -> Result<()> {
        check_coupling(coupling)?;
        self.coupling = coupling;
        Ok(())
    }

    /// Get phases
    pub fn phases(&self) -> &Array1<f64> {
        &self.phases
    }
}

fn check_coupling(coupling: f64) -> Result<()> {
    if !coupling.is_finite() {
        return Err(invalid(format!("coupling must be finite, got {coupling}")));
    }
    Ok(())
}

impl DynamicalSystem for KuramotoSystem {
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.integrate(rng);
    }

    fn n_elements(&self) -> usize {
        self.phases.len()
    }

    fn order_parameter(&self) -> f64 {
        self.compute_order_parameter().0
    }
}

impl Controllable for KuramotoSystem {
    fn set_parameter(&mut self, param: f64) -> Result<()> {
        self.set_coupling(param)
    }

    fn parameter(&self) -> f64 {
        self.coupling
    }
}

/// Parameters of one oscillator simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KuramotoConfig {
    /// Coupling strength K
    pub coupling: f64,
    /// Samples to retain (one per integration step)
    pub n_steps: usize,
    /// Integration steps discarded before sampling
    pub n_equilib: usize,
    /// Integration timestep
    pub dt: f64,
    /// Phase-noise amplitude D
    pub noise: f64,
}

impl Default for KuramotoConfig {
    fn default() -> Self {
        Self {
            coupling: 1.0,
            n_steps: 500,
            n_equilib: 2000,
            dt: 0.05,
            noise: 0.1,
        }
    }
}

impl KuramotoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_steps == 0 {
            return Err(invalid("n_steps must be positive"));
        }
        check_coupling(self.coupling)?;
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(invalid(format!("dt must be finite and positive, got {}", self.dt)));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(invalid(format!("noise must be finite and non-negative, got {}", self.noise)));
        }
        Ok(())
    }
}

/// Sampled oscillator time series
#[derive(Debug, Clone)]
pub struct KuramotoTrajectory {
    /// Phases, shape (n_steps, N)
    pub phases: Array2<f64>,
    /// Order parameter r per sample, shape (n_steps,)
    pub order_parameter: Array1<f64>,
}

impl KuramotoTrajectory {
    pub fn n_steps(&self) -> usize {
        self.phases.len_of(Axis(0))
    }

    pub fn mean_order_parameter(&self) -> f64 {
        self.order_parameter.mean().unwrap_or(0.0)
    }
}

/// Simulate with a fresh generator seeded from `seed`
pub fn simulate_kuramoto(
    config: &KuramotoConfig,
    frequencies: &Array1<f64>,
    seed: u64,
) -> Result<KuramotoTrajectory> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_kuramoto_with_rng(config, frequencies, &mut rng)
}

/// Integrate `n_equilib` steps, then record phases and r at every step
pub fn simulate_kuramoto_with_rng<R: Rng + ?Sized>(
    config: &KuramotoConfig,
    frequencies: &Array1<f64>,
    rng: &mut R,
) -> Result<KuramotoTrajectory> {
    config.validate()?;

    let mut system = KuramotoSystem::new(frequencies.clone(), config.coupling, config.dt, config.noise, rng)?;
    system.run(config.n_equilib, rng);

    let n = system.n_elements();
    let mut phases = Array2::zeros((config.n_steps, n));
    let mut order_parameter = Array1::zeros(config.n_steps);

    for t in 0..config.n_steps {
        system.step(rng);
        phases.index_axis_mut(Axis(0), t).assign(system.phases());
        order_parameter[t] = system.order_parameter();
    }

    debug!(
        n_oscillators = n,
        coupling = config.coupling,
        mean_r = order_parameter.mean().unwrap_or(0.0),
        "kuramoto trajectory sampled"
    );

    Ok(KuramotoTrajectory {
        phases,
        order_parameter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frequencies(n: usize, spread: f64, seed: u64) -> Array1<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        natural_frequencies(n, spread, &mut rng).unwrap()
    }

    #[test]
    fn test_kuramoto_initialization() {
        let mut rng = StdRng::seed_from_u64(1);
        let system = KuramotoSystem::new(frequencies(100, 0.5, 0), 1.0, 0.05, 0.1, &mut rng).unwrap();
        assert_eq!(system.n_elements(), 100);
        let r = system.order_parameter();
        assert!((0.0..=1.0).contains(&r));
        assert!(system.phases().iter().all(|&p| (0.0..2.0 * PI).contains(&p)));
    }

    #[test]
    fn test_order_parameter_aligned() {
        let (r, psi) = order_parameter_of(&[0.3; 10]);
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(psi, 0.3, epsilon = 1e-12);

        let (r, _) = order_parameter_of(&[0.0, PI]);
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kuramoto_synchronization() {
        let config = KuramotoConfig {
            coupling: 4.0,
            n_steps: 200,
            ..KuramotoConfig::default()
        };
        let traj = simulate_kuramoto(&config, &frequencies(100, 0.5, 2), 7).unwrap();
        let r = traj.mean_order_parameter();
        assert!(r > 0.8, "Expected synchronization, got r = {}", r);
    }

    #[test]
    fn test_kuramoto_incoherent() {
        let config = KuramotoConfig {
            coupling: 0.1,
            n_steps: 200,
            ..KuramotoConfig::default()
        };
        let traj = simulate_kuramoto(&config, &frequencies(100, 0.5, 2), 7).unwrap();
        let r = traj.mean_order_parameter();
        assert!(r < 0.4, "Expected incoherence, got r = {}", r);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let config = KuramotoConfig {
            n_steps: 50,
            n_equilib: 20,
            ..KuramotoConfig::default()
        };
        let omega = frequencies(30, 0.5, 4);
        let a = simulate_kuramoto(&config, &omega, 11).unwrap();
        let b = simulate_kuramoto(&config, &omega, 11).unwrap();
        assert_eq!(a.phases, b.phases);
        assert_eq!(a.order_parameter, b.order_parameter);
        assert_eq!(a.phases.dim(), (50, 30));
    }

    #[test]
    fn test_invalid_parameters() {
        let omega = frequencies(10, 0.5, 0);
        let bad = KuramotoConfig {
            n_steps: 0,
            ..KuramotoConfig::default()
        };
        assert!(simulate_kuramoto(&bad, &omega, 0).is_err());
        let bad = KuramotoConfig {
            dt: 0.0,
            ..KuramotoConfig::default()
        };
        assert!(simulate_kuramoto(&bad, &omega, 0).is_err());
        assert!(simulate_kuramoto(&KuramotoConfig::default(), &Array1::zeros(0), 0).is_err());
    }

    #[test]
    fn test_set_coupling() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut system = KuramotoSystem::new(frequencies(20, 0.5, 1), 0.5, 0.05, 0.1, &mut rng).unwrap();
        system.set_parameter(2.5).unwrap();
        assert_eq!(system.parameter(), 2.5);
        assert!(system.set_parameter(f64::NAN).is_err());
        assert_eq!(system.parameter(), 2.5);
    }

    #[test]
    fn test_critical_coupling() {
        assert_abs_diff_eq!(gaussian_critical_coupling(1.0), 1.5957691, epsilon = 1e-6);
    }
}
