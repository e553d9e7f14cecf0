//! Ising Model: Binary Spins on a Periodic Square Lattice
//!
//! The ferromagnetic Ising model on an L×L lattice:
//!   H = -J Σ<ij> sᵢ sⱼ,   sᵢ ∈ {-1, +1}
//!
//! ## Phase Transition
//!
//! For J=1 the exact (Onsager) critical temperature is
//!   T_c = 2 / ln(1 + √2) ≈ 2.269
//! - T < T_c: Ordered phase, |m| → 1
//! - T > T_c: Disordered phase, |m| → 0
//!
//! ## Dynamics
//!
//! Two interchangeable update rules:
//! - **Metropolis**: L² single-spin-flip attempts per sweep. Because every
//!   site has 4 neighbours, ΔE ∈ {-8,-4,0,4,8} and the acceptance factors
//!   are a 5-entry lookup ([`BoltzmannTable`]).
//! - **Wolff**: grow a cluster of aligned spins from a random seed, adding
//!   each aligned neighbour with p_add = 1 - exp(-2J/T), then flip it whole.
//!   Near T_c this removes most of the critical slowing down that plagues
//!   single-spin dynamics.

use ndarray::{Array1, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{Controllable, DynamicalSystem};
use crate::error::{invalid, Result};

/// Ferromagnetic coupling constant
pub const COUPLING_J: f64 = 1.0;

/// Metropolis sweeps between retained samples
pub const SWEEPS_PER_SAMPLE: usize = 10;

/// Exact critical temperature of the square-lattice model (J=1)
pub fn onsager_critical_temperature() -> f64 {
    2.0 * COUPLING_J / (1.0 + 2.0_f64.sqrt()).ln()
}

/// Update rule for the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsingDynamics {
    /// Single-spin flips, one sweep = L² attempts
    #[default]
    Metropolis,
    /// One cluster flip per step
    Wolff,
}

impl IsingDynamics {
    /// Elementary steps between two retained samples
    pub fn steps_per_sample(self) -> usize {
        match self {
            IsingDynamics::Metropolis => SWEEPS_PER_SAMPLE,
            IsingDynamics::Wolff => 1,
        }
    }
}

/// Starting configuration of the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialState {
    /// All spins +1 (cold start)
    #[default]
    Ordered,
    /// Independent uniform ±1 (hot start)
    Random,
}

/// Metropolis acceptance factors min(1, exp(-ΔE/T)) for one temperature
///
/// Built per temperature and owned by the model that uses it; never cached
/// globally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltzmannTable {
    temperature: f64,
    acceptance: [f64; 5],
}

impl BoltzmannTable {
    /// Tabulate acceptance for ΔE = -8, -4, 0, 4, 8
    pub fn new(temperature: f64) -> Self {
        let mut acceptance = [1.0; 5];
        for (k, slot) in acceptance.iter_mut().enumerate() {
            let delta_e = 4.0 * k as f64 - 8.0;
            *slot = (-delta_e * COUPLING_J / temperature).exp().min(1.0);
        }
        Self {
            temperature,
            acceptance,
        }
    }

    /// Acceptance probability min(1, exp(-ΔE/T))
    ///
    /// Tabulated for ΔE ∈ {-8,-4,0,4,8}; any other ΔE is evaluated directly.
    pub fn acceptance(&self, delta_e: i32) -> f64 {
        match delta_e {
            -8 | -4 | 0 | 4 | 8 => self.acceptance[((delta_e + 8) / 4) as usize],
            _ => (-(delta_e as f64) * COUPLING_J / self.temperature).exp().min(1.0),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Probability that an aligned neighbour joins a Wolff cluster
pub fn wolff_add_probability(temperature: f64) -> f64 {
    1.0 - (-2.0 * COUPLING_J / temperature).exp()
}

fn check_temperature(temperature: f64) -> Result<()> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(invalid(format!(
            "temperature must be finite and positive, got {temperature}"
        )));
    }
    Ok(())
}

/// Ising model on an L×L periodic lattice
#[derive(Debug, Clone)]
pub struct IsingModel {
    /// Lattice size (L x L)
    size: usize,
    /// Spins ±1
    spins: Array2<i8>,
    /// Temperature (control parameter)
    temperature: f64,
    /// Update rule
    dynamics: IsingDynamics,
    /// Metropolis lookup for the current temperature
    boltzmann: BoltzmannTable,
    /// Wolff bond probability for the current temperature
    p_add: f64,
    /// Wolff frontier, reused between steps
    stack: Vec<usize>,
}

impl IsingModel {
    /// Create a lattice at temperature `temperature`
    ///
    /// A random start consumes L² draws from `rng`; an ordered start none.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        temperature: f64,
        dynamics: IsingDynamics,
        initial: InitialState,
        rng: &mut R,
    ) -> Result<Self> {
        if size == 0 {
            return Err(invalid("lattice size must be positive"));
        }
        check_temperature(temperature)?;

        let spins = match initial {
            InitialState::Ordered => Array2::from_elem((size, size), 1i8),
            InitialState::Random => {
                Array2::from_shape_simple_fn((size, size), || if rng.random::<bool>() { 1 } else { -1 })
            }
        };

        Ok(Self {
            size,
            spins,
            temperature,
            dynamics,
            boltzmann: BoltzmannTable::new(temperature),
            p_add: wolff_add_probability(temperature),
            stack: Vec::new(),
        })
    }

    /// Set temperature and rebuild the acceptance tables
    pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        check_temperature(temperature)?;
        self.temperature = temperature;
        self.boltzmann = BoltzmannTable::new(temperature);
        self.p_add = wolff_add_probability(temperature);
        Ok(())
    }

    /// Current spins
    pub fn spins(&self) -> &Array2<i8> {
        &self.spins
    }

    /// Absolute magnetization per spin |Σ s| / N
    pub fn magnetization(&self) -> f64 {
        let total: i64 = self.spins.iter().map(|&s| s as i64).sum();
        total.unsigned_abs() as f64 / (self.size * self.size) as f64
    }

    /// Energy per spin, counting each bond once
    pub fn energy_per_spin(&self) -> f64 {
        let l = self.size;
        let mut energy = 0i64;
        for i in 0..l {
            for j in 0..l {
                let s = self.spins[[i, j]] as i64;
                let right = self.spins[[i, (j + 1) % l]] as i64;
                let down = self.spins[[(i + 1) % l, j]] as i64;
                energy -= s * (right + down);
            }
        }
        COUPLING_J * energy as f64 / (l * l) as f64
    }

    /// Sum of the four periodic neighbours of (i, j)
    fn neighbor_sum(&self, i: usize, j: usize) -> i32 {
        let l = self.size;
        self.spins[[(i + l - 1) % l, j]] as i32
            + self.spins[[(i + 1) % l, j]] as i32
            + self.spins[[i, (j + l - 1) % l]] as i32
            + self.spins[[i, (j + 1) % l]] as i32
    }

    /// Periodic neighbours of a flat site index (up, down, left, right)
    fn neighbors(&self, site: usize) -> [usize; 4] {
        let l = self.size;
        let (i, j) = (site / l, site % l);
        [
            ((i + l - 1) % l) * l + j,
            ((i + 1) % l) * l + j,
            i * l + (j + l - 1) % l,
            i * l + (j + 1) % l,
        ]
    }

    /// One Metropolis sweep: L² single-spin-flip attempts
    fn metropolis_sweep<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let l = self.size;

        for _ in 0..(l * l) {
            let i = rng.random_range(0..l);
            let j = rng.random_range(0..l);

            let s = self.spins[[i, j]] as i32;
            let delta_e = 2 * s * self.neighbor_sum(i, j);

            if delta_e <= 0 || rng.random::<f64>() < self.boltzmann.acceptance(delta_e) {
                self.spins[[i, j]] = -self.spins[[i, j]];
            }
        }
    }

    /// Grow and flip one Wolff cluster; returns the cluster size
    ///
    /// Sites are flipped as they join, so "aligned with the seed" doubles as
    /// the not-yet-visited test.
    fn wolff_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let l = self.size;
        let seed = rng.random_range(0..l * l);
        let seed_spin = self.spins[[seed / l, seed % l]];

        self.spins[[seed / l, seed % l]] = -seed_spin;
        self.stack.clear();
        self.stack.push(seed);
        let mut cluster_size = 1;

        while let Some(site) = self.stack.pop() {
            for neighbor in self.neighbors(site) {
                let (ni, nj) = (neighbor / l, neighbor % l);
                if self.spins[[ni, nj]] == seed_spin && rng.random::<f64>() < self.p_add {
                    self.spins[[ni, nj]] = -seed_spin;
                    self.stack.push(neighbor);
                    cluster_size += 1;
                }
            }
        }

        cluster_size
    }
}

impl DynamicalSystem for IsingModel {
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.dynamics {
            IsingDynamics::Metropolis => self.metropolis_sweep(rng),
            IsingDynamics::Wolff => {
                self.wolff_step(rng);
            }
        }
    }

    fn n_elements(&self) -> usize {
        self.size * self.size
    }

    fn order_parameter(&self) -> f64 {
        self.magnetization()
    }
}

impl Controllable for IsingModel {
    fn set_parameter(&mut self, param: f64) -> Result<()> {
        self.set_temperature(param)
    }

    fn parameter(&self) -> f64 {
        self.temperature
    }
}

/// Parameters of one lattice simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsingConfig {
    /// Lattice side L
    pub size: usize,
    /// Temperature T
    pub temperature: f64,
    /// Samples to retain
    pub n_steps: usize,
    /// Steps discarded before sampling (sweeps or clusters)
    pub n_equilib: usize,
    pub dynamics: IsingDynamics,
    pub initial_state: InitialState,
}

impl Default for IsingConfig {
    fn default() -> Self {
        Self {
            size: 32,
            temperature: onsager_critical_temperature(),
            n_steps: 200,
            n_equilib: 500,
            dynamics: IsingDynamics::Metropolis,
            initial_state: InitialState::Ordered,
        }
    }
}

impl IsingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(invalid("lattice size must be positive"));
        }
        if self.n_steps == 0 {
            return Err(invalid("n_steps must be positive"));
        }
        check_temperature(self.temperature)
    }
}

/// Sampled lattice time series
#[derive(Debug, Clone)]
pub struct IsingTrajectory {
    /// Spin grids, shape (n_steps, L, L)
    pub configs: Array3<i8>,
    /// |magnetization| per sample, shape (n_steps,)
    pub magnetization: Array1<f64>,
}

impl IsingTrajectory {
    pub fn n_steps(&self) -> usize {
        self.configs.len_of(Axis(0))
    }

    pub fn mean_magnetization(&self) -> f64 {
        self.magnetization.mean().unwrap_or(0.0)
    }
}

/// Simulate with a fresh generator seeded from `seed`
pub fn simulate_ising(config: &IsingConfig, seed: u64) -> Result<IsingTrajectory> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_ising_with_rng(config, &mut rng)
}

/// Equilibrate for `n_equilib` steps, then keep one configuration every
/// [`IsingDynamics::steps_per_sample`] steps until `n_steps` are collected
pub fn simulate_ising_with_rng<R: Rng + ?Sized>(
    config: &IsingConfig,
    rng: &mut R,
) -> Result<IsingTrajectory> {
    config.validate()?;

    let mut model = IsingModel::new(
        config.size,
        config.temperature,
        config.dynamics,
        config.initial_state,
        rng,
    )?;
    model.run(config.n_equilib, rng);

    let l = config.size;
    let mut configs = Array3::zeros((config.n_steps, l, l));
    let mut magnetization = Array1::zeros(config.n_steps);
    let stride = config.dynamics.steps_per_sample();

    for t in 0..config.n_steps {
        model.run(stride, rng);
        configs.index_axis_mut(Axis(0), t).assign(model.spins());
        magnetization[t] = model.magnetization();
    }

    debug!(
        size = l,
        temperature = config.temperature,
        dynamics = ?config.dynamics,
        mean_magnetization = magnetization.mean().unwrap_or(0.0),
        "ising trajectory sampled"
    );

    Ok(IsingTrajectory {
        configs,
        magnetization,
    })
}
