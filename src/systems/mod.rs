//! Physical Systems Module: Reference Models for Early-Warning Analysis
//!
//! Two stochastic systems with a known critical point:
//!
//! - **Ising**: Order-disorder transition on a square lattice (T_c ≈ 2.269),
//!   with Metropolis or Wolff dynamics
//! - **Kuramoto**: Synchronization transition in noisy coupled oscillators
//!
//! Both take an explicit random generator, so the same seed reproduces the
//! same trajectory.

mod traits;
mod ising;
mod kuramoto;

pub use traits::{DynamicalSystem, Controllable};
pub use ising::{
    BoltzmannTable, InitialState, IsingConfig, IsingDynamics, IsingModel, IsingTrajectory,
    onsager_critical_temperature, simulate_ising, simulate_ising_with_rng, wolff_add_probability,
    COUPLING_J, SWEEPS_PER_SAMPLE,
};
pub use kuramoto::{
    KuramotoConfig, KuramotoSystem, KuramotoTrajectory, gaussian_critical_coupling,
    natural_frequencies, order_parameter_of, simulate_kuramoto, simulate_kuramoto_with_rng,
};
