//! Dynamical System Traits: Standardized API for Early-Warning Analysis
//!
//! Both reference systems (Ising lattice, Kuramoto ensemble) implement the
//! same two traits so the sweep pipeline can treat them uniformly:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DynamicalSystem Trait                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  + step(rng)           - One update (sweep / cluster / dt)  │
//! │  + run(n, rng)         - Run n updates                      │
//! │  + n_elements()        - Spins / oscillators                │
//! │  + order_parameter()   - |m| or r                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The random generator is always passed in by the caller; systems never
//! own or create one.

use rand::Rng;

use crate::error::Result;

/// Trait for stochastic dynamical systems driven by an injected RNG
pub trait DynamicalSystem {
    /// Advance the system by one elementary update
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Run multiple elementary updates
    fn run<R: Rng + ?Sized>(&mut self, n_steps: usize, rng: &mut R) {
        for _ in 0..n_steps {
            self.step(rng);
        }
    }

    /// Number of elements (lattice sites or oscillators)
    fn n_elements(&self) -> usize;

    /// System-specific order parameter in [0, 1]
    ///
    /// - Ising: |Σ s| / N
    /// - Kuramoto: r = |⟨e^{iθ}⟩|
    fn order_parameter(&self) -> f64;
}

/// Trait for systems with a scalar control parameter
pub trait Controllable {
    /// Set control parameter (temperature, coupling)
    ///
    /// Rejects values outside the system's valid domain.
    fn set_parameter(&mut self, param: f64) -> Result<()>;

    /// Current control parameter
    fn parameter(&self) -> f64;
}
