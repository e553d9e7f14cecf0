//! Oscillator-phase coarse-graining and state encoding.
//!
//! The Kuramoto analogue of a spin patch is a triplet of oscillators whose
//! phases are each discretized into k bins, giving k³ joint states. The
//! triplets are drawn once and reused for every configuration of one
//! analysis, so pooled transition counts always refer to the same joint
//! variable.
//!
//! The macro scale replaces each consecutive group of oscillators by the
//! circular mean of their phases.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use std::f64::consts::PI;

use super::patch::{PatchStates, MAX_STATES};
use crate::error::{invalid, EwsError, Result};

const TWO_PI: f64 = 2.0 * PI;

/// Bin index of a phase in [0, 2π) split into `n_bins` equal arcs
///
/// Zero bins map every phase to bin 0.
pub fn phase_bin(theta: f64, n_bins: usize) -> usize {
    let wrapped = theta.rem_euclid(TWO_PI);
    ((wrapped / TWO_PI * n_bins as f64) as usize).min(n_bins.saturating_sub(1))
}

/// Replace each consecutive group of `group_size` oscillators by its
/// circular-mean phase, wrapped into [0, 2π)
pub fn coarsegrain_phases(phases: &Array2<f64>, group_size: usize) -> Result<Array2<f64>> {
    let (n_steps, n) = phases.dim();
    if group_size == 0 {
        return Err(invalid("group size must be positive"));
    }
    if n == 0 || n % group_size != 0 {
        return Err(invalid(format!(
            "group size {group_size} does not divide {n} oscillators"
        )));
    }

    let n_groups = n / group_size;
    let mut coarse = Array2::zeros((n_steps, n_groups));
    for (t, row) in phases.axis_iter(Axis(0)).enumerate() {
        for g in 0..n_groups {
            let members = row.iter().skip(g * group_size).take(group_size);
            let (s, c) = members.fold((0.0, 0.0), |(s, c), &theta| (s + theta.sin(), c + theta.cos()));
            coarse[[t, g]] = s.atan2(c).rem_euclid(TWO_PI);
        }
    }
    Ok(coarse)
}

/// Fixed oscillator triplets with k-bin phase discretization
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseEncoder {
    triplets: Vec<[usize; 3]>,
    n_bins: usize,
    n_oscillators: usize,
}

impl PhaseEncoder {
    /// Encoder over explicit triplets
    pub fn new(triplets: Vec<[usize; 3]>, n_bins: usize, n_oscillators: usize) -> Result<Self> {
        if triplets.is_empty() {
            return Err(invalid("need at least one oscillator triplet"));
        }
        if n_bins < 2 {
            return Err(invalid(format!("need at least 2 phase bins, got {n_bins}")));
        }
        if n_bins.pow(3) > MAX_STATES {
            return Err(invalid(format!(
                "{n_bins} bins give {} states, above the {MAX_STATES}-state limit",
                n_bins.pow(3)
            )));
        }
        for triplet in &triplets {
            if let Some(&bad) = triplet.iter().find(|&&i| i >= n_oscillators) {
                return Err(invalid(format!(
                    "oscillator {bad} out of range for {n_oscillators} oscillators"
                )));
            }
        }
        Ok(Self {
            triplets,
            n_bins,
            n_oscillators,
        })
    }

    /// Draw `n_triplets` disjoint triplets uniformly without replacement
    pub fn random<R: Rng + ?Sized>(
        n_oscillators: usize,
        n_triplets: usize,
        n_bins: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if n_triplets == 0 || 3 * n_triplets > n_oscillators {
            return Err(invalid(format!(
                "{n_triplets} disjoint triplets need {} oscillators, only {n_oscillators} available",
                3 * n_triplets
            )));
        }
        let picked = rand::seq::index::sample(rng, n_oscillators, 3 * n_triplets).into_vec();
        let triplets = picked.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(triplets, n_bins, n_oscillators)
    }

    pub fn triplets(&self) -> &[[usize; 3]] {
        &self.triplets
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// k³
    pub fn n_states(&self) -> usize {
        self.n_bins.pow(3)
    }

    /// Encode a (n_steps, N) phase series as base-k triplet states
    pub fn encode(&self, phases: &Array2<f64>) -> Result<PatchStates> {
        let (n_steps, n) = phases.dim();
        if n != self.n_oscillators {
            return Err(EwsError::DimensionMismatch {
                expected: self.n_oscillators,
                actual: n,
            });
        }

        let k = self.n_bins;
        let n_patches = self.triplets.len();
        let states = Array2::from_shape_fn((n_steps, n_patches), |(t, p)| {
            let [a, b, c] = self.triplets[p];
            phase_bin(phases[[t, a]], k) * k * k + phase_bin(phases[[t, b]], k) * k + phase_bin(phases[[t, c]], k)
        });

        Ok(PatchStates {
            states,
            n_states: self.n_states(),
            n_patches,
        })
    }
}

/// Bin an order-parameter series r ∈ [0, 1] into a single-patch state series
pub fn order_parameter_states(r: &Array1<f64>, n_bins: usize) -> Result<PatchStates> {
    if n_bins == 0 || n_bins > MAX_STATES {
        return Err(invalid(format!("order-parameter bins must be in 1..={MAX_STATES}, got {n_bins}")));
    }
    let states = Array2::from_shape_fn((r.len(), 1), |(t, _)| {
        ((r[t].clamp(0.0, 1.0) * n_bins as f64) as usize).min(n_bins - 1)
    });
    Ok(PatchStates {
        states,
        n_states: n_bins,
        n_patches: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_phase_bins() {
        assert_eq!(phase_bin(0.0, 4), 0);
        assert_eq!(phase_bin(PI / 2.0 + 1e-9, 4), 1);
        assert_eq!(phase_bin(TWO_PI - 1e-12, 4), 3);
        assert_eq!(phase_bin(-0.1, 4), 3);
        assert_eq!(phase_bin(1.0, 0), 0);
        assert_eq!(phase_bin(5.0, 1), 0);
    }

    #[test]
    fn test_triplet_encoding() {
        let encoder = PhaseEncoder::new(vec![[0, 1, 2]], 4, 3).unwrap();
        assert_eq!(encoder.n_states(), 64);
        // bins 1, 2, 3 → 1·16 + 2·4 + 3 = 27
        let phases = array![[0.5 * PI + 0.1, PI + 0.1, 1.5 * PI + 0.1]];
        let ps = encoder.encode(&phases).unwrap();
        assert_eq!(ps.states[[0, 0]], 27);
        assert_eq!(ps.n_patches, 1);
    }

    #[test]
    fn test_random_triplets_are_disjoint_and_reproducible() {
        let mut rng = StdRng::seed_from_u64(8);
        let a = PhaseEncoder::random(30, 10, 4, &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let b = PhaseEncoder::random(30, 10, 4, &mut rng).unwrap();
        assert_eq!(a, b);

        let mut all: Vec<usize> = a.triplets().iter().flatten().copied().collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 30);
    }

    #[test]
    fn test_too_many_triplets() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(PhaseEncoder::random(8, 3, 4, &mut rng).is_err());
        assert!(PhaseEncoder::random(9, 0, 4, &mut rng).is_err());
        assert!(PhaseEncoder::new(vec![[0, 1, 9]], 4, 5).is_err());
    }

    #[test]
    fn test_encode_dimension_mismatch() {
        let encoder = PhaseEncoder::new(vec![[0, 1, 2]], 3, 6).unwrap();
        let phases = Array2::zeros((4, 5));
        assert!(matches!(
            encoder.encode(&phases),
            Err(EwsError::DimensionMismatch { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_circular_mean_coarse_graining() {
        // Two phases straddling zero average to zero, not π
        let phases = array![[0.1, TWO_PI - 0.1, 1.0, 1.2]];
        let coarse = coarsegrain_phases(&phases, 2).unwrap();
        assert_eq!(coarse.dim(), (1, 2));
        assert!(coarse[[0, 0]] < 1e-9 || coarse[[0, 0]] > TWO_PI - 1e-9);
        assert_abs_diff_eq!(coarse[[0, 1]], 1.1, epsilon = 1e-9);
        assert!(coarsegrain_phases(&phases, 3).is_err());
    }

    #[test]
    fn test_order_parameter_bins() {
        let r = array![0.0, 0.24, 0.5, 1.0];
        let ps = order_parameter_states(&r, 4).unwrap();
        assert_eq!(ps.states.column(0).to_vec(), vec![0, 0, 2, 3]);
        assert_eq!(ps.n_states, 4);
    }
}
