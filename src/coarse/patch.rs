//! Patch-state sequences: the unit of transition analysis.

use ndarray::{Array2, Axis};

/// Upper bound on patch state-space size (2¹² states)
///
/// The dense transition matrix is n_states², so 4096 states already cost
/// 128 MiB of f64.
pub const MAX_STATES: usize = 1 << 12;

/// Integer patch states over a time series
///
/// `states[[t, p]]` is the state of patch `p` in sample `t`, always in
/// `[0, n_states)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchStates {
    /// States, shape (n_steps, n_patches)
    pub states: Array2<usize>,
    /// Size of the state alphabet
    pub n_states: usize,
    /// Patches per configuration
    pub n_patches: usize,
}

impl PatchStates {
    pub fn n_steps(&self) -> usize {
        self.states.len_of(Axis(0))
    }

    /// Number of (t, t+1) pairs pooled over all patches
    pub fn n_transitions(&self) -> usize {
        self.n_steps().saturating_sub(1) * self.n_patches
    }

    /// Aligned (state_t, state_{t+1}) sequences pooled over patches
    ///
    /// Pairs are ordered by time, then by patch index.
    pub fn transition_pairs(&self) -> (Vec<usize>, Vec<usize>) {
        let n = self.n_transitions();
        let mut from = Vec::with_capacity(n);
        let mut to = Vec::with_capacity(n);

        for (now, next) in self
            .states
            .axis_iter(Axis(0))
            .zip(self.states.axis_iter(Axis(0)).skip(1))
        {
            from.extend(now.iter().copied());
            to.extend(next.iter().copied());
        }

        (from, to)
    }
}
