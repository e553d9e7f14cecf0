//! Transition Matrix Estimation with State-Space-Aware Smoothing
//!
//! Counts (state_t → state_{t+1}) pairs into an n×n matrix, then adds a
//! pseudo-count α to every cell before row-normalizing. The default
//! α = 1/n injects exactly one pseudo-observation per row whatever the
//! state-space size; a fixed α would inject n·α, drowning large state
//! spaces and barely touching small ones.
//!
//! The raw per-row counts travel with the matrix as `row_counts`. After
//! smoothing, a row that was never visited looks like any other, so this
//! side channel is the only way to tell real statistics from pseudo-counts.

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::coarse::PatchStates;
use crate::error::{invalid, EwsError, Result};

/// Row-stochastic transition matrix with real observation counts
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    /// T[i, j] = P(next = j | current = i), rows sum to 1
    pub probabilities: Array2<f64>,
    /// Unsmoothed number of transitions observed out of each state
    pub row_counts: Array1<f64>,
}

impl TransitionMatrix {
    pub fn n_states(&self) -> usize {
        self.row_counts.len()
    }

    /// Total real transitions behind the matrix
    pub fn total_observations(&self) -> f64 {
        self.row_counts.sum()
    }

    /// Rows backed by at least `min_observations` real transitions
    ///
    /// With `min_observations <= 0` every row qualifies.
    pub fn rows_observed(&self, min_observations: f64) -> usize {
        if min_observations <= 0.0 {
            return self.n_states();
        }
        self.row_counts
            .iter()
            .filter(|&&c| c >= min_observations)
            .count()
    }

    /// EI of this matrix, restricted to rows with enough real data
    pub fn effective_information(&self, min_observations: f64) -> Result<f64> {
        super::effective::effective_information(
            self.probabilities.view(),
            Some(self.row_counts.view()),
            min_observations,
        )
    }
}

/// Estimate a transition matrix from aligned state sequences
///
/// # Arguments
/// * `states_t` - Source states
/// * `states_t1` - Destination states, same length
/// * `n_states` - Alphabet size; every state must be below it
/// * `alpha` - Pseudo-count per cell (default 1/n_states)
///
/// A row with zero total mass (unvisited, α = 0) is set to uniform.
pub fn estimate_transition_matrix(
    states_t: &[usize],
    states_t1: &[usize],
    n_states: usize,
    alpha: Option<f64>,
) -> Result<TransitionMatrix> {
    if n_states == 0 {
        return Err(invalid("n_states must be positive"));
    }
    if states_t.len() != states_t1.len() {
        return Err(EwsError::DimensionMismatch {
            expected: states_t.len(),
            actual: states_t1.len(),
        });
    }
    let alpha = alpha.unwrap_or(1.0 / n_states as f64);
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(invalid(format!("alpha must be finite and non-negative, got {alpha}")));
    }

    // Flattened histogram over src * n + dst
    let mut flat = vec![0.0f64; n_states * n_states];
    for (&src, &dst) in states_t.iter().zip(states_t1) {
        if let Some(&state) = [src, dst].iter().find(|&&s| s >= n_states) {
            return Err(EwsError::StateOutOfRange { state, n_states });
        }
        flat[src * n_states + dst] += 1.0;
    }
    let counts = Array2::from_shape_vec((n_states, n_states), flat)
        .map_err(|e| invalid(e.to_string()))?;

    let row_counts = counts.sum_axis(ndarray::Axis(1));
    let mut probabilities = counts + alpha;

    let uniform = 1.0 / n_states as f64;
    for mut row in probabilities.rows_mut() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        } else {
            row.fill(uniform);
        }
    }

    Ok(TransitionMatrix {
        probabilities,
        row_counts,
    })
}

/// Aligned transition pairs over an alphabet of `n_states`
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSample {
    from: Vec<usize>,
    to: Vec<usize>,
    n_states: usize,
}

impl TransitionSample {
    pub fn new(from: Vec<usize>, to: Vec<usize>, n_states: usize) -> Result<Self> {
        if from.len() != to.len() {
            return Err(EwsError::DimensionMismatch {
                expected: from.len(),
                actual: to.len(),
            });
        }
        Ok(Self { from, to, n_states })
    }

    /// Pool the transitions of every patch of a state series
    pub fn from_patch_states(states: &PatchStates) -> Self {
        let (from, to) = states.transition_pairs();
        Self {
            from,
            to,
            n_states: states.n_states,
        }
    }

    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn from_states(&self) -> &[usize] {
        &self.from
    }

    pub fn to_states(&self) -> &[usize] {
        &self.to
    }

    /// Draw `amount` pairs without replacement
    ///
    /// Asking for the full length or more returns every pair unchanged.
    pub fn subsample<R: Rng + ?Sized>(&self, amount: usize, rng: &mut R) -> Self {
        if amount >= self.len() {
            return self.clone();
        }
        let picked = rand::seq::index::sample(rng, self.len(), amount);
        Self {
            from: picked.iter().map(|i| self.from[i]).collect(),
            to: picked.iter().map(|i| self.to[i]).collect(),
            n_states: self.n_states,
        }
    }

    /// Transition matrix with the default 1/n_states smoothing
    pub fn estimate(&self) -> Result<TransitionMatrix> {
        estimate_transition_matrix(&self.from, &self.to, self.n_states, None)
    }
}
