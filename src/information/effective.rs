//! Effective Information: Causal Strength of a Transition Matrix
//!
//! For a row-stochastic T over n states, with a uniform intervention on the
//! current state:
//!
//!   EI = H(q) - (1/n) Σᵢ H(T[i,:]),   q = (1/n) Σᵢ T[i,:]
//!
//! i.e. determinism minus degeneracy, in bits. Identity dynamics give
//! log₂ n; identical rows give 0.
//!
//! ## Observed-only mode
//!
//! Rows visited fewer than `min_observations` times are dominated by the
//! smoothing pseudo-count and look like pure noise. With a positive
//! threshold they are dropped from both the noise average and the effect
//! repertoire q.
//!
//! ## Sample equalization
//!
//! Coarse scales have fewer patches, hence fewer transitions, than the
//! micro scale. [`compute_ei_equalized`] subsamples the larger stream down
//! to the smaller one before estimating either matrix, so EI(micro) and
//! EI(macro) carry the same finite-sample bias.

use std::borrow::Cow;

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::transition::TransitionSample;
use crate::error::{EwsError, Result};

/// Negative EI within this many bits of zero is rounding noise
pub const NEGATIVE_TOLERANCE: f64 = 1e-10;

/// Shannon entropy in bits, ignoring non-positive entries
pub fn shannon_entropy_bits<'a>(distribution: impl IntoIterator<Item = &'a f64>) -> f64 {
    distribution
        .into_iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Effective information of a transition matrix, in bits
///
/// # Arguments
/// * `matrix` - n×n row-stochastic matrix
/// * `row_counts` - Real observations per row (required to filter)
/// * `min_observations` - Keep only rows with at least this many real
///   observations; `<= 0` keeps every row
///
/// Returns 0.0 when no row qualifies. A result below `-NEGATIVE_TOLERANCE`
/// means the matrix or the entropy computation is broken and is reported
/// as [`EwsError::NegativeEffectiveInformation`].
pub fn effective_information(
    matrix: ArrayView2<f64>,
    row_counts: Option<ArrayView1<f64>>,
    min_observations: f64,
) -> Result<f64> {
    let (n_rows, n_cols) = matrix.dim();
    if n_rows != n_cols {
        return Err(EwsError::DimensionMismatch {
            expected: n_rows,
            actual: n_cols,
        });
    }
    if let Some(counts) = &row_counts {
        if counts.len() != n_rows {
            return Err(EwsError::DimensionMismatch {
                expected: n_rows,
                actual: counts.len(),
            });
        }
    }

    let selected: Vec<usize> = match row_counts {
        Some(counts) if min_observations > 0.0 => (0..n_rows)
            .filter(|&i| counts[i] >= min_observations)
            .collect(),
        _ => (0..n_rows).collect(),
    };
    if selected.is_empty() {
        return Ok(0.0);
    }

    let m = selected.len() as f64;
    let mut effect_repertoire = Array1::<f64>::zeros(n_cols);
    let mut noise = 0.0;
    for &i in &selected {
        let row = matrix.index_axis(Axis(0), i);
        effect_repertoire += &row;
        noise += shannon_entropy_bits(row.iter());
    }
    effect_repertoire /= m;

    let ei = shannon_entropy_bits(effect_repertoire.iter()) - noise / m;

    if ei < -NEGATIVE_TOLERANCE {
        return Err(EwsError::NegativeEffectiveInformation(ei));
    }
    Ok(ei.max(0.0))
}

/// EI at two scales computed on equal numbers of transitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizedEi {
    pub ei_micro: f64,
    pub ei_macro: f64,
    /// Transitions behind each matrix
    pub n_transitions_used: usize,
    /// Micro rows passing the observation filter
    pub n_rows_micro: usize,
    /// Macro rows passing the observation filter
    pub n_rows_macro: usize,
}

impl EqualizedEi {
    /// EI(macro) > EI(micro)
    pub fn is_emergent(&self) -> bool {
        self.ei_macro > self.ei_micro
    }
}

/// Compare micro and macro EI on equal sample counts
///
/// The longer transition stream (normally the micro one) is subsampled
/// without replacement to the length of the shorter, then both matrices
/// go through the same observed-only filter. The row counts that passed
/// are returned so a caller can spot a scale too sparse to trust.
pub fn compute_ei_equalized<R: Rng + ?Sized>(
    micro: &TransitionSample,
    macro_scale: &TransitionSample,
    min_observations: f64,
    rng: &mut R,
) -> Result<EqualizedEi> {
    let target = micro.len().min(macro_scale.len());

    let micro_eq = equalize(micro, target, rng);
    let macro_eq = equalize(macro_scale, target, rng);

    let tm_micro = micro_eq.estimate()?;
    let tm_macro = macro_eq.estimate()?;

    Ok(EqualizedEi {
        ei_micro: tm_micro.effective_information(min_observations)?,
        ei_macro: tm_macro.effective_information(min_observations)?,
        n_transitions_used: target,
        n_rows_micro: tm_micro.rows_observed(min_observations),
        n_rows_macro: tm_macro.rows_observed(min_observations),
    })
}

fn equalize<'a, R: Rng + ?Sized>(
    sample: &'a TransitionSample,
    target: usize,
    rng: &mut R,
) -> Cow<'a, TransitionSample> {
    if sample.len() > target {
        Cow::Owned(sample.subsample(target, rng))
    } else {
        Cow::Borrowed(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::information::transition::estimate_transition_matrix;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_identity_ei() {
        for n in [2usize, 4, 16, 37] {
            let t = Array2::<f64>::eye(n);
            let ei = effective_information(t.view(), None, 0.0).unwrap();
            assert_abs_diff_eq!(ei, (n as f64).log2(), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_uniform_ei() {
        let t = Array2::from_elem((8, 8), 1.0 / 8.0);
        let ei = effective_information(t.view(), None, 0.0).unwrap();
        assert_abs_diff_eq!(ei, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_identical_rows_ei_is_zero() {
        let t = array![[0.7, 0.2, 0.1], [0.7, 0.2, 0.1], [0.7, 0.2, 0.1]];
        let ei = effective_information(t.view(), None, 0.0).unwrap();
        assert_abs_diff_eq!(ei, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_observed_only_never_lowers_ei() {
        // Only states 2 and 5 are ever visited, flipping between each other
        let from = [2, 5, 2, 5, 2, 5, 2, 5, 2, 5];
        let to = [5, 2, 5, 2, 5, 2, 5, 2, 5, 2];
        let tm = estimate_transition_matrix(&from, &to, 8, None).unwrap();

        let full = tm.effective_information(0.0).unwrap();
        let observed = tm.effective_information(1.0).unwrap();
        assert!(observed >= full, "observed {} < full {}", observed, full);
        assert!(observed > 0.5);
        assert_eq!(tm.rows_observed(1.0), 2);
    }

    #[test]
    fn test_no_qualifying_rows_gives_zero() {
        let tm = estimate_transition_matrix(&[0, 1], &[1, 0], 4, None).unwrap();
        assert_eq!(tm.effective_information(10.0).unwrap(), 0.0);

        let empty = Array2::<f64>::zeros((0, 0));
        assert_eq!(effective_information(empty.view(), None, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_single_state_is_degenerate() {
        let tm = estimate_transition_matrix(&[3; 50], &[3; 50], 16, None).unwrap();
        assert_abs_diff_eq!(tm.effective_information(1.0).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_ei_is_an_error() {
        // Negative mass is skipped by the entropy, breaking concavity
        let t = array![[0.5, 0.5], [-0.5, 0.5]];
        assert!(matches!(
            effective_information(t.view(), None, 0.0),
            Err(EwsError::NegativeEffectiveInformation(_))
        ));
    }

    #[test]
    fn test_shape_checks() {
        let t = Array2::<f64>::zeros((2, 3));
        assert!(effective_information(t.view(), None, 0.0).is_err());
        let t = Array2::<f64>::eye(3);
        let counts = array![1.0, 2.0];
        assert!(effective_information(t.view(), Some(counts.view()), 1.0).is_err());
    }

    #[test]
    fn test_equalized_uses_macro_count() {
        let n_micro = 2000;
        let micro = TransitionSample::new(
            (0..n_micro).map(|i| i % 16).collect(),
            (0..n_micro).map(|i| (i + 1) % 16).collect(),
            16,
        )
        .unwrap();
        let macro_scale = TransitionSample::new(
            (0..300).map(|i| i % 4).collect(),
            (0..300).map(|i| (i + 1) % 4).collect(),
            4,
        )
        .unwrap();

        let a = compute_ei_equalized(&micro, &macro_scale, 1.0, &mut StdRng::seed_from_u64(17)).unwrap();
        let b = compute_ei_equalized(&micro, &macro_scale, 1.0, &mut StdRng::seed_from_u64(17)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_transitions_used, 300);
        assert_eq!(a.n_rows_macro, 4);
        assert!(a.n_rows_micro <= 16);
        // Both are permutations: EI = log2 of the number of observed rows
        assert_abs_diff_eq!(a.ei_macro, 2.0, epsilon = 0.2);
        assert!(a.ei_micro > 3.0);
    }
}
