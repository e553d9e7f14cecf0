//! Spin-lattice coarse-graining and patch encoding.
//!
//! - `coarsegrain`: b×b block majority vote, L → L/b
//! - `to_patch_states`: p×p patches packed into p² bits, 2^(p²) states
//!
//! The patch size fixes the state space, and with it how many transitions
//! each row of the transition matrix receives. Too large a patch leaves every
//! row under-sampled (EI biased toward zero); too small a patch erases the
//! spatial structure. Choosing it is the caller's job.

use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use super::patch::{PatchStates, MAX_STATES};
use crate::error::{invalid, Result};

fn check_divides(extent: usize, size: usize, what: &str) -> Result<()> {
    if size == 0 {
        return Err(invalid(format!("{what} must be positive")));
    }
    if extent == 0 {
        return Err(invalid("lattice is empty"));
    }
    if extent % size != 0 {
        return Err(invalid(format!(
            "{what} {size} does not divide lattice extent {extent}"
        )));
    }
    Ok(())
}

/// Majority spin of one block; a tied block takes its top-left spin
fn majority(block: ArrayView2<i8>) -> i8 {
    let sum: i32 = block.iter().map(|&s| s as i32).sum();
    match sum {
        0 => block[[0, 0]],
        s if s > 0 => 1,
        _ => -1,
    }
}

/// Coarse-grain one configuration by b×b majority vote
pub fn coarsegrain_config(config: ArrayView2<i8>, block_size: usize) -> Result<Array2<i8>> {
    let (rows, cols) = config.dim();
    check_divides(rows, block_size, "block size")?;
    check_divides(cols, block_size, "block size")?;

    let b = block_size;
    Ok(Array2::from_shape_fn((rows / b, cols / b), |(i, j)| {
        majority(config.slice(s![i * b..(i + 1) * b, j * b..(j + 1) * b]))
    }))
}

/// Coarse-grain every configuration of a (n_steps, L, L) series
pub fn coarsegrain(configs: &Array3<i8>, block_size: usize) -> Result<Array3<i8>> {
    let (n_steps, rows, cols) = configs.dim();
    check_divides(rows, block_size, "block size")?;
    check_divides(cols, block_size, "block size")?;

    let mut coarse = Array3::zeros((n_steps, rows / block_size, cols / block_size));
    for (t, config) in configs.axis_iter(Axis(0)).enumerate() {
        coarse
            .index_axis_mut(Axis(0), t)
            .assign(&coarsegrain_config(config, block_size)?);
    }
    Ok(coarse)
}

/// Pack a p×p patch into an integer: bit r·p + c is set when spin (r, c) is +1
pub fn encode_patch(patch: ArrayView2<i8>) -> usize {
    patch
        .iter()
        .enumerate()
        .filter(|(_, s)| **s > 0)
        .fold(0usize, |code, (bit, _)| code | (1 << bit))
}

/// Encode each configuration as non-overlapping p×p patch states
///
/// Patches are numbered row-major over the patch grid.
pub fn to_patch_states(configs: &Array3<i8>, patch_size: usize) -> Result<PatchStates> {
    let (n_steps, rows, cols) = configs.dim();
    check_divides(rows, patch_size, "patch size")?;
    check_divides(cols, patch_size, "patch size")?;

    let bits = patch_size * patch_size;
    if bits > MAX_STATES.trailing_zeros() as usize {
        return Err(invalid(format!(
            "patch size {patch_size} gives 2^{bits} states, above the {MAX_STATES}-state limit"
        )));
    }

    let p = patch_size;
    let (grid_rows, grid_cols) = (rows / p, cols / p);
    let n_patches = grid_rows * grid_cols;
    let mut states = Array2::zeros((n_steps, n_patches));

    for (t, config) in configs.axis_iter(Axis(0)).enumerate() {
        for gi in 0..grid_rows {
            for gj in 0..grid_cols {
                let patch = config.slice(s![gi * p..(gi + 1) * p, gj * p..(gj + 1) * p]);
                states[[t, gi * grid_cols + gj]] = encode_patch(patch);
            }
        }
    }

    Ok(PatchStates {
        states,
        n_states: 1 << bits,
        n_patches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_all_up_and_all_down_patches() {
        let up = Array3::from_elem((3, 8, 8), 1i8);
        let ps = to_patch_states(&up, 2).unwrap();
        assert_eq!(ps.n_states, 16);
        assert_eq!(ps.n_patches, 16);
        assert!(ps.states.iter().all(|&s| s == 15));

        let down = Array3::from_elem((3, 8, 8), -1i8);
        let ps = to_patch_states(&down, 2).unwrap();
        assert!(ps.states.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_patch_counts_for_l24() {
        let configs = Array3::from_elem((2, 24, 24), 1i8);
        let ps = to_patch_states(&configs, 2).unwrap();
        assert_eq!(ps.n_states, 16);
        assert_eq!(ps.n_patches, 144);
        assert_eq!(ps.states.dim(), (2, 144));
    }

    #[test]
    fn test_bit_positions() {
        // Only (0,1) and (1,0) up: bits 1 and 2
        let patch = array![[-1i8, 1], [1, -1]];
        assert_eq!(encode_patch(patch.view()), 0b0110);
        let patch = array![[1i8, -1], [-1, -1]];
        assert_eq!(encode_patch(patch.view()), 1);
    }

    #[test]
    fn test_majority_vote() {
        let config = array![
            [1i8, 1, -1, -1],
            [1, -1, -1, -1],
            [-1, 1, 1, -1],
            [1, -1, -1, 1],
        ];
        let coarse = coarsegrain_config(config.view(), 2).unwrap();
        // Block sums: 2, -4 / 0 (top-left -1), 0 (top-left 1)
        assert_eq!(coarse, array![[1i8, -1], [-1, 1]]);
    }

    #[test]
    fn test_coarsegrain_series_shape() {
        let configs = Array3::from_elem((5, 12, 12), -1i8);
        let coarse = coarsegrain(&configs, 3).unwrap();
        assert_eq!(coarse.dim(), (5, 4, 4));
        assert!(coarse.iter().all(|&s| s == -1));
    }

    #[test]
    fn test_invalid_sizes() {
        let configs = Array3::from_elem((2, 10, 10), 1i8);
        assert!(coarsegrain(&configs, 3).is_err());
        assert!(coarsegrain(&configs, 0).is_err());
        assert!(to_patch_states(&configs, 3).is_err());
        assert!(to_patch_states(&configs, 0).is_err());

        // 4×4 patches would need 65536 states
        let configs = Array3::from_elem((2, 16, 16), 1i8);
        assert!(to_patch_states(&configs, 4).is_err());
    }
}
