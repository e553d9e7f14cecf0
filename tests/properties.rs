//! Invariants of the transition-matrix estimator and the EI engine.

use ews_info_dynamics::{effective_information, estimate_transition_matrix};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_random_stochastic_matrices_have_non_negative_ei() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let mut t = Array2::from_shape_fn((16, 16), |_| rng.random::<f64>());
        for mut row in t.rows_mut() {
            let total = row.sum();
            row /= total;
        }
        let ei = effective_information(t.view(), None, 0.0).unwrap();
        assert!(ei >= 0.0, "EI = {ei}");
        assert!(ei <= 4.0 + 1e-10);
    }
}

#[test]
fn test_observed_only_two_of_eight_states() {
    // Deterministic 0 <-> 1 alternation, states 2..8 never visited
    let from: Vec<usize> = (0..400).map(|i| i % 2).collect();
    let to: Vec<usize> = (0..400).map(|i| (i + 1) % 2).collect();
    let tm = estimate_transition_matrix(&from, &to, 8, None).unwrap();

    let full = tm.effective_information(0.0).unwrap();
    let observed = tm.effective_information(1.0).unwrap();
    assert!(observed >= full);
    assert_eq!(tm.rows_observed(1.0), 2);
    assert!(observed > 0.9);
}

mod invariants {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_rows_are_stochastic(
            n_states in 1usize..24,
            pairs in proptest::collection::vec((0usize..1000, 0usize..1000), 0..300),
            alpha in proptest::option::of(0.0f64..3.0)
        ) {
            let from: Vec<usize> = pairs.iter().map(|&(a, _)| a % n_states).collect();
            let to: Vec<usize> = pairs.iter().map(|&(_, b)| b % n_states).collect();

            let tm = estimate_transition_matrix(&from, &to, n_states, alpha).unwrap();

            for row in tm.probabilities.rows() {
                prop_assert!((row.sum() - 1.0).abs() < 1e-9);
                prop_assert!(row.iter().all(|&p| p >= 0.0));
            }
            prop_assert_eq!(tm.total_observations() as usize, pairs.len());
        }

        #[test]
        fn prop_ei_is_bounded(
            weights in proptest::collection::vec(1e-6f64..1.0, 64),
            min_obs in 0.0f64..3.0
        ) {
            let mut t = Array2::from_shape_vec((8, 8), weights).unwrap();
            for mut row in t.rows_mut() {
                let total = row.sum();
                row /= total;
            }
            let counts = ndarray::Array1::from_iter((0..8).map(|i| i as f64));

            let ei = effective_information(t.view(), Some(counts.view()), min_obs).unwrap();
            prop_assert!(ei >= 0.0);
            prop_assert!(ei <= 3.0 + 1e-10);
        }
    }
}
