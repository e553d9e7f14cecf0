//! Kendall's tau-b rank correlation with a normal-approximation p-value.
//!
//! Used to ask whether the EI-ratio curve orders the sweep the same way the
//! cheap indicators do. Ties are handled with the tau-b normalization and
//! the tie-corrected variance of Kendall's S statistic.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

use crate::error::{EwsError, Result};

/// Rank correlation between two equally long series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KendallTau {
    /// tau-b in [-1, 1]
    pub tau: f64,
    /// Two-sided p-value for tau = 0
    pub p_value: f64,
    /// Number of paired observations
    pub n: usize,
}

/// Sizes of runs of equal values
fn tie_groups(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut groups = Vec::new();
    let mut run = 1usize;
    for w in sorted.windows(2) {
        if w[0] == w[1] {
            run += 1;
        } else {
            if run > 1 {
                groups.push(run as f64);
            }
            run = 1;
        }
    }
    if run > 1 {
        groups.push(run as f64);
    }
    groups
}

/// Kendall's tau-b between `x` and `y`
///
/// Returns `Ok(None)` when the correlation is undefined: fewer than two
/// points, a non-finite value, or a constant series.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> Result<Option<KendallTau>> {
    if x.len() != y.len() {
        return Err(EwsError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    let n = x.len();
    if n < 2 || x.iter().chain(y).any(|v| !v.is_finite()) {
        return Ok(None);
    }

    let mut s = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[j] - x[i];
            let dy = y[j] - y[i];
            if dx != 0.0 && dy != 0.0 {
                s += dx.signum() * dy.signum();
            }
        }
    }

    let nf = n as f64;
    let n0 = nf * (nf - 1.0) / 2.0;
    let ties_x = tie_groups(x);
    let ties_y = tie_groups(y);
    let n1: f64 = ties_x.iter().map(|t| t * (t - 1.0) / 2.0).sum();
    let n2: f64 = ties_y.iter().map(|u| u * (u - 1.0) / 2.0).sum();

    let denom = ((n0 - n1) * (n0 - n2)).sqrt();
    if denom <= 0.0 {
        return Ok(None);
    }
    let tau = (s / denom).clamp(-1.0, 1.0);

    // Var(S) with tie corrections
    let v0 = nf * (nf - 1.0) * (2.0 * nf + 5.0);
    let vt: f64 = ties_x.iter().map(|t| t * (t - 1.0) * (2.0 * t + 5.0)).sum();
    let vu: f64 = ties_y.iter().map(|u| u * (u - 1.0) * (2.0 * u + 5.0)).sum();
    let v1 = ties_x.iter().map(|t| t * (t - 1.0)).sum::<f64>()
        * ties_y.iter().map(|u| u * (u - 1.0)).sum::<f64>()
        / (2.0 * nf * (nf - 1.0));
    let v2 = if n > 2 {
        ties_x.iter().map(|t| t * (t - 1.0) * (t - 2.0)).sum::<f64>()
            * ties_y.iter().map(|u| u * (u - 1.0) * (u - 2.0)).sum::<f64>()
            / (9.0 * nf * (nf - 1.0) * (nf - 2.0))
    } else {
        0.0
    };
    let var_s = (v0 - vt - vu) / 18.0 + v1 + v2;

    let p_value = if var_s > 0.0 {
        let z = s / var_s.sqrt();
        erfc(z.abs() / SQRT_2).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Ok(Some(KendallTau { tau, p_value, n }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_perfect_agreement() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let k = kendall_tau(&x, &y).unwrap().unwrap();
        assert_abs_diff_eq!(k.tau, 1.0, epsilon = 1e-12);
        assert!(k.p_value < 1e-6);
        assert_eq!(k.n, 20);
    }

    #[test]
    fn test_perfect_disagreement() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [5.0, 4.0, 3.0, 2.0, 1.0];
        let k = kendall_tau(&x, &y).unwrap().unwrap();
        assert_abs_diff_eq!(k.tau, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_value_with_ties() {
        // scipy.stats.kendalltau([1,2,2,3], [1,3,2,3]) → tau-b = 0.8
        let k = kendall_tau(&[1.0, 2.0, 2.0, 3.0], &[1.0, 3.0, 2.0, 3.0])
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(k.tau, 0.8, epsilon = 1e-12);
        assert!(k.p_value > 0.0 && k.p_value <= 1.0);
    }

    #[test]
    fn test_undefined_cases() {
        assert!(kendall_tau(&[1.0], &[2.0]).unwrap().is_none());
        assert!(kendall_tau(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap().is_none());
        assert!(kendall_tau(&[1.0, f64::NAN], &[1.0, 2.0]).unwrap().is_none());
        assert!(kendall_tau(&[1.0, 2.0], &[1.0]).is_err());
    }
}
