//! # Mann–Whitney U Rank-Sum Test
//!
//! Non-parametric two-sample test used to compare duration distributions
//! across versions of the same scenario (for example, two crystals'
//! performance samples).
//!
//! ## Algorithm
//!
//! 1. Pool both samples and sort ascending (stable, so tied values keep their
//!    input order).
//! 2. Assign 1-based ranks; every run of tied values receives the average of
//!    the ranks it spans.
//! 3. `U1 = R1 - n1(n1 + 1)/2`, `U2 = n1·n2 - U1`, `U = min(U1, U2)`.
//! 4. Normal approximation: `μ = n1·n2/2`, `σ = √(n1·n2(n1 + n2 + 1)/12)`,
//!    `z = (U - μ)/σ`.
//! 5. Two-tailed `p = 2(1 - Φ(|z|))` with Φ from Abramowitz & Stegun 7.1.26.
//!
//! The computation is a fixed sequence of IEEE operations, so identical
//! sample vectors always give bit-identical p-values.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::profile::check_samples;

// Abramowitz & Stegun 7.1.26 coefficients.
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Outcome of a Mann–Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MannWhitneyResult {
    /// The smaller of the two U statistics.
    pub u: f64,
    /// Standard score of `u` under the null hypothesis.
    pub z: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
}

impl MannWhitneyResult {
    /// Whether the difference is significant at level `alpha`.
    pub fn significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Standard normal CDF, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
pub fn normal_cdf(z: f64) -> f64 {
    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// Average 1-based ranks of `values` (already sorted ascending).
fn tied_ranks(sorted: &[f64]) -> Vec<f64> {
    let mut ranks = vec![0.0; sorted.len()];
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        // Ranks i+1 ..= j+1 averaged.
        let avg = (i + 1 + j + 1) as f64 / 2.0;
        for r in &mut ranks[i..=j] {
            *r = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Full Mann–Whitney U test of `a` against `b`.
///
/// # Errors
///
/// `StatsError::EmptySample` if either side is empty, `StatsError::NonFinite`
/// if any value is NaN or infinite.
pub fn mann_whitney_u_detailed(a: &[f64], b: &[f64]) -> Result<MannWhitneyResult, StatsError> {
    check_samples(a)?;
    check_samples(b)?;

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;

    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&v| (v, true))
        .chain(b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    let values: Vec<f64> = pooled.iter().map(|(v, _)| *v).collect();
    let ranks = tied_ranks(&values);

    let r1: f64 = pooled
        .iter()
        .zip(&ranks)
        .filter(|((_, from_a), _)| *from_a)
        .map(|(_, r)| r)
        .sum();

    let u1 = r1 - (n1 * (n1 + 1.0)) / 2.0;
    let u2 = n1 * n2 - u1;
    let u = u1.min(u2);

    let mu = (n1 * n2) / 2.0;
    let sigma = ((n1 * n2 * (n1 + n2 + 1.0)) / 12.0).sqrt();
    let z = (u - mu) / sigma;

    let p_value = 2.0 * (1.0 - normal_cdf(z.abs()));

    Ok(MannWhitneyResult { u, z, p_value })
}

/// Two-tailed p-value of the Mann–Whitney U test of `a` against `b`.
///
/// # Errors
///
/// See [`mann_whitney_u_detailed`].
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<f64, StatsError> {
    Ok(mann_whitney_u_detailed(a, b)?.p_value)
}
