//! # Statistical Profile
//!
//! Descriptive statistics over a sample of run durations.
//!
//! ## Definitions
//!
//! All moments are **population** moments (divide by `n`, not `n - 1`):
//!
//! ```text
//! mean     = Σx / n
//! variance = Σ(x - mean)² / n
//! skewness = (Σ(x - mean)³ / n) / σ³
//! kurtosis = (Σ(x - mean)⁴ / n) / σ⁴ - 3      (excess)
//! ci95     = mean ± 1.96 · σ / √n
//! cv       = σ / mean
//! ```
//!
//! Percentiles use the nearest-rank method on the ascending sort:
//! `index = clamp(ceil(p / 100 · n) - 1, 0, n - 1)`.
//!
//! Sums are accumulated left to right in input order, so identical sample
//! vectors produce bit-identical profiles.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// z-value of the two-sided 95% normal interval.
const Z_95: f64 = 1.96;

/// Shape of a sample, inferred from its moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    /// Near-zero skewness and excess kurtosis.
    Normal,
    /// High coefficient of variation with a flat top.
    Bimodal,
    /// Excess kurtosis above 3.
    HeavyTail,
    /// Strongly negative kurtosis with low spread.
    Uniform,
    /// None of the above.
    Unknown,
}

impl Distribution {
    /// Classify from moments. The checks run in this order; the first match wins.
    pub fn classify(skewness: f64, kurtosis: f64, cv: f64) -> Self {
        if skewness.abs() < 0.5 && kurtosis.abs() < 1.0 {
            Self::Normal
        } else if kurtosis > 3.0 {
            Self::HeavyTail
        } else if kurtosis < -1.0 && cv < 0.3 {
            Self::Uniform
        } else if cv > 0.5 && kurtosis < -0.5 {
            Self::Bimodal
        } else {
            Self::Unknown
        }
    }

    /// The serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bimodal => "bimodal",
            Self::HeavyTail => "heavy-tail",
            Self::Uniform => "uniform",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-sided 95% confidence interval for the mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Full descriptive profile of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticalProfile {
    /// Sample size.
    pub n: u64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// 50th percentile.
    pub median: f64,
    /// 50th percentile (same as `median`).
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
    /// 99.9th percentile.
    pub p999: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// 95% confidence interval of the mean.
    pub ci95: ConfidenceInterval,
    /// Coefficient of variation, 0 when the mean is 0.
    pub cv: f64,
    /// Population skewness, 0 when σ is 0.
    pub skewness: f64,
    /// Excess kurtosis, 0 when σ is 0.
    pub kurtosis: f64,
    /// Inferred shape.
    pub distribution: Distribution,
    /// Samples more than 3σ from the mean, in input order.
    pub outliers: Vec<f64>,
}

/// Nearest-rank percentile of an ascending, non-empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let rank = (p / 100.0 * n as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, n as i64 - 1) as usize;
    sorted[idx]
}

/// Reject empty or non-finite samples.
pub(crate) fn check_samples(samples: &[f64]) -> Result<(), StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if let Some((index, value)) = samples.iter().enumerate().find(|(_, x)| !x.is_finite()) {
        return Err(StatsError::NonFinite {
            index,
            value: *value,
        });
    }
    Ok(())
}

/// Sort ascending into a new vector.
pub(crate) fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Compute the full profile of `samples`.
///
/// # Errors
///
/// `StatsError::EmptySample` for an empty slice, `StatsError::NonFinite` if
/// any sample is NaN or infinite. Nothing is computed in either case.
pub fn profile(samples: &[f64]) -> Result<StatisticalProfile, StatsError> {
    check_samples(samples)?;

    let n = samples.len();
    let nf = n as f64;
    let sorted = sorted_copy(samples);

    let mean = samples.iter().sum::<f64>() / nf;
    let central_moment =
        |k: i32| samples.iter().map(|x| (x - mean).powi(k)).sum::<f64>() / nf;

    let variance = central_moment(2);
    let stddev = variance.sqrt();

    let se = stddev / nf.sqrt();
    let ci95 = ConfidenceInterval {
        lower: mean - Z_95 * se,
        upper: mean + Z_95 * se,
    };

    let cv = if mean != 0.0 { stddev / mean } else { 0.0 };

    let (skewness, kurtosis) = if stddev != 0.0 {
        (
            central_moment(3) / stddev.powi(3),
            central_moment(4) / stddev.powi(4) - 3.0,
        )
    } else {
        (0.0, 0.0)
    };

    let outliers = samples
        .iter()
        .copied()
        .filter(|x| (x - mean).abs() > 3.0 * stddev)
        .collect();

    let median = percentile(&sorted, 50.0);

    Ok(StatisticalProfile {
        n: n as u64,
        mean,
        stddev,
        median,
        p50: median,
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
        p999: percentile(&sorted, 99.9),
        min: sorted[0],
        max: sorted[n - 1],
        ci95,
        cv,
        skewness,
        kurtosis,
        distribution: Distribution::classify(skewness, kurtosis, cv),
        outliers,
    })
}
