//! Outlier rejection and aggregation.
//!
//! A `FilterPolicy` decides, per sample, whether it is kept. The estimate is
//! the mean of the kept samples rounded to 2 decimals. If nothing survives,
//! the run fails with `AllFiltered`; there is no fallback to the unfiltered
//! mean.
//!
//! Every policy keeps all samples when the set has fewer than two elements or
//! no spread at all (min == max).

use tracing::debug;

use crate::error::VitalsError;
use crate::sampler::SampleSet;
use crate::util::round2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterPolicy {
    /// Keep `|x - mean| / pop_sd < threshold`.
    ZScore { threshold: f64 },
    /// Keep `[Q1 - k*IQR, Q3 + k*IQR]`, quartiles by median of halves.
    Iqr { k: f64 },
    /// Keep `|x - mean| <= k * sample_sd` (sample sd is 0 below two samples).
    StdDevBound { k: f64 },
    /// Keep `|x - mean| <= k * pop_sd`.
    SigmaWindow { k: f64 },
    /// Keep everything.
    None,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy::ZScore { threshold: 1.0 }
    }
}

impl FilterPolicy {
    /// Stable kebab-case name, matching the config file spelling.
    pub fn name(&self) -> &'static str {
        match self {
            FilterPolicy::ZScore { .. } => "z-score",
            FilterPolicy::Iqr { .. } => "iqr",
            FilterPolicy::StdDevBound { .. } => "std-dev-bound",
            FilterPolicy::SigmaWindow { .. } => "sigma-window",
            FilterPolicy::None => "none",
        }
    }

    /// Same policy with its threshold or multiplier replaced. `None` has no
    /// parameter and is returned unchanged.
    #[must_use]
    pub fn with_parameter(self, value: f64) -> Self {
        match self {
            FilterPolicy::ZScore { .. } => FilterPolicy::ZScore { threshold: value },
            FilterPolicy::Iqr { .. } => FilterPolicy::Iqr { k: value },
            FilterPolicy::StdDevBound { .. } => FilterPolicy::StdDevBound { k: value },
            FilterPolicy::SigmaWindow { .. } => FilterPolicy::SigmaWindow { k: value },
            FilterPolicy::None => FilterPolicy::None,
        }
    }
}

/// Final scalar of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Mean of the retained samples, 2 decimals.
    pub value: f64,
    pub retained: usize,
    pub rejected: usize,
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divide by n).
pub fn population_std_dev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}

/// Sample standard deviation (divide by n - 1); 0 below two samples.
pub fn sample_std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Median of an already sorted slice.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// First and third quartile of a sorted slice by median of halves.
///
/// For odd `n` the middle element belongs to neither half. With two samples
/// both halves are singletons, so Q1 and Q3 are the two values themselves.
pub fn quartiles_sorted(sorted: &[f64]) -> (f64, f64) {
    let n = sorted.len();
    if n < 2 {
        let v = sorted.first().copied().unwrap_or(0.0);
        return (v, v);
    }
    let lower = &sorted[..n / 2];
    let upper = &sorted[n.div_ceil(2)..];
    (median_sorted(lower), median_sorted(upper))
}

fn sorted_copy(xs: &[f64]) -> Vec<f64> {
    let mut v = xs.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

fn has_spread(xs: &[f64]) -> bool {
    let (min, max) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    max > min
}

/// Per-sample keep/drop decision under `policy`, in input order.
pub fn retention_mask(xs: &[f64], policy: FilterPolicy) -> Vec<bool> {
    if xs.len() < 2 || !has_spread(xs) {
        return vec![true; xs.len()];
    }
    match policy {
        FilterPolicy::ZScore { threshold } => {
            let m = mean(xs);
            let sd = population_std_dev(xs);
            if sd == 0.0 {
                return vec![true; xs.len()];
            }
            xs.iter().map(|x| ((x - m) / sd).abs() < threshold).collect()
        }
        FilterPolicy::Iqr { k } => {
            let (q1, q3) = quartiles_sorted(&sorted_copy(xs));
            let iqr = q3 - q1;
            let (lo, hi) = (q1 - k * iqr, q3 + k * iqr);
            xs.iter().map(|&x| x >= lo && x <= hi).collect()
        }
        FilterPolicy::StdDevBound { k } => {
            let m = mean(xs);
            let bound = k * sample_std_dev(xs);
            xs.iter().map(|x| (x - m).abs() <= bound).collect()
        }
        FilterPolicy::SigmaWindow { k } => {
            let m = mean(xs);
            let bound = k * population_std_dev(xs);
            xs.iter().map(|x| (x - m).abs() <= bound).collect()
        }
        FilterPolicy::None => vec![true; xs.len()],
    }
}

/// Retained subset under `policy`, in input order.
pub fn filter(xs: &[f64], policy: FilterPolicy) -> Vec<f64> {
    xs.iter()
        .zip(retention_mask(xs, policy))
        .filter_map(|(&x, keep)| keep.then_some(x))
        .collect()
}

/// Reduce `xs` to an estimate given a precomputed retention mask.
pub fn estimate_from_mask(xs: &[f64], mask: &[bool]) -> Result<Estimate, VitalsError> {
    let kept: Vec<f64> = xs
        .iter()
        .zip(mask)
        .filter_map(|(&x, &keep)| keep.then_some(x))
        .collect();
    if kept.is_empty() {
        return Err(VitalsError::AllFiltered { count: xs.len() });
    }
    Ok(Estimate {
        value: round2(mean(&kept)),
        retained: kept.len(),
        rejected: xs.len() - kept.len(),
    })
}

/// Filter `set` under `policy` and average what survives.
pub fn aggregate(set: &SampleSet, policy: FilterPolicy) -> Result<Estimate, VitalsError> {
    let xs = set.values();
    let mask = retention_mask(xs, policy);
    let est = estimate_from_mask(xs, &mask)?;
    debug!(
        policy = policy.name(),
        retained = est.retained,
        rejected = est.rejected,
        estimate = est.value,
        "sample set aggregated"
    );
    Ok(est)
}

/// Descriptive summary of a sample set, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleStats {
    /// `None` for an empty slice.
    pub fn from_values(xs: &[f64]) -> Option<Self> {
        let sorted = sorted_copy(xs);
        let (min, max) = (*sorted.first()?, *sorted.last()?);
        Some(Self {
            count: xs.len(),
            mean: mean(xs),
            median: median_sorted(&sorted),
            std_dev: sample_std_dev(xs),
            min,
            max,
        })
    }
}
