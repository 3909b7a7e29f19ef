//! Descriptive statistics over a set of values

// dosekit modules
use dosekit_utils::{f, ValueExt};

// external crates
use log::trace;
use serde::{Deserialize, Serialize};

/// Summary of a set of values
///
/// The standard deviation is the population value (divides by `n`), and all
/// percentiles interpolate linearly between ranks.
///
/// ```rust
/// # use dosekit_stats::RegionStats;
/// let stats = RegionStats::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
///
/// assert_eq!(stats.count, 4);
/// assert_eq!(stats.mean, 2.5);
/// assert_eq!(stats.median, 2.5);
/// assert_eq!(stats.p25, 1.75);
/// assert_eq!(stats.p75, 3.25);
/// assert_eq!(stats.min, 1.0);
/// assert_eq!(stats.max, 4.0);
/// assert!((stats.std - 1.25_f64.sqrt()).abs() < 1e-12);
///
/// assert_eq!(RegionStats::from_values(&[]), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// 25th percentile
    pub p25: f64,
    /// 75th percentile
    pub p75: f64,
}

impl RegionStats {
    /// Statistics of the finite values in a slice
    ///
    /// Non-finite values are ignored. Returns `None` when nothing is left.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect::<Vec<f64>>();

        if sorted.len() < values.len() {
            trace!("Ignored {} non-finite values", values.len() - sorted.len());
        }

        if sorted.is_empty() {
            return None;
        }

        sorted.sort_by(f64::total_cmp);

        let mut welford = Welford::default();
        sorted.iter().for_each(|v| welford.update(*v));

        Some(Self {
            count: sorted.len(),
            mean: compensated_sum(&sorted) / sorted.len() as f64,
            median: quantile_sorted(&sorted, 0.5),
            std: welford.population_variance().sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p25: quantile_sorted(&sorted, 0.25),
            p75: quantile_sorted(&sorted, 0.75),
        })
    }

    /// Interquartile range, `p75 - p25`
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

impl std::fmt::Display for RegionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = f!(
            "n = {}, mean = {}, median = {}, std = {}, range = [{}, {}], iqr = [{}, {}]",
            self.count,
            self.mean.sci(4, 2),
            self.median.sci(4, 2),
            self.std.sci(4, 2),
            self.min.sci(4, 2),
            self.max.sci(4, 2),
            self.p25.sci(4, 2),
            self.p75.sci(4, 2),
        );
        write!(f, "{s}")
    }
}

/// Quantile of sorted values by linear interpolation between ranks
///
/// For `n` values the position is `h = (n - 1) p`, interpolated between
/// `x[floor(h)]` and `x[floor(h) + 1]`. Callers guarantee a non-empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        sorted[n - 1]
    } else {
        (1.0 - g) * sorted[j] + g * sorted[j + 1]
    }
}

/// Neumaier compensated summation
pub(crate) fn compensated_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in values {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Single pass running mean and variance
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Welford {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Welford {
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Divides by `n`, zero when empty
    pub fn population_variance(&self) -> f64 {
        match self.count {
            0 => 0.0,
            n => self.m2 / n as f64,
        }
    }

    /// Divides by `n - 1`, zero for fewer than two values
    pub fn sample_variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value() {
        let stats = RegionStats::from_values(&[3.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.p25, 3.5);
        assert_eq!(stats.iqr(), 0.0);
    }

    #[test]
    fn non_finite_are_ignored() {
        let stats = RegionStats::from_values(&[1.0, f64::NAN, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(RegionStats::from_values(&[f64::NAN]), None);
    }

    #[test]
    fn quantiles() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 0.5), 3.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 5.0);
        assert!((quantile_sorted(&sorted, 0.1) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn welford_matches_two_pass() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut welford = Welford::default();
        values.iter().for_each(|v| welford.update(*v));

        assert_eq!(welford.count(), 8);
        assert!((welford.mean() - 5.0).abs() < 1e-15);
        assert!((welford.population_variance() - 4.0).abs() < 1e-12);
        assert!((welford.sample_variance() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn compensation() {
        let values = [1.0, 1e100, 1.0, -1e100];
        assert_eq!(compensated_sum(&values), 2.0);
    }
}
