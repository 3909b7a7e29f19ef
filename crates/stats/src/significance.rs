//! Sliding window one-sample t-tests over a value map

// crate modules
use crate::descriptive::Welford;
use crate::error::{Error, Result};

// dosekit modules
use dosekit_grid::{AxisSpec, ValueMap};
use dosekit_utils::{f, ValueExt};

// external crates
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Offset added to p before taking the log so that p = 0 stays finite
const P_FLOOR: f64 = 1e-10;

/// Result of the t-test for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStat {
    /// Index of the centre cell
    pub centre: Vec<usize>,
    /// Defined values in the window
    pub n: usize,
    /// Mean of the defined values
    pub mean: f64,
    /// Sample standard deviation of the defined values
    pub std: f64,
    /// t statistic against a mean of zero
    pub t: f64,
    /// Two-sided p-value
    pub p: f64,
    /// `-log10(p + 1e-10)`
    pub significance: f64,
}

impl WindowStat {
    /// True if the p-value is below `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p < alpha
    }
}

/// Local significance of a value map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Significance {
    /// Axes of the map that was tested
    pub axes: Vec<AxisSpec>,
    /// Window size along every dimension
    pub window: usize,
    /// Minimum number of defined values required per window
    pub min_valid: usize,
    /// Every window that was tested, ordered by centre index
    pub windows: Vec<WindowStat>,
    /// Windows with too few defined values
    pub skipped: usize,
}

impl Significance {
    /// Number of windows with a p-value below `alpha`
    pub fn significant(&self, alpha: f64) -> usize {
        self.windows.iter().filter(|w| w.is_significant(alpha)).count()
    }

    /// Window with the highest significance
    pub fn most_significant(&self) -> Option<&WindowStat> {
        self.windows
            .iter()
            .max_by(|a, b| a.significance.total_cmp(&b.significance))
    }
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!(
            "Local significance ({} windows of {}^{}, {} skipped)\n",
            self.windows.len(),
            self.window,
            self.axes.len(),
            self.skipped
        );
        s += &f!("    p < 0.05: {}\n", self.significant(0.05));
        s += &f!("    p < 0.01: {}\n", self.significant(0.01));
        if let Some(w) = self.most_significant() {
            s += &f!(
                "    peak: {:?}, mean = {}, t = {:.3}, p = {}",
                w.centre,
                w.mean.sci(4, 2),
                w.t,
                w.p.sci(3, 2)
            );
        }
        write!(f, "{}", s.trim_end())
    }
}

/// One-sample two-sided t-test of local means against zero
///
/// A cubic (or square) window of odd size slides over every cell where it
/// fits entirely inside the map. Undefined cells inside a window are ignored,
/// and windows with fewer than `min_valid` defined values are skipped.
///
/// A window with zero variance has p = 1 if its mean is zero, and p = 0
/// otherwise.
///
/// ```rust
/// # use dosekit_grid::{AxisSpec, ValueMap};
/// # use dosekit_stats::local_significance;
/// let axis = AxisSpec::new(0.0, 5.0, 5).unwrap();
/// let values = (0..25).map(|i| Some(if i % 2 == 0 { 1.0 } else { 1.2 })).collect();
/// let map = ValueMap::new(vec![axis, axis], values).unwrap();
///
/// let result = local_significance(&map, 3, 5).unwrap();
///
/// // interior 3 x 3 centres only
/// assert_eq!(result.windows.len(), 9);
/// assert_eq!(result.skipped, 0);
/// assert!(result.windows.iter().all(|w| w.n == 9 && w.p < 1e-6));
/// ```
pub fn local_significance(map: &ValueMap, window: usize, min_valid: usize) -> Result<Significance> {
    if window == 0 || window % 2 == 0 {
        return Err(Error::InvalidWindow(window));
    }
    if min_valid < 2 {
        return Err(Error::InvalidMinimumCount(min_valid));
    }

    let shape = map.shape();
    let half = window / 2;

    let mut windows = Vec::new();
    let mut skipped = 0;

    // centres where the whole window fits, empty if the window is too large
    let centres = shape
        .iter()
        .map(|n| half..n.saturating_sub(half))
        .multi_cartesian_product();

    let offsets = shape
        .iter()
        .map(|_| 0..window)
        .multi_cartesian_product()
        .collect::<Vec<Vec<usize>>>();

    for centre in centres {
        let mut welford = Welford::default();

        for offset in &offsets {
            let index = centre
                .iter()
                .zip(offset)
                .map(|(c, o)| c + o - half)
                .collect::<Vec<usize>>();

            if let Some(value) = map.get(&index) {
                welford.update(value);
            }
        }

        if welford.count() < min_valid {
            skipped += 1;
            continue;
        }

        windows.push(t_test(centre, &welford)?);
    }

    if skipped > 0 {
        warn!("Skipped {skipped} windows with fewer than {min_valid} defined values");
    }
    debug!(
        "Tested {} windows of size {window} over {:?}",
        windows.len(),
        shape
    );

    Ok(Significance {
        axes: map.axes().to_vec(),
        window,
        min_valid,
        windows,
        skipped,
    })
}

/// Test a window mean against zero
fn t_test(centre: Vec<usize>, welford: &Welford) -> Result<WindowStat> {
    let n = welford.count();
    let mean = welford.mean();
    let std = welford.sample_variance().sqrt();

    let (t, p) = if std > 0.0 {
        let t = mean / (std / (n as f64).sqrt());
        (t, two_sided_p(t, (n - 1) as f64)?)
    } else if mean == 0.0 {
        (0.0, 1.0)
    } else {
        (mean.signum() * f64::INFINITY, 0.0)
    };

    Ok(WindowStat {
        centre,
        n,
        mean,
        std,
        t,
        p,
        significance: -(p + P_FLOOR).log10(),
    })
}

/// Probability of a t statistic at least as extreme as `t`, either sign
fn two_sided_p(t: f64, df: f64) -> Result<f64> {
    let distribution =
        StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Distribution(e.to_string()))?;
    Ok((2.0 * distribution.sf(t.abs())).min(1.0))
}
