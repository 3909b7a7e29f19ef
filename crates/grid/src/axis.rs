//! Uniform axis definitions

// crate modules
use crate::error::{Error, Result};

// dosekit modules
use dosekit_utils::SliceExt;

// external crates
use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing edges and extents
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Uniform binning along a single axis
///
/// `bins` equal-width bins cover the closed range `[min, max]`. The upper
/// boundary belongs to the last bin so that nothing sitting exactly on the
/// outer edge is lost.
///
/// ```rust
/// # use dosekit_grid::AxisSpec;
/// let axis = AxisSpec::new(-2.0, 2.0, 4).unwrap();
///
/// assert_eq!(axis.width(), 1.0);
/// assert_eq!(axis.edges(), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
/// assert_eq!(axis.centers(), vec![-1.5, -0.5, 0.5, 1.5]);
///
/// assert_eq!(axis.bin_index(0.0), Some(2));
/// assert_eq!(axis.bin_index(2.0), Some(3));
/// assert_eq!(axis.bin_index(2.5), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Lower bound of the first bin
    pub min: f64,
    /// Upper bound of the last bin
    pub max: f64,
    /// Number of bins
    pub bins: usize,
}

impl AxisSpec {
    /// New axis, checked for a finite non-empty range and at least one bin
    pub fn new(min: f64, max: f64, bins: usize) -> Result<Self> {
        let axis = Self { min, max, bins };
        axis.validate()?;
        Ok(axis)
    }

    /// Axis from a list of explicit bin edges
    ///
    /// Intended for histograms built elsewhere. The edges must be strictly
    /// increasing and uniform to within a small relative tolerance of the bin
    /// width.
    ///
    /// ```rust
    /// # use dosekit_grid::AxisSpec;
    /// let edges = (0..=180).map(|i| -9.0 + 0.1 * i as f64).collect::<Vec<f64>>();
    /// let axis = AxisSpec::from_edges(&edges).unwrap();
    /// assert_eq!(axis.bins, 180);
    ///
    /// assert!(AxisSpec::from_edges(&[0.0, 1.0, 3.0]).is_err());
    /// ```
    pub fn from_edges(edges: &[f64]) -> Result<Self> {
        edges.check_edges()?;

        let bins = edges.len() - 1;
        let min = edges[0];
        let max = edges[bins];
        let width = (max - min) / bins as f64;

        if let Some(index) = edges
            .iter()
            .enumerate()
            .position(|(i, e)| (e - (min + i as f64 * width)).abs() > 1e-6 * width)
        {
            return Err(Error::NonUniformEdges { index });
        }

        Self::new(min, max, bins)
    }

    /// Bin width
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.bins as f64
    }

    /// All `bins + 1` bin edges
    pub fn edges(&self) -> Vec<f64> {
        let width = self.width();
        let mut edges = (0..self.bins)
            .map(|i| self.min + i as f64 * width)
            .collect::<Vec<f64>>();
        edges.push(self.max);
        edges
    }

    /// Midpoint of every bin
    pub fn centers(&self) -> Vec<f64> {
        let width = self.width();
        (0..self.bins)
            .map(|i| self.min + (i as f64 + 0.5) * width)
            .collect()
    }

    /// Midpoint of a single bin
    pub fn center(&self, index: usize) -> Option<f64> {
        (index < self.bins).then(|| self.min + (index as f64 + 0.5) * self.width())
    }

    /// Bin containing `value`
    ///
    /// The bin is `floor((value - min) / width)`, clamped into range so that
    /// the upper boundary falls in the last bin. Values strictly outside
    /// `[min, max]` and non-finite values have no bin.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.min || value > self.max {
            return None;
        }
        let index = ((value - self.min) / self.width()).floor() as usize;
        Some(index.min(self.bins - 1))
    }

    /// True if `value` is inside the closed range `[min, max]`
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Same bin count and extents to within rounding
    pub fn matches(&self, other: &AxisSpec) -> bool {
        let tolerance = RELATIVE_TOLERANCE * self.width();
        self.bins == other.bins
            && (self.min - other.min).abs() <= tolerance
            && (self.max - other.max).abs() <= tolerance
    }

    /// Check the invariants of a deserialised or hand-built axis
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 || !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min
        {
            return Err(Error::InvalidAxis {
                min: self.min,
                max: self.max,
                bins: self.bins,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for AxisSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] in {} bins of {:.4}",
            self.min,
            self.max,
            self.bins,
            self.width()
        )
    }
}

/// Check a full set of axes for a 2D or 3D grid
pub(crate) fn validate_axes(axes: &[AxisSpec]) -> Result<()> {
    if !(2..=3).contains(&axes.len()) {
        return Err(Error::UnsupportedDimensions(axes.len()));
    }
    axes.iter().try_for_each(AxisSpec::validate)
}

/// True if both sets of axes describe the same grid
pub(crate) fn axes_match(a: &[AxisSpec], b: &[AxisSpec]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.matches(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_axes() {
        assert!(AxisSpec::new(0.0, 1.0, 0).is_err());
        assert!(AxisSpec::new(1.0, 1.0, 4).is_err());
        assert!(AxisSpec::new(2.0, 1.0, 4).is_err());
        assert!(AxisSpec::new(f64::NEG_INFINITY, 1.0, 4).is_err());
    }

    #[test]
    fn outer_edges() {
        let axis = AxisSpec::new(-9.0, 9.0, 180).unwrap();
        assert_eq!(axis.bin_index(-9.0), Some(0));
        assert_eq!(axis.bin_index(9.0), Some(179));
        assert_eq!(axis.bin_index(-9.000001), None);
        assert_eq!(axis.bin_index(f64::NAN), None);
    }

    #[test]
    fn interior_edges_go_up() {
        let axis = AxisSpec::new(0.0, 4.0, 4).unwrap();
        assert_eq!(axis.bin_index(1.0), Some(1));
        assert_eq!(axis.bin_index(0.999), Some(0));
        assert_eq!(axis.center(3), Some(3.5));
        assert_eq!(axis.center(4), None);
    }

    #[test]
    fn matching_tolerates_rounding() {
        let a = AxisSpec::new(-9.0, 9.0, 180).unwrap();
        let b = AxisSpec::new(-9.0 + 1e-13, 9.0, 180).unwrap();
        let c = AxisSpec::new(-9.0, 9.0, 90).unwrap();
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn dimensions() {
        let axis = AxisSpec::new(0.0, 1.0, 1).unwrap();
        assert!(validate_axes(&[axis]).is_err());
        assert!(validate_axes(&[axis; 2]).is_ok());
        assert!(validate_axes(&[axis; 3]).is_ok());
        assert!(validate_axes(&[axis; 4]).is_err());
    }
}
