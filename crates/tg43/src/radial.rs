//! Radial dose function, g(r)

// crate modules
use crate::error::{Error, Result};
use crate::tally::{midpoints, shell_index, Tally};

// dosekit modules
use dosekit_grid::Grid;
use dosekit_samples::Sample;
use dosekit_utils::{f, SliceExt, ValueExt};

// standard library
use std::borrow::Borrow;

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Quantity computed within each radial shell
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Mean weight of everything in the shell
    #[default]
    Mean,
    /// Total weight in the shell
    Sum,
}

/// How a [RadialProfile] was normalised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Divided by the value of the reference shell
    Reference,
    /// Reference shell was zero or negative, values left unnormalised
    Identity,
}

/// Aggregates weights over concentric spherical shells
///
/// Builds a [RadialProfile] from samples or grid cells, normalised to the
/// shell with a centre closest to the reference radius (1 cm by default).
///
/// ```rust
/// # use dosekit_tg43::{RadialAggregator, Normalization};
/// # use dosekit_samples::Sample;
/// let samples = vec![
///     Sample::new(0.75, 0.0, 0.0, 4.0),
///     Sample::new(0.0, 1.25, 0.0, 2.0),
///     Sample::new(0.0, 0.0, 1.75, 1.0),
/// ];
///
/// let radial = RadialAggregator::new(vec![0.5, 1.0, 1.5, 2.0]).unwrap();
/// let profile = radial.from_samples(&samples);
///
/// // 1 cm is equally close to two centres, the first wins
/// assert_eq!(profile.centers, vec![0.75, 1.25, 1.75]);
/// assert_eq!(profile.reference_index, 0);
/// assert_eq!(profile.values, vec![1.0, 0.5, 0.25]);
/// assert_eq!(profile.normalization, Normalization::Reference);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RadialAggregator {
    edges: Vec<f64>,
    centers: Vec<f64>,
    reference_radius: f64,
    mode: Aggregate,
}

impl RadialAggregator {
    /// New aggregator over shells defined by ascending radial edges
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        edges.check_edges()?;
        if edges[0] < 0.0 {
            return Err(Error::NegativeRadius(edges[0]));
        }

        Ok(Self {
            centers: midpoints(&edges),
            edges,
            reference_radius: 1.0,
            mode: Aggregate::Mean,
        })
    }

    /// Set the radius to normalise to (cm), 1.0 by default
    pub fn set_reference_radius(&mut self, radius: f64) -> Result<()> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidReferenceRadius(radius));
        }
        self.reference_radius = radius;
        Ok(())
    }

    /// Set the quantity computed per shell, [Aggregate::Mean] by default
    pub fn set_mode(&mut self, mode: Aggregate) {
        self.mode = mode;
    }

    /// Shell edges (cm)
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Profile from point samples weighted by energy
    ///
    /// The radius is measured from the origin, `r = sqrt(x² + y² + z²)`.
    pub fn from_samples<I, S>(&self, samples: I) -> RadialProfile
    where
        I: IntoIterator<Item = S>,
        S: Borrow<Sample>,
    {
        self.profile(
            samples
                .into_iter()
                .map(|s| (s.borrow().radius(), s.borrow().energy)),
        )
    }

    /// Profile from grid cells weighted by cell value
    ///
    /// Each cell contributes once at its centre. 2D grids are in the z = 0
    /// plane, so the radius is `sqrt(x² + y²)`.
    pub fn from_grid(&self, grid: &Grid) -> RadialProfile {
        self.profile(grid.iter_cells().map(|([x, y, z], value)| {
            ((x * x + y * y + z * z).sqrt(), value)
        }))
    }

    /// Incremental accumulator, for feeding samples one at a time
    ///
    /// Useful when samples are streamed into something else, such as a
    /// [Binner](dosekit_grid::Binner), and should not be held in memory.
    ///
    /// ```rust
    /// # use dosekit_tg43::RadialAggregator;
    /// # use dosekit_samples::Sample;
    /// let samples = vec![Sample::new(1.0, 0.0, 0.0, 2.0), Sample::new(0.0, 2.0, 0.0, 1.0)];
    /// let radial = RadialAggregator::new(vec![0.5, 1.5, 2.5]).unwrap();
    ///
    /// let mut accumulator = radial.accumulator();
    /// let total: f64 = samples
    ///     .iter()
    ///     .inspect(|s| accumulator.add_sample(s))
    ///     .map(|s| s.energy)
    ///     .sum();
    ///
    /// assert_eq!(total, 3.0);
    /// assert_eq!(accumulator.finish(), radial.from_samples(&samples));
    /// ```
    pub fn accumulator(&self) -> RadialAccumulator<'_> {
        RadialAccumulator {
            aggregator: self,
            tally: Tally::new(self.centers.len()),
            outside: 0,
        }
    }

    /// Fold `(radius, weight)` pairs into a normalised profile
    fn profile<I: Iterator<Item = (f64, f64)>>(&self, points: I) -> RadialProfile {
        let mut accumulator = self.accumulator();
        points.for_each(|(r, weight)| accumulator.add(r, weight));
        accumulator.finish()
    }
}

/// Running shell totals of a [RadialAggregator]
#[derive(Debug, Clone)]
pub struct RadialAccumulator<'a> {
    aggregator: &'a RadialAggregator,
    tally: Tally,
    outside: usize,
}

impl RadialAccumulator<'_> {
    /// Add a weight at some radius (cm)
    pub fn add(&mut self, radius: f64, weight: f64) {
        match shell_index(&self.aggregator.edges, radius) {
            Some(i) => self.tally.add(i, weight),
            None => self.outside += 1,
        }
    }

    /// Add a sample weighted by its energy
    pub fn add_sample(&mut self, sample: &Sample) {
        self.add(sample.radius(), sample.energy);
    }

    /// Normalise everything added so far into a profile
    pub fn finish(self) -> RadialProfile {
        let aggregator = self.aggregator;
        let centers = &aggregator.centers;

        let raw = match aggregator.mode {
            Aggregate::Mean => self.tally.means(),
            Aggregate::Sum => self.tally.sums.clone(),
        };

        // centres are never empty after the edge check
        let reference_index = centers.nearest_index(aggregator.reference_radius).unwrap_or(0);
        let reference_value = raw[reference_index];

        let (values, normalization) = if reference_value > 0.0 {
            let values = raw.iter().map(|v| v / reference_value).collect();
            (values, Normalization::Reference)
        } else {
            warn!(
                "Reference shell at r = {:.3} cm has value {reference_value}, g(r) left unnormalised",
                centers[reference_index]
            );
            (raw.clone(), Normalization::Identity)
        };

        debug!(
            "Radial profile over {} shells, {} points outside",
            centers.len(),
            self.outside
        );

        RadialProfile {
            edges: aggregator.edges.clone(),
            centers: centers.clone(),
            values,
            raw,
            counts: self.tally.counts,
            mode: aggregator.mode,
            normalization,
            reference_index,
            reference_value,
            outside: self.outside,
        }
    }
}

/// Normalised radial profile, such as the radial dose function g(r)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialProfile {
    /// Shell edges (cm)
    pub edges: Vec<f64>,
    /// Shell centres (cm), increasing
    pub centers: Vec<f64>,
    /// Normalised value for each shell
    pub values: Vec<f64>,
    /// Value for each shell before normalisation
    pub raw: Vec<f64>,
    /// Number of contributors to each shell
    pub counts: Vec<usize>,
    /// Quantity computed per shell
    pub mode: Aggregate,
    /// Normalisation applied
    pub normalization: Normalization,
    /// Index of the reference shell
    pub reference_index: usize,
    /// Raw value of the reference shell
    pub reference_value: f64,
    /// Contributors outside every shell
    pub outside: usize,
}

impl RadialProfile {
    /// Iterate over `(r_center, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.centers.iter().copied().zip(self.values.iter().copied())
    }

    /// Radius of the reference shell centre (cm)
    pub fn reference_radius(&self) -> f64 {
        self.centers[self.reference_index]
    }

    /// True if the profile fell back to identity normalisation
    pub fn is_fallback(&self) -> bool {
        self.normalization == Normalization::Identity
    }

    /// Number of shells without any contributor
    pub fn empty_shells(&self) -> usize {
        self.counts.iter().filter(|n| **n == 0).count()
    }
}

impl std::fmt::Display for RadialProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!(
            "RadialProfile ({} shells, reference r = {:.3} cm, {:?})\n",
            self.centers.len(),
            self.reference_radius(),
            self.normalization
        );
        s += "    r(cm)      value        raw          count\n";
        for (i, (r, v)) in self.points().enumerate() {
            s += &f!(
                "    {:<10.4} {:<12.5} {:<12} {}\n",
                r,
                v,
                self.raw[i].sci(4, 2),
                self.counts[i]
            );
        }
        write!(f, "{}", s.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_mode() {
        let samples = [
            Sample::new(0.2, 0.0, 0.0, 1.0),
            Sample::new(0.0, 0.3, 0.0, 2.0),
            Sample::new(0.0, 0.0, 1.5, 6.0),
        ];
        let mut radial = RadialAggregator::new(vec![0.0, 1.0, 2.0]).unwrap();
        radial.set_mode(Aggregate::Sum);
        radial.set_reference_radius(1.5).unwrap();

        let profile = radial.from_samples(samples);
        assert_eq!(profile.raw, vec![3.0, 6.0]);
        assert_eq!(profile.values, vec![0.5, 1.0]);
        assert_eq!(profile.reference_index, 1);
    }

    #[test]
    fn identity_fallback() {
        let samples = [Sample::new(3.0, 0.0, 0.0, 2.0)];
        let radial = RadialAggregator::new(vec![0.5, 1.5, 2.5, 3.5]).unwrap();
        let profile = radial.from_samples(samples);

        assert_eq!(profile.normalization, Normalization::Identity);
        assert_eq!(profile.values, vec![0.0, 0.0, 2.0]);
        assert_eq!(profile.empty_shells(), 2);
        assert!(profile.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn outer_edge_is_outside() {
        let samples = [
            Sample::new(2.0, 0.0, 0.0, 1.0),
            Sample::new(0.0, 0.0, 0.0, 1.0),
        ];
        let radial = RadialAggregator::new(vec![0.1, 1.0, 2.0]).unwrap();
        let profile = radial.from_samples(samples);
        assert_eq!(profile.outside, 2);
    }

    #[test]
    fn invalid_settings() {
        assert!(RadialAggregator::new(vec![1.0]).is_err());
        assert!(RadialAggregator::new(vec![2.0, 1.0]).is_err());
        assert!(matches!(
            RadialAggregator::new(vec![-1.0, 1.0]),
            Err(Error::NegativeRadius(_))
        ));

        let mut radial = RadialAggregator::new(vec![0.0, 1.0]).unwrap();
        assert!(radial.set_reference_radius(0.0).is_err());
        assert!(radial.set_reference_radius(f64::NAN).is_err());
    }
}
