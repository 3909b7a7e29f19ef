//! Folding point samples into regular grids

// crate modules
use crate::axis::{validate_axes, AxisSpec};
use crate::error::Result;
use crate::grid::{flat_index, shape_of, Grid};

// dosekit modules
use dosekit_samples::{Coordinate, Sample};
use dosekit_utils::{f, ValueExt};

// standard library
use std::borrow::Borrow;

// external crates
use log::{debug, warn};
use serde::Serialize;

/// Accumulates sample energy into a [Grid]
///
/// Every sample lands in exactly one cell, by the [AxisSpec::bin_index()] rule
/// on each axis. A 2D binner uses x and y only, which projects every sample
/// onto the z = 0 plane.
///
/// Two samples into a 4x4 grid:
///
/// ```rust
/// # use dosekit_grid::{AxisSpec, Binner};
/// # use dosekit_samples::Sample;
/// let axis = AxisSpec::new(-2.0, 2.0, 4).unwrap();
/// let binner = Binner::new(vec![axis, axis]).unwrap();
///
/// let samples = vec![
///     Sample::new(0.0, 0.0, 0.0, 10.0),
///     Sample::new(1.0, 0.0, 0.0, 5.0),
/// ];
/// let binned = binner.bin(&samples);
///
/// assert_eq!(binned.grid.values().iter().filter(|v| **v > 0.0).count(), 2);
/// assert_eq!(binned.grid.total(), 15.0);
/// assert_eq!(binned.summary.excluded, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Binner {
    axes: Vec<AxisSpec>,
    shape: Vec<usize>,
}

impl Binner {
    /// New binner for 2 or 3 axes
    pub fn new(axes: Vec<AxisSpec>) -> Result<Self> {
        validate_axes(&axes)?;
        let shape = shape_of(&axes);
        Ok(Self { axes, shape })
    }

    /// Axes of the grids produced
    pub fn axes(&self) -> &[AxisSpec] {
        &self.axes
    }

    /// Fold every sample into a new grid
    ///
    /// Works on anything that iterates samples or references to samples, so
    /// both a `Vec<Sample>` and a lazy `SampleStream` can be used directly.
    ///
    /// The result is the same regardless of sample order, up to floating point
    /// rounding in the sums.
    pub fn bin<I, S>(&self, samples: I) -> Binned
    where
        I: IntoIterator<Item = S>,
        S: Borrow<Sample>,
    {
        let mut values = vec![0.0; self.shape.iter().product()];
        let mut summary = BinSummary::default();

        for sample in samples {
            let sample = sample.borrow();

            if !sample.is_finite() {
                summary.invalid += 1;
                continue;
            }

            summary.total_energy += sample.energy;
            match self.cell(sample) {
                Some(i) => {
                    values[i] += sample.energy;
                    summary.binned += 1;
                }
                None => {
                    summary.excluded += 1;
                    summary.excluded_energy += sample.energy;
                }
            }
        }

        if summary.binned == 0 && summary.excluded > 0 {
            warn!("All {} samples fell outside the grid extent", summary.excluded);
        }
        if summary.invalid > 0 {
            warn!("Ignored {} samples with non-finite values", summary.invalid);
        }
        debug!("{summary}");

        Binned {
            grid: Grid::from_raw(self.axes.clone(), values),
            summary,
        }
    }

    /// Flat cell index for a sample, `None` if outside on any axis
    fn cell(&self, sample: &Sample) -> Option<usize> {
        let index = self
            .axes
            .iter()
            .enumerate()
            .map(|(d, axis)| {
                Coordinate::from_dimension(d).and_then(|c| axis.bin_index(sample.coordinate(c)))
            })
            .collect::<Option<Vec<usize>>>()?;
        flat_index(&self.shape, &index)
    }
}

/// Output of [Binner::bin()]
#[derive(Debug, Clone, PartialEq)]
pub struct Binned {
    /// Accumulated energy per cell
    pub grid: Grid,
    /// Accounting of every sample seen
    pub summary: BinSummary,
}

/// Accounting for a single binning pass
///
/// Conservation holds as
/// `grid.total() + excluded_energy == total_energy` to within rounding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct BinSummary {
    /// Samples accumulated into the grid
    pub binned: usize,
    /// Samples outside the extent on at least one axis
    pub excluded: usize,
    /// Samples with non-finite coordinates or energy, not in any total
    pub invalid: usize,
    /// Energy carried by excluded samples
    pub excluded_energy: f64,
    /// Energy over all binned and excluded samples
    pub total_energy: f64,
}

impl BinSummary {
    /// Energy that made it into the grid
    pub fn binned_energy(&self) -> f64 {
        self.total_energy - self.excluded_energy
    }

    /// Fraction of the total energy that was excluded, 0 if nothing was seen
    pub fn excluded_fraction(&self) -> f64 {
        if self.total_energy > 0.0 {
            self.excluded_energy / self.total_energy
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for BinSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = f!(
            "binned {} samples, excluded {} ({} of energy), invalid {}, total {} MeV",
            self.binned,
            self.excluded,
            self.excluded_fraction().percent(2),
            self.invalid,
            self.total_energy.sci(5, 2)
        );
        write!(f, "{s}")
    }
}
