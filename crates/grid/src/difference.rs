//! Cell-by-cell comparison of two grids

// crate modules
use crate::axis::{axes_match, AxisSpec};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::value_map::ValueMap;

// external crates
use log::{debug, warn};
use serde::Serialize;

/// Absolute and relative differences between a test grid and a reference
///
/// The absolute difference `test - reference` is defined everywhere. The
/// relative difference `(test - reference) / reference` is only defined where
/// the reference value is positive, and is `None` elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceResult {
    /// `test - reference` for every cell
    pub absolute: Grid,
    /// `(test - reference) / reference` as a fraction
    pub relative: ValueMap,
    /// Number of cells where the relative difference is undefined
    pub undefined: usize,
}

impl DifferenceResult {
    /// Axes shared by both inputs and all outputs
    pub fn axes(&self) -> &[AxisSpec] {
        self.absolute.axes()
    }

    /// Relative difference in percent
    pub fn relative_percent(&self) -> ValueMap {
        self.relative.map(|v| v * 100.0)
    }

    /// Fraction of cells with a defined relative difference
    pub fn defined_fraction(&self) -> f64 {
        let total = self.relative.len();
        (total - self.undefined) as f64 / total as f64
    }
}

/// Compare a test grid against a reference grid
///
/// Both grids must share the same axes: dimension count, bin counts, and
/// extents. There is no interpolation or resampling, mismatched grids are an
/// [Error::ShapeMismatch].
///
/// ```rust
/// # use dosekit_grid::{difference, AxisSpec, Grid};
/// let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
/// let reference = Grid::from_parts(vec![axis, axis], vec![2.0, 4.0, 0.0, 1.0]).unwrap();
/// let test = Grid::from_parts(vec![axis, axis], vec![3.0, 2.0, 1.0, 1.0]).unwrap();
///
/// let result = difference(&reference, &test).unwrap();
///
/// assert_eq!(result.absolute.values(), &[1.0, -2.0, 1.0, 0.0]);
/// assert_eq!(result.relative.values(), &[Some(0.5), Some(-0.5), None, Some(0.0)]);
/// assert_eq!(result.undefined, 1);
/// ```
pub fn difference(reference: &Grid, test: &Grid) -> Result<DifferenceResult> {
    check_axes(reference, test)?;

    let absolute = reference
        .values()
        .iter()
        .zip(test.values())
        .map(|(a, b)| b - a)
        .collect::<Vec<f64>>();

    let relative = reference
        .values()
        .iter()
        .zip(&absolute)
        .map(|(a, d)| (*a > 0.0).then(|| d / a))
        .collect::<Vec<Option<f64>>>();

    let axes = reference.axes().to_vec();
    let relative = ValueMap::from_raw(axes.clone(), relative);
    let undefined = relative.undefined_count();

    if undefined > 0 {
        warn!(
            "Relative difference undefined in {undefined} of {} cells (reference <= 0)",
            relative.len()
        );
    }
    debug!("Difference over {} cells, {undefined} undefined", relative.len());

    Ok(DifferenceResult {
        absolute: Grid::from_raw(axes, absolute),
        relative,
        undefined,
    })
}

/// Ratio `test / reference` where both values are positive
///
/// Cells where either grid is zero or negative are `None`.
///
/// ```rust
/// # use dosekit_grid::{ratio, AxisSpec, Grid};
/// let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
/// let reference = Grid::from_parts(vec![axis, axis], vec![2.0, 4.0, 0.0, 1.0]).unwrap();
/// let test = Grid::from_parts(vec![axis, axis], vec![3.0, 2.0, 1.0, 0.0]).unwrap();
///
/// let map = ratio(&reference, &test).unwrap();
/// assert_eq!(map.values(), &[Some(1.5), Some(0.5), None, None]);
/// ```
pub fn ratio(reference: &Grid, test: &Grid) -> Result<ValueMap> {
    check_axes(reference, test)?;

    let values = reference
        .values()
        .iter()
        .zip(test.values())
        .map(|(a, b)| (*a > 0.0 && *b > 0.0).then(|| b / a))
        .collect();

    Ok(ValueMap::from_raw(reference.axes().to_vec(), values))
}

/// Grids must be binned identically to be compared
fn check_axes(reference: &Grid, test: &Grid) -> Result<()> {
    if !axes_match(reference.axes(), test.axes()) {
        return Err(Error::ShapeMismatch {
            expected: reference.axes().to_vec(),
            found: test.axes().to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_bins() {
        let a = Grid::zeros(vec![AxisSpec::new(0.0, 1.0, 10).unwrap(); 2]).unwrap();
        let b = Grid::zeros(vec![AxisSpec::new(0.0, 1.0, 9).unwrap(); 2]).unwrap();
        assert!(matches!(
            difference(&a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn mismatched_dimensions() {
        let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
        let a = Grid::zeros(vec![axis; 2]).unwrap();
        let b = Grid::zeros(vec![axis; 3]).unwrap();
        assert!(ratio(&a, &b).is_err());
    }

    #[test]
    fn mismatched_extent() {
        let a = Grid::zeros(vec![AxisSpec::new(0.0, 1.0, 2).unwrap(); 2]).unwrap();
        let b = Grid::zeros(vec![AxisSpec::new(0.5, 1.5, 2).unwrap(); 2]).unwrap();
        assert!(difference(&a, &b).is_err());
    }

    #[test]
    fn negative_reference_is_undefined() {
        let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
        let a = Grid::from_parts(vec![axis; 2], vec![-1.0, 0.0, 1.0, 2.0]).unwrap();
        let b = Grid::from_parts(vec![axis; 2], vec![1.0, 1.0, 1.0, 1.0]).unwrap();

        let result = difference(&a, &b).unwrap();
        assert_eq!(result.undefined, 2);
        assert_eq!(result.defined_fraction(), 0.5);
        assert_eq!(
            result.relative_percent().values(),
            &[None, None, Some(0.0), Some(-50.0)]
        );
    }
}
