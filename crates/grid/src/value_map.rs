//! Grid-shaped values that may be undefined

// crate modules
use crate::axis::{validate_axes, AxisSpec};
use crate::error::Result;
use crate::grid::{cell_centers, check_length, flat_index, shape_of, Grid};

// external crates
use serde::{Deserialize, Serialize};

/// Grid-shaped map of values where some cells have no defined value
///
/// `None` is the one and only representation of an undefined ratio. There is
/// no NaN or infinity stored for division by zero, so any consumer has to
/// handle the undefined cells explicitly.
///
/// ```rust
/// # use dosekit_grid::{AxisSpec, ValueMap};
/// let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
/// let map = ValueMap::new(vec![axis, axis], vec![Some(0.1), None, Some(-0.3), None]).unwrap();
///
/// assert_eq!(map.get(&[0, 0]), Some(0.1));
/// assert_eq!(map.get(&[0, 1]), None);
/// assert_eq!(map.undefined_count(), 2);
/// assert_eq!(map.defined().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMap {
    axes: Vec<AxisSpec>,
    values: Vec<Option<f64>>,
}

impl ValueMap {
    /// Map from axes and a flat row-major array of optional values
    pub fn new(axes: Vec<AxisSpec>, values: Vec<Option<f64>>) -> Result<Self> {
        validate_axes(&axes)?;
        check_length(&axes, values.len())?;
        Ok(Self { axes, values })
    }

    /// Map with every grid value defined
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            axes: grid.axes().to_vec(),
            values: grid.values().iter().map(|v| Some(*v)).collect(),
        }
    }

    /// Axis specification for every dimension
    pub fn axes(&self) -> &[AxisSpec] {
        &self.axes
    }

    /// Flat row-major values
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of dimensions, 2 or 3
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Number of bins in each dimension
    pub fn shape(&self) -> Vec<usize> {
        shape_of(&self.axes)
    }

    /// Total number of cells, defined or not
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no cells
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a multi-dimensional index, `None` if undefined or out of range
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        flat_index(&self.shape(), index).and_then(|i| self.values[i])
    }

    /// All defined values in storage order
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    /// Number of undefined cells
    pub fn undefined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// `[x, y, z]` centre of every cell in storage order
    pub fn cell_centers(&self) -> Vec<[f64; 3]> {
        cell_centers(&self.axes)
    }

    /// Apply a function to every defined value, keeping undefined cells
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> ValueMap {
        Self {
            axes: self.axes.clone(),
            values: self.values.iter().map(|v| v.map(&f)).collect(),
        }
    }

    /// Grid with undefined cells replaced by `fill`
    pub fn to_grid(&self, fill: f64) -> Grid {
        Grid::from_raw(
            self.axes.clone(),
            self.values.iter().map(|v| v.unwrap_or(fill)).collect(),
        )
    }

    /// Map from parts already known to be consistent
    pub(crate) fn from_raw(axes: Vec<AxisSpec>, values: Vec<Option<f64>>) -> Self {
        Self { axes, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_undefined() {
        let axis = AxisSpec::new(0.0, 1.0, 1).unwrap();
        let map = ValueMap::new(vec![axis; 3], vec![Some(0.25)]).unwrap();
        assert_eq!(map.map(|v| v * 100.0).get(&[0, 0, 0]), Some(25.0));

        let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
        let map = ValueMap::new(vec![axis, axis], vec![None, Some(1.0), None, None]).unwrap();
        let doubled = map.map(|v| v * 2.0);
        assert_eq!(doubled.undefined_count(), 3);
        assert_eq!(doubled.to_grid(-1.0).values(), &[-1.0, 2.0, -1.0, -1.0]);
    }

    #[test]
    fn length_is_checked() {
        let axis = AxisSpec::new(0.0, 1.0, 2).unwrap();
        assert!(ValueMap::new(vec![axis, axis], vec![None; 3]).is_err());
    }
}
