//! Module for grid-related data and implementations

// crate modules
use crate::axis::{validate_axes, AxisSpec};
use crate::error::{Error, Result};

// dosekit modules
use dosekit_utils::{f, ValueExt};

// external crates
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Regular 2D or 3D grid of accumulated values
///
/// One [AxisSpec] per dimension, mapped onto x, y(, z) in order. A 2D grid lies
/// in the z = 0 plane.
///
/// Values are stored in a flat row-major vector with the first axis varying
/// slowest.
///
/// ```rust
/// # use dosekit_grid::{AxisSpec, Grid};
/// let x = AxisSpec::new(0.0, 2.0, 2).unwrap();
/// let y = AxisSpec::new(0.0, 3.0, 3).unwrap();
///
/// // x = 0 row first, then x = 1
/// let grid = Grid::from_parts(vec![x, y], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
///
/// assert_eq!(grid.shape(), vec![2, 3]);
/// assert_eq!(grid.get(&[1, 0]), Some(4.0));
/// assert_eq!(grid.total(), 21.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    axes: Vec<AxisSpec>,
    values: Vec<f64>,
}

impl Grid {
    /// New grid of zeros
    pub fn zeros(axes: Vec<AxisSpec>) -> Result<Self> {
        validate_axes(&axes)?;
        let length = axes.iter().map(|a| a.bins).product();
        Ok(Self {
            axes,
            values: vec![0.0; length],
        })
    }

    /// Grid from axes and a flat row-major value array
    ///
    /// Fails if the axes are invalid or the number of values does not match.
    pub fn from_parts(axes: Vec<AxisSpec>, values: Vec<f64>) -> Result<Self> {
        validate_axes(&axes)?;
        check_length(&axes, values.len())?;
        Ok(Self { axes, values })
    }

    /// Grid from explicit bin edges for each dimension
    ///
    /// This is the entry point for histograms built by another tool. Edges
    /// must be uniform, see [AxisSpec::from_edges()].
    ///
    /// ```rust
    /// # use dosekit_grid::Grid;
    /// let edges = vec![vec![-1.0, 0.0, 1.0], vec![0.0, 0.5, 1.0, 1.5]];
    /// let grid = Grid::from_edges(&edges, vec![0.0; 6]).unwrap();
    /// assert_eq!(grid.axes()[1].width(), 0.5);
    /// ```
    pub fn from_edges<E: AsRef<[f64]>>(edges: &[E], values: Vec<f64>) -> Result<Self> {
        let axes = edges
            .iter()
            .map(|e| AxisSpec::from_edges(e.as_ref()))
            .collect::<Result<Vec<AxisSpec>>>()?;
        Self::from_parts(axes, values)
    }

    /// Axis specification for every dimension
    pub fn axes(&self) -> &[AxisSpec] {
        &self.axes
    }

    /// Flat row-major values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the grid and keep the flat values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of dimensions, 2 or 3
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Number of bins in each dimension
    pub fn shape(&self) -> Vec<usize> {
        shape_of(&self.axes)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no cells, which a valid grid never has
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a multi-dimensional bin index
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        flat_index(&self.shape(), index).map(|i| self.values[i])
    }

    /// Sum over every cell
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Bin centres along one dimension
    pub fn centers(&self, dimension: usize) -> Result<Vec<f64>> {
        self.axes
            .get(dimension)
            .map(AxisSpec::centers)
            .ok_or(Error::IndexOutOfBounds {
                index: dimension,
                length: self.ndim(),
            })
    }

    /// `[x, y, z]` centre of every cell in storage order
    ///
    /// For 2D grids z is always 0.
    ///
    /// ```rust
    /// # use dosekit_grid::{AxisSpec, Grid};
    /// let axis = AxisSpec::new(-1.0, 1.0, 2).unwrap();
    /// let grid = Grid::zeros(vec![axis, axis]).unwrap();
    ///
    /// assert_eq!(
    ///     grid.cell_centers(),
    ///     vec![
    ///         [-0.5, -0.5, 0.0],
    ///         [-0.5,  0.5, 0.0],
    ///         [ 0.5, -0.5, 0.0],
    ///         [ 0.5,  0.5, 0.0],
    ///     ]
    /// );
    /// ```
    pub fn cell_centers(&self) -> Vec<[f64; 3]> {
        cell_centers(&self.axes)
    }

    /// Iterate over `([x, y, z], value)` for every cell
    pub fn iter_cells(&self) -> impl Iterator<Item = ([f64; 3], f64)> + '_ {
        self.cell_centers().into_iter().zip(self.values.iter().copied())
    }

    /// Sum out a single dimension of a 3D grid
    ///
    /// Collapses a 3D grid onto a 2D slab by summing along `dimension`. The
    /// remaining axes keep their order.
    ///
    /// ```rust
    /// # use dosekit_grid::{AxisSpec, Grid};
    /// let axis = AxisSpec::new(0.0, 2.0, 2).unwrap();
    /// let grid = Grid::from_parts(vec![axis; 3], (1..=8).map(f64::from).collect()).unwrap();
    ///
    /// // summing along z leaves (x, y)
    /// let xy = grid.project(2).unwrap();
    /// assert_eq!(xy.values(), &[3.0, 7.0, 11.0, 15.0]);
    /// assert_eq!(xy.total(), grid.total());
    /// ```
    pub fn project(&self, dimension: usize) -> Result<Grid> {
        if self.ndim() != 3 {
            return Err(Error::UnsupportedDimensions(self.ndim() - 1));
        }
        if dimension >= self.ndim() {
            return Err(Error::IndexOutOfBounds {
                index: dimension,
                length: self.ndim(),
            });
        }

        let shape = self.shape();
        let axes = self
            .axes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != dimension)
            .map(|(_, a)| *a)
            .collect::<Vec<AxisSpec>>();
        let reduced_shape = shape_of(&axes);

        let mut values = vec![0.0; reduced_shape.iter().product()];
        for (flat, value) in self.values.iter().enumerate() {
            let mut index = unravel(&shape, flat);
            index.remove(dimension);
            if let Some(i) = flat_index(&reduced_shape, &index) {
                values[i] += value;
            }
        }

        Grid::from_parts(axes, values)
    }

    /// Multiply every value by a constant factor
    ///
    /// For example converting energy per bin to dose with a mass and unit
    /// conversion.
    pub fn scale(&mut self, factor: f64) {
        self.values.iter_mut().for_each(|v| *v *= factor);
    }

    /// Grid from parts already known to be consistent
    pub(crate) fn from_raw(axes: Vec<AxisSpec>, values: Vec<f64>) -> Self {
        Self { axes, values }
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let labels = ["x", "y", "z"];
        let mut s = "Grid {\n".to_string();
        s += &f!(
            "    shape: {}\n",
            self.shape().iter().map(|n| n.to_string()).join("x")
        );
        for (label, axis) in labels.iter().zip(&self.axes) {
            s += &f!("    {label}: {axis}\n");
        }
        s += &f!("    total: {}\n", self.total().sci(5, 2));
        s += "}";
        write!(f, "{s}")
    }
}

// ! Layout helpers shared by grid-shaped types

/// Number of bins per axis
pub(crate) fn shape_of(axes: &[AxisSpec]) -> Vec<usize> {
    axes.iter().map(|a| a.bins).collect()
}

/// Ensure a flat array length matches the axes
pub(crate) fn check_length(axes: &[AxisSpec], found: usize) -> Result<()> {
    let expected = axes.iter().map(|a| a.bins).product();
    if found != expected {
        return Err(Error::ValueCountMismatch { expected, found });
    }
    Ok(())
}

/// Row-major flat index, `None` if any index is out of range
pub(crate) fn flat_index(shape: &[usize], index: &[usize]) -> Option<usize> {
    if index.len() != shape.len() {
        return None;
    }
    index
        .iter()
        .zip(shape)
        .try_fold(0, |flat, (&i, &n)| (i < n).then_some(flat * n + i))
}

/// Multi-dimensional index of a row-major flat index
pub(crate) fn unravel(shape: &[usize], mut flat: usize) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (i, n) in shape.iter().enumerate().rev() {
        index[i] = flat % n;
        flat /= n;
    }
    index
}

/// Cell centres for a set of axes in storage order, z = 0 for 2D
pub(crate) fn cell_centers(axes: &[AxisSpec]) -> Vec<[f64; 3]> {
    axes.iter()
        .map(AxisSpec::centers)
        .multi_cartesian_product()
        .map(|c| [c[0], c[1], c.get(2).copied().unwrap_or(0.0)])
        .collect()
}
