use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use dosekit_utils::{Error, SliceExt};
    /// assert_eq!([1.1_f64, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1_f64, f64::NAN, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    ///
    /// Floats do not implement `Ord`, so this uses `total_cmp` once every
    /// value is known to be finite.
    fn try_min(&self) -> Result<T>;

    /// Find the maximum value in float arrays
    ///
    /// Only provides the maximum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use dosekit_utils::{Error, SliceExt};
    /// assert_eq!([1.1_f64, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert_eq!([1.1_f64, f64::INFINITY].try_max(), Err(Error::SliceContainsUndefinedValues));
    /// ```
    fn try_max(&self) -> Result<T>;

    /// Find index bin containing 'value', where bins are low < value <= high
    ///
    /// A value on a bin edge returns the bin below. Values equal to the lowest
    /// bound are considered part of the first bin.
    ///
    /// This is how a reference angle sitting exactly on an edge is resolved,
    /// e.g. 90 degrees with 18 polar bins is assigned to the 80-90 bin.
    ///
    /// ```rust
    /// # use dosekit_utils::SliceExt;
    /// let bounds: Vec<f64> = vec![0.0, 0.1, 1.0, 20.0];
    ///
    /// assert_eq!(bounds.find_bin_inclusive(0.0 ), Ok(0));
    /// assert_eq!(bounds.find_bin_inclusive(0.5 ), Ok(1));
    /// assert_eq!(bounds.find_bin_inclusive(1.0 ), Ok(1));
    /// assert_eq!(bounds.find_bin_inclusive(20.0), Ok(2));
    ///
    /// assert!(bounds.find_bin_inclusive(-1.0).is_err());
    /// assert!(bounds.find_bin_inclusive(21.0).is_err());
    /// ```
    fn find_bin_inclusive(&self, value: T) -> Result<usize>;

    /// Find index bin containing 'value', where bins are low <= value < high
    ///
    /// A value on a bin edge returns the bin above. Values equal to the highest
    /// bound are considered part of the last bin, so the final bin is closed on
    /// both ends.
    ///
    /// ```rust
    /// # use dosekit_utils::SliceExt;
    /// let bounds: Vec<f64> = vec![0.0, 0.1, 1.0, 20.0];
    ///
    /// assert_eq!(bounds.find_bin_exclusive(0.0 ), Ok(0));
    /// assert_eq!(bounds.find_bin_exclusive(0.5 ), Ok(1));
    /// assert_eq!(bounds.find_bin_exclusive(1.0 ), Ok(2));
    /// assert_eq!(bounds.find_bin_exclusive(20.0), Ok(2));
    ///
    /// assert!(bounds.find_bin_exclusive(-1.0).is_err());
    /// assert!(bounds.find_bin_exclusive(21.0).is_err());
    /// ```
    fn find_bin_exclusive(&self, value: T) -> Result<usize>;

    /// Index of the value closest to `target`
    ///
    /// The first index wins on ties.
    ///
    /// ```rust
    /// # use dosekit_utils::SliceExt;
    /// let centres: Vec<f64> = vec![0.25, 0.75, 1.25, 1.75];
    /// assert_eq!(centres.nearest_index(1.0), Ok(1));
    /// assert_eq!(centres.nearest_index(9.0), Ok(3));
    /// ```
    fn nearest_index(&self, target: T) -> Result<usize>;

    /// Check the slice is usable as a set of bin edges
    ///
    /// Requires at least two finite values in strictly increasing order.
    ///
    /// ```rust
    /// # use dosekit_utils::{Error, SliceExt};
    /// assert!([0.0_f64, 1.0, 2.0].check_edges().is_ok());
    /// assert_eq!([0.0_f64, 2.0, 1.0].check_edges(), Err(Error::EdgesNotAscending { index: 2 }));
    /// ```
    fn check_edges(&self) -> Result<()>;
}

impl SliceExt<f64> for [f64] {
    fn try_min(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        self.iter()
            .min_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn try_max(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        self.iter()
            .max_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn find_bin_inclusive(&self, value: f64) -> Result<usize> {
        let (lower_bound, upper_bound) = bounds(self)?;

        // is the value relevant?
        if value < lower_bound || value > upper_bound {
            return Err(Error::ValueOutsideOfBounds {
                value,
                lower_bound,
                upper_bound,
            });
        }

        // special case for being on the lowest edge
        if value == lower_bound {
            return Ok(0);
        }

        // range INCLUSIVE of upper edge
        self.windows(2)
            .position(|w| w[0] < value && value <= w[1])
            .ok_or(Error::UncapturedErrorCondition)
    }

    fn find_bin_exclusive(&self, value: f64) -> Result<usize> {
        let (lower_bound, upper_bound) = bounds(self)?;

        // is the value relevant?
        if value < lower_bound || value > upper_bound {
            return Err(Error::ValueOutsideOfBounds {
                value,
                lower_bound,
                upper_bound,
            });
        }

        // special case for being on the upper edge
        if value == upper_bound {
            return Ok(self.len() - 2);
        }

        // range EXCLUSIVE of upper edge
        self.windows(2)
            .position(|w| w[0] <= value && value < w[1])
            .ok_or(Error::UncapturedErrorCondition)
    }

    fn nearest_index(&self, target: f64) -> Result<usize> {
        if self.iter().any(|v| !v.is_finite()) || !target.is_finite() {
            return Err(Error::SliceContainsUndefinedValues);
        };

        let mut best: Option<(usize, f64)> = None;
        for (i, v) in self.iter().enumerate() {
            let distance = (v - target).abs();
            match best {
                Some((_, d)) if d <= distance => (),
                _ => best = Some((i, distance)),
            }
        }

        best.map(|(i, _)| i).ok_or(Error::SliceContainsNoValues)
    }

    fn check_edges(&self) -> Result<()> {
        if self.len() < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: self.len(),
                minimum_required: 2,
            });
        }

        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        }

        match self.windows(2).position(|w| w[1] <= w[0]) {
            Some(i) => Err(Error::EdgesNotAscending { index: i + 1 }),
            None => Ok(()),
        }
    }
}

/// First and last edge, provided there are at least two
fn bounds(edges: &[f64]) -> Result<(f64, f64)> {
    match (edges.first(), edges.last()) {
        (Some(lower), Some(upper)) if edges.len() >= 2 => Ok((*lower, *upper)),
        _ => Err(Error::BelowMinimumSliceLength {
            length: edges.len(),
            minimum_required: 2,
        }),
    }
}
