//! Anisotropy function, F(r, θ)

// crate modules
use crate::error::{Error, Result};
use crate::tally::{midpoints, shell_index, Tally};

// dosekit modules
use dosekit_grid::Grid;
use dosekit_samples::Sample;
use dosekit_utils::{f, SliceExt};

// standard library
use std::borrow::Borrow;
use std::f64::consts::{FRAC_PI_2, PI};

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Tolerance when comparing polar angles against edges
const ANGLE_TOLERANCE: f64 = 1e-9;

/// Aggregates weights over radial shells and polar angle bins
///
/// The polar angle is measured from the +z axis, `θ = arccos(z / r)`. Within
/// every radial shell the mean weight per angular bin is divided by the mean
/// of the reference bin in the same shell, which is the transverse axis
/// (θ = 90°) by default.
///
/// The reference bin is the one with `low < θ_ref <= high`, so a reference
/// sitting on an edge selects the bin below it. With 18 bins of 10° this is
/// the 80-90° bin.
///
/// ```rust
/// # use dosekit_tg43::AngularAggregator;
/// # use dosekit_samples::Sample;
/// let radial_edges = vec![0.5, 1.5];
/// let angular_edges = vec![0.0, std::f64::consts::FRAC_PI_4, std::f64::consts::FRAC_PI_2];
/// let angular = AngularAggregator::new(radial_edges, angular_edges).unwrap();
///
/// let samples = vec![
///     Sample::new(0.0, 0.0, 1.0, 0.5),  // along the source axis
///     Sample::new(1.0, 0.0, 0.1, 2.0),  // close to transverse
/// ];
/// let profile = angular.from_samples(&samples);
///
/// assert_eq!(profile.reference_index, 1);
/// assert_eq!(profile.ratios[0], vec![0.25, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AngularAggregator {
    radial_edges: Vec<f64>,
    angular_edges: Vec<f64>,
    reference_angle: f64,
    reference_index: usize,
}

impl AngularAggregator {
    /// New aggregator from radial shell edges (cm) and polar edges (radians)
    ///
    /// Polar edges must lie within `[0, π]` and cover the transverse axis,
    /// which is the default reference angle.
    pub fn new(radial_edges: Vec<f64>, angular_edges: Vec<f64>) -> Result<Self> {
        radial_edges.check_edges()?;
        if radial_edges[0] < 0.0 {
            return Err(Error::NegativeRadius(radial_edges[0]));
        }

        angular_edges.check_edges()?;
        let (min, max) = (angular_edges[0], angular_edges[angular_edges.len() - 1]);
        if min < 0.0 || max > PI + ANGLE_TOLERANCE {
            return Err(Error::InvalidAngularEdges { min, max });
        }

        let reference_index = reference_bin(&angular_edges, FRAC_PI_2)?;

        Ok(Self {
            radial_edges,
            angular_edges,
            reference_angle: FRAC_PI_2,
            reference_index,
        })
    }

    /// Polar edges for `bins` equal bins from 0 to π
    ///
    /// 18 bins gives the usual 10° tabulation of F(r, θ).
    pub fn uniform_angular_edges(bins: usize) -> Vec<f64> {
        let width = PI / bins as f64;
        let mut edges = (0..bins).map(|i| i as f64 * width).collect::<Vec<f64>>();
        edges.push(PI);
        edges
    }

    /// Set the reference angle (radians), π/2 by default
    pub fn set_reference_angle(&mut self, angle: f64) -> Result<()> {
        self.reference_index = reference_bin(&self.angular_edges, angle)?;
        self.reference_angle = angle;
        Ok(())
    }

    /// Index of the angular reference bin
    pub fn reference_index(&self) -> usize {
        self.reference_index
    }

    /// Profile from point samples weighted by energy
    ///
    /// A sample at the origin has no polar angle and is counted in
    /// `AngularProfile::at_origin`.
    pub fn from_samples<I, S>(&self, samples: I) -> AngularProfile
    where
        I: IntoIterator<Item = S>,
        S: Borrow<Sample>,
    {
        self.profile(samples.into_iter().map(|s| {
            let s = s.borrow();
            (s.radius(), s.polar_angle(), s.energy)
        }))
    }

    /// Profile from the cells of a 3D grid weighted by cell value
    ///
    /// Every cell of a 2D grid lies on the transverse plane, which has no
    /// angular information, so these are an [Error::UnsupportedGrid].
    pub fn from_grid(&self, grid: &Grid) -> Result<AngularProfile> {
        if grid.ndim() != 3 {
            return Err(Error::UnsupportedGrid(grid.ndim()));
        }

        Ok(self.profile(grid.iter_cells().map(|([x, y, z], value)| {
            let sample = Sample::new(x, y, z, value);
            (sample.radius(), sample.polar_angle(), value)
        })))
    }

    /// Fold `(radius, angle, weight)` triples into a normalised profile
    fn profile<I>(&self, points: I) -> AngularProfile
    where
        I: Iterator<Item = (f64, Option<f64>, f64)>,
    {
        let n_shells = self.radial_edges.len() - 1;
        let n_angles = self.angular_edges.len() - 1;

        let mut tallies = vec![Tally::new(n_angles); n_shells];
        let mut at_origin = 0;
        let mut outside = 0;

        for (r, theta, weight) in points {
            let Some(theta) = theta else {
                at_origin += 1;
                continue;
            };

            let shell = shell_index(&self.radial_edges, r);
            let bin = self.angular_edges.find_bin_exclusive(theta).ok();

            match (shell, bin) {
                (Some(i), Some(j)) => tallies[i].add(j, weight),
                _ => outside += 1,
            }
        }

        let means = tallies.iter().map(Tally::means).collect::<Vec<Vec<f64>>>();
        let mut fallback_shells = Vec::new();

        let ratios = means
            .iter()
            .enumerate()
            .map(|(i, shell)| {
                let reference = shell[self.reference_index];
                if reference > 0.0 {
                    shell.iter().map(|m| (m / reference).max(0.0)).collect()
                } else {
                    fallback_shells.push(i);
                    vec![1.0; n_angles]
                }
            })
            .collect::<Vec<Vec<f64>>>();

        if !fallback_shells.is_empty() {
            warn!(
                "Reference angular bin empty or non-positive in {} of {n_shells} shells, ratios set to 1.0",
                fallback_shells.len()
            );
        }
        if at_origin > 0 {
            debug!("Skipped {at_origin} points at the origin with no polar angle");
        }
        debug!("Angular profile over {n_shells}x{n_angles} bins, {outside} points outside");

        AngularProfile {
            radial_centers: midpoints(&self.radial_edges),
            angular_centers: midpoints(&self.angular_edges),
            radial_edges: self.radial_edges.clone(),
            angular_edges: self.angular_edges.clone(),
            ratios,
            means,
            counts: tallies.into_iter().map(|t| t.counts).collect(),
            reference_angle: self.reference_angle,
            reference_index: self.reference_index,
            fallback_shells,
            at_origin,
            outside,
        }
    }
}

/// Bin containing the reference angle, resolving edges to the bin below
///
/// Edges built by repeated addition rarely hit π/2 exactly, so an angle within
/// rounding of an edge is treated as on it.
fn reference_bin(edges: &[f64], angle: f64) -> Result<usize> {
    if let Some(k) = edges
        .iter()
        .position(|e| (e - angle).abs() <= ANGLE_TOLERANCE)
    {
        return Ok(k.saturating_sub(1));
    }

    edges
        .find_bin_inclusive(angle)
        .map_err(|_| Error::ReferenceOutOfRange {
            value: angle,
            lower: edges[0],
            upper: edges[edges.len() - 1],
        })
}

/// Radius by polar angle matrix of ratios, such as the anisotropy function
///
/// Every ratio is finite and non-negative. Rows are radial shells and columns
/// are polar angle bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularProfile {
    /// Radial shell edges (cm)
    pub radial_edges: Vec<f64>,
    /// Polar angle edges (radians)
    pub angular_edges: Vec<f64>,
    /// Radial shell centres (cm)
    pub radial_centers: Vec<f64>,
    /// Polar angle bin centres (radians)
    pub angular_centers: Vec<f64>,
    /// Ratio to the reference bin, `[shell][angle]`
    pub ratios: Vec<Vec<f64>>,
    /// Mean weight before normalisation, `[shell][angle]`
    pub means: Vec<Vec<f64>>,
    /// Number of contributors, `[shell][angle]`
    pub counts: Vec<Vec<usize>>,
    /// Reference angle (radians)
    pub reference_angle: f64,
    /// Index of the reference angular bin
    pub reference_index: usize,
    /// Shells with every ratio set to 1.0 for lack of a usable reference
    pub fallback_shells: Vec<usize>,
    /// Points at r = 0, where the polar angle is undefined
    pub at_origin: usize,
    /// Points outside of every shell
    pub outside: usize,
}

impl AngularProfile {
    /// Ratio for a single shell and angular bin
    pub fn ratio(&self, shell: usize, bin: usize) -> Option<f64> {
        self.ratios.get(shell).and_then(|row| row.get(bin)).copied()
    }

    /// True if the shell fell back to unit ratios
    pub fn is_fallback(&self, shell: usize) -> bool {
        self.fallback_shells.contains(&shell)
    }

    /// Polar angle bin centres in degrees
    pub fn angular_centers_degrees(&self) -> Vec<f64> {
        self.angular_centers.iter().map(|a| a.to_degrees()).collect()
    }
}

impl std::fmt::Display for AngularProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!(
            "AngularProfile ({} shells x {} angles, reference bin {} at {:.1} deg)\n",
            self.radial_centers.len(),
            self.angular_centers.len(),
            self.reference_index,
            self.reference_angle.to_degrees()
        );
        s += "    theta(deg)";
        for r in &self.radial_centers {
            s += &f!(" {:>9}", f!("{r:.2}cm"));
        }
        s += "\n";
        for (j, theta) in self.angular_centers_degrees().iter().enumerate() {
            s += &f!("    {theta:<10.1}");
            for row in &self.ratios {
                s += &f!(" {:>9.4}", row[j]);
            }
            s += "\n";
        }
        if !self.fallback_shells.is_empty() {
            s += &f!("    fallback shells: {:?}\n", self.fallback_shells);
        }
        write!(f, "{}", s.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn original_binning() -> AngularAggregator {
        let radial = vec![0.5, 1.0, 2.0, 3.0, 5.0, 7.5, 10.0];
        AngularAggregator::new(radial, AngularAggregator::uniform_angular_edges(18)).unwrap()
    }

    #[test]
    fn transverse_reference_is_bin_below() {
        assert_eq!(original_binning().reference_index(), 8);
    }

    #[test]
    fn reference_angle_outside() {
        let mut angular = AngularAggregator::new(
            vec![0.0, 1.0],
            vec![0.0, FRAC_PI_2, PI],
        )
        .unwrap();
        assert!(angular.set_reference_angle(4.0).is_err());
        assert_eq!(angular.reference_index(), 0);
        angular.set_reference_angle(3.0).unwrap();
        assert_eq!(angular.reference_index(), 1);
    }

    #[test]
    fn invalid_angular_edges() {
        assert!(matches!(
            AngularAggregator::new(vec![0.0, 1.0], vec![0.0, 4.0]),
            Err(Error::InvalidAngularEdges { .. })
        ));
        // must cover the transverse axis
        assert!(matches!(
            AngularAggregator::new(vec![0.0, 1.0], vec![0.0, 1.0]),
            Err(Error::ReferenceOutOfRange { .. })
        ));
    }

    #[test]
    fn origin_is_counted() {
        let profile = original_binning().from_samples([Sample::new(0.0, 0.0, 0.0, 1.0)]);
        assert_eq!(profile.at_origin, 1);
        assert_eq!(profile.fallback_shells.len(), 6);
    }

    #[test]
    fn poles_are_binned() {
        let profile = original_binning().from_samples([
            Sample::new(0.0, 0.0, 1.5, 1.0),
            Sample::new(0.0, 0.0, -1.5, 1.0),
        ]);
        assert_eq!(profile.counts[1][0], 1);
        assert_eq!(profile.counts[1][17], 1);
        assert_eq!(profile.outside, 0);
    }

    #[test]
    fn planar_grids_are_rejected() {
        let axis = dosekit_grid::AxisSpec::new(-1.0, 1.0, 2).unwrap();
        let grid = Grid::zeros(vec![axis, axis]).unwrap();
        assert!(matches!(
            original_binning().from_grid(&grid),
            Err(Error::UnsupportedGrid(2))
        ));
    }
}
