//! Geometric regions, masks, and per-region statistics

// crate modules
use crate::descriptive::RegionStats;
use crate::error::{Error, Result};

// dosekit modules
use dosekit_grid::{AxisSpec, ValueMap};
use dosekit_utils::f;

// external crates
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Geometric predicate over cell centre coordinates (cm)
///
/// Regions are evaluated at cell centres. Cells of a 2D map sit in the z = 0
/// plane.
///
/// Regions are serialised with a `shape` tag so they can be written directly
/// in a configuration file:
///
/// ```json
/// { "shape": "box", "x": [-4.0, 4.0], "y": [1.0, 9.0] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Region {
    /// Every cell
    All,
    /// Axis aligned box, inclusive on every side, unbounded in z if omitted
    Box {
        x: [f64; 2],
        y: [f64; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<[f64; 2]>,
    },
    /// Points within `radius` of `center`
    Sphere {
        #[serde(default)]
        center: [f64; 3],
        radius: f64,
    },
    /// Points with `inner < |p - center| <= outer`
    Shell {
        #[serde(default)]
        center: [f64; 3],
        inner: f64,
        outer: f64,
    },
    /// Cylinder along z, unbounded in z if omitted
    Cylinder {
        #[serde(default)]
        center: [f64; 2],
        radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<[f64; 2]>,
    },
    /// Complement of a region
    Not { region: Box<Region> },
    /// Intersection of all regions
    And { regions: Vec<Region> },
    /// Union of all regions
    Or { regions: Vec<Region> },
}

impl Region {
    /// Sphere of some radius about the origin
    pub fn sphere(radius: f64) -> Self {
        Self::Sphere {
            center: [0.0; 3],
            radius,
        }
    }

    /// Spherical shell about the origin
    pub fn shell(inner: f64, outer: f64) -> Self {
        Self::Shell {
            center: [0.0; 3],
            inner,
            outer,
        }
    }

    /// Box over x and y with no z limit
    pub fn rectangle(x: [f64; 2], y: [f64; 2]) -> Self {
        Self::Box { x, y, z: None }
    }

    /// Complement of this region
    pub fn not(self) -> Self {
        Self::Not {
            region: Box::new(self),
        }
    }

    /// Intersection with another region
    pub fn and(self, other: Region) -> Self {
        match self {
            Self::And { mut regions } => {
                regions.push(other);
                Self::And { regions }
            }
            region => Self::And {
                regions: vec![region, other],
            },
        }
    }

    /// Union with another region
    pub fn or(self, other: Region) -> Self {
        match self {
            Self::Or { mut regions } => {
                regions.push(other);
                Self::Or { regions }
            }
            region => Self::Or {
                regions: vec![region, other],
            },
        }
    }

    /// True if a point lies within the region
    ///
    /// ```rust
    /// # use dosekit_stats::Region;
    /// let periphery = Region::shell(6.0, 9.0).and(Region::rectangle([-4.0, 4.0], [1.0, 9.0]).not());
    ///
    /// assert!(periphery.contains([0.0, -7.0, 0.0]));
    /// assert!(!periphery.contains([0.0, 7.0, 0.0]));
    /// assert!(!periphery.contains([0.0, 0.0, 0.0]));
    /// ```
    pub fn contains(&self, point: [f64; 3]) -> bool {
        let [x, y, z] = point;
        match self {
            Self::All => true,
            Self::Box { x: bx, y: by, z: bz } => {
                within(x, bx) && within(y, by) && bz.map_or(true, |bz| within(z, &bz))
            }
            Self::Sphere { center, radius } => distance(point, *center) <= *radius,
            Self::Shell {
                center,
                inner,
                outer,
            } => {
                let r = distance(point, *center);
                *inner < r && r <= *outer
            }
            Self::Cylinder { center, radius, z: cz } => {
                let rho = ((x - center[0]).powi(2) + (y - center[1]).powi(2)).sqrt();
                rho <= *radius && cz.map_or(true, |cz| within(z, &cz))
            }
            Self::Not { region } => !region.contains(point),
            Self::And { regions } => regions.iter().all(|r| r.contains(point)),
            Self::Or { regions } => regions.iter().any(|r| r.contains(point)),
        }
    }

    /// Evaluate the region at every cell centre of a set of axes
    ///
    /// The mask is named after the region, use [Mask::named] to change it.
    pub fn mask(&self, axes: &[AxisSpec]) -> Mask {
        let cells = axes
            .iter()
            .map(AxisSpec::centers)
            .multi_cartesian_product()
            .map(|c| {
                let at = |i: usize| c.get(i).copied().unwrap_or(0.0);
                self.contains([at(0), at(1), at(2)])
            })
            .collect();

        Mask {
            name: self.to_string(),
            axes: axes.to_vec(),
            cells,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::All => "all".to_string(),
            Self::Box { x, y, z } => match z {
                Some(z) => f!("box({x:?}, {y:?}, {z:?})"),
                None => f!("box({x:?}, {y:?})"),
            },
            Self::Sphere { radius, .. } => f!("sphere(r <= {radius})"),
            Self::Shell { inner, outer, .. } => f!("shell({inner} < r <= {outer})"),
            Self::Cylinder { radius, .. } => f!("cylinder(rho <= {radius})"),
            Self::Not { region } => f!("not {region}"),
            Self::And { regions } => f!("({})", regions.iter().join(" and ")),
            Self::Or { regions } => f!("({})", regions.iter().join(" or ")),
        };
        write!(f, "{s}")
    }
}

fn within(value: f64, range: &[f64; 2]) -> bool {
    range[0] <= value && value <= range[1]
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// A region with a name, as written in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRegion {
    /// Label used in reports
    pub name: String,
    /// Geometry
    pub region: Region,
}

impl NamedRegion {
    /// Label a region
    pub fn new<S: Into<String>>(name: S, region: Region) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }

    /// Named mask over a set of axes
    pub fn mask(&self, axes: &[AxisSpec]) -> Mask {
        self.region.mask(axes).named(&self.name)
    }

    /// Regions of the heterogeneous bone phantom
    ///
    /// The phantom is a 9 cm radius cylinder of water with a bone slab
    /// spanning x in [-4, 4] cm and y in [1, 9] cm beside the source.
    ///
    /// | Name      | Region                                        |
    /// | --------- | --------------------------------------------- |
    /// | source    | r <= 2 cm                                     |
    /// | bone      | the bone slab                                 |
    /// | water     | r <= 9 cm, excluding the source and the slab  |
    /// | periphery | 6 < r <= 9 cm, excluding the bone slab        |
    pub fn bone_phantom() -> Vec<NamedRegion> {
        let bone = Region::rectangle([-4.0, 4.0], [1.0, 9.0]);
        let source = Region::sphere(2.0);

        vec![
            Self::new("source", source.clone()),
            Self::new("bone", bone.clone()),
            Self::new("water", Region::sphere(9.0).and(bone.clone().or(source).not())),
            Self::new("periphery", Region::shell(6.0, 9.0).and(bone.not())),
        ]
    }
}

/// Named boolean selection of grid cells
///
/// Cells are in the same row-major order as [Grid](dosekit_grid::Grid) and
/// [ValueMap] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    name: String,
    axes: Vec<AxisSpec>,
    cells: Vec<bool>,
}

impl Mask {
    /// Mask from a flat row-major array of flags
    pub fn new<S: Into<String>>(name: S, axes: Vec<AxisSpec>, cells: Vec<bool>) -> Result<Self> {
        let name = name.into();
        let expected = axes.iter().map(|a| a.bins).product();
        if cells.len() != expected {
            return Err(Error::MaskLength {
                name,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { name, axes, cells })
    }

    /// Rename the mask
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Label used in reports
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Axes the mask was built for
    pub fn axes(&self) -> &[AxisSpec] {
        &self.axes
    }

    /// Flat row-major flags
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of selected cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.bins).collect()
    }

    fn fits(&self, axes: &[AxisSpec]) -> bool {
        self.axes.len() == axes.len() && self.axes.iter().zip(axes).all(|(a, b)| a.matches(b))
    }
}

/// Statistics of the defined values within a single mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Mask name
    pub name: String,
    /// Cells selected by the mask
    pub selected: usize,
    /// Selected cells with no defined value
    pub undefined: usize,
    /// Statistics, `None` if no selected cell has a defined value
    pub stats: Option<RegionStats>,
}

impl std::fmt::Display for RegionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match &self.stats {
            Some(stats) => f!("{:<12} {stats}", self.name),
            None => f!("{:<12} no defined values ({} cells)", self.name, self.selected),
        };
        write!(f, "{s}")
    }
}

/// Summarise the defined values of a map under each mask
///
/// Undefined cells are excluded from the statistics. A mask must have been
/// built for the same axes as the map.
///
/// ```rust
/// # use dosekit_grid::{AxisSpec, ValueMap};
/// # use dosekit_stats::{region_statistics, Mask};
/// let axis = AxisSpec::new(0.0, 2.0, 2).unwrap();
/// let axes = vec![axis, axis];
/// let map = ValueMap::new(axes.clone(), vec![Some(1.0), None, Some(3.0), Some(5.0)]).unwrap();
///
/// let left = Mask::new("left", axes.clone(), vec![true, true, false, false]).unwrap();
/// let empty = Mask::new("empty", axes, vec![false; 4]).unwrap();
///
/// let summaries = region_statistics(&map, &[left, empty]).unwrap();
/// assert_eq!(summaries[0].stats.unwrap().count, 1);
/// assert_eq!(summaries[0].undefined, 1);
/// assert_eq!(summaries[1].stats, None);
/// ```
pub fn region_statistics(map: &ValueMap, masks: &[Mask]) -> Result<Vec<RegionSummary>> {
    let mut summaries = Vec::with_capacity(masks.len());

    for mask in masks {
        if !mask.fits(map.axes()) {
            return Err(Error::ShapeMismatch {
                name: mask.name.clone(),
                expected: map.shape(),
                found: mask.shape(),
            });
        }

        let selected = map
            .values()
            .iter()
            .zip(&mask.cells)
            .filter_map(|(value, keep)| keep.then_some(*value))
            .collect::<Vec<Option<f64>>>();

        let values = selected.iter().flatten().copied().collect::<Vec<f64>>();
        let stats = RegionStats::from_values(&values);

        if stats.is_none() {
            warn!("Region '{}' has no defined values", mask.name);
        }

        summaries.push(RegionSummary {
            name: mask.name.clone(),
            selected: selected.len(),
            undefined: selected.len() - values.len(),
            stats,
        });
    }

    debug!("Summarised {} regions", summaries.len());
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Vec<AxisSpec> {
        let axis = AxisSpec::new(-10.0, 10.0, 20).unwrap();
        vec![axis, axis]
    }

    #[test]
    fn phantom_regions() {
        let regions = NamedRegion::bone_phantom();
        let masks = regions.iter().map(|r| r.mask(&axes())).collect::<Vec<Mask>>();

        let names = masks.iter().map(Mask::name).collect::<Vec<&str>>();
        assert_eq!(names, vec!["source", "bone", "water", "periphery"]);

        // 8 x 8 cells in the bone slab, source cells with |x|, |y| <= 1.5
        assert_eq!(masks[1].count(), 64);
        assert!(masks[0].count() > 0);

        // source, bone, and water cover the phantom and the whole slab
        let covered = Region::sphere(9.0).or(Region::rectangle([-4.0, 4.0], [1.0, 9.0]));
        let union = (0..400)
            .map(|i| masks[0].cells()[i] || masks[1].cells()[i] || masks[2].cells()[i])
            .collect::<Vec<bool>>();
        assert_eq!(union, covered.mask(&axes()).cells());

        // water and bone never overlap
        assert!(masks[2]
            .cells()
            .iter()
            .zip(masks[1].cells())
            .all(|(w, b)| !(*w && *b)));

        // periphery never touches the bone
        assert!(masks[3]
            .cells()
            .iter()
            .zip(masks[1].cells())
            .all(|(p, b)| !(*p && *b)));
    }

    #[test]
    fn water_stays_inside_the_phantom() {
        let axis = AxisSpec::new(-9.0, 9.0, 180).unwrap();
        let axes = vec![axis, axis];
        let water = &NamedRegion::bone_phantom()[2];
        assert_eq!(water.name, "water");

        let mask = water.mask(&axes);
        let centers = dosekit_grid::Grid::zeros(axes).unwrap().cell_centers();
        let beyond = centers
            .iter()
            .zip(mask.cells())
            .filter(|(c, selected)| **selected && distance(**c, [0.0; 3]) > 9.0)
            .count();

        assert!(mask.count() > 0);
        assert_eq!(beyond, 0);
    }

    #[test]
    fn regions_from_json() {
        let text = r#"{ "shape": "and", "regions": [
            { "shape": "shell", "inner": 6.0, "outer": 9.0 },
            { "shape": "not", "region": { "shape": "box", "x": [-4.0, 4.0], "y": [1.0, 9.0] } }
        ]}"#;
        let region: Region = serde_json::from_str(text).unwrap();
        let expected = Region::shell(6.0, 9.0).and(Region::rectangle([-4.0, 4.0], [1.0, 9.0]).not());
        assert_eq!(region, expected);
    }

    #[test]
    fn cylinder_and_box_limits() {
        let cylinder = Region::Cylinder {
            center: [0.0, 0.0],
            radius: 1.0,
            z: Some([-2.0, 2.0]),
        };
        assert!(cylinder.contains([0.5, 0.5, 1.9]));
        assert!(!cylinder.contains([0.5, 0.5, 2.1]));
        assert!(!cylinder.contains([1.0, 1.0, 0.0]));

        let cube = Region::Box {
            x: [0.0, 1.0],
            y: [0.0, 1.0],
            z: Some([0.0, 1.0]),
        };
        assert!(cube.contains([1.0, 1.0, 1.0]));
        assert!(!cube.contains([1.0, 1.0, 1.01]));
    }

    #[test]
    fn mismatched_mask() {
        let map = ValueMap::new(axes(), vec![Some(1.0); 400]).unwrap();
        let small = AxisSpec::new(-10.0, 10.0, 10).unwrap();
        let mask = Region::All.mask(&[small, small]);

        assert!(matches!(
            region_statistics(&map, &[mask]),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            Mask::new("short", axes(), vec![true; 3]),
            Err(Error::MaskLength { .. })
        ));
    }
}
