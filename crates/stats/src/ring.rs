//! Statistics of a value map in concentric rings about the source

// crate modules
use crate::descriptive::RegionStats;
use crate::error::Result;

// dosekit modules
use dosekit_grid::ValueMap;
use dosekit_utils::{f, SliceExt};

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// Statistics of the defined values in one ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingSummary {
    /// Inner radius, included (cm)
    pub inner: f64,
    /// Outer radius, excluded (cm)
    pub outer: f64,
    /// Cells with a centre inside the ring
    pub selected: usize,
    /// Selected cells with no defined value
    pub undefined: usize,
    /// Statistics, `None` if no selected cell has a defined value
    pub stats: Option<RegionStats>,
}

impl RingSummary {
    /// Radius midway between the ring edges (cm)
    pub fn center(&self) -> f64 {
        0.5 * (self.inner + self.outer)
    }
}

impl std::fmt::Display for RingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let range = f!("[{:.2}, {:.2})", self.inner, self.outer);
        let s = match &self.stats {
            Some(stats) => f!("{range:<14} {stats}"),
            None => f!("{range:<14} no defined values ({} cells)", self.selected),
        };
        write!(f, "{s}")
    }
}

/// Summarise a map in rings about the z axis
///
/// A cell belongs to the ring `[inner, outer)` containing the distance of
/// its centre from the z axis. Cells beyond the last edge are ignored and
/// undefined cells are excluded from the statistics.
///
/// ```rust
/// # use dosekit_grid::{AxisSpec, ValueMap};
/// # use dosekit_stats::ring_statistics;
/// let axis = AxisSpec::new(-2.0, 2.0, 4).unwrap();
/// let values = (0..16).map(|i| Some(i as f64)).collect::<Vec<Option<f64>>>();
/// let map = ValueMap::new(vec![axis, axis], values).unwrap();
///
/// let rings = ring_statistics(&map, &[0.0, 1.0, 2.0]).unwrap();
///
/// // the four cells about the origin are the inner ring
/// assert_eq!(rings[0].selected, 4);
/// assert_eq!(rings[0].stats.unwrap().mean, 7.5);
/// // corner cells sit at r = 2.12 and are left out
/// assert_eq!(rings[1].selected, 8);
/// ```
pub fn ring_statistics(map: &ValueMap, edges: &[f64]) -> Result<Vec<RingSummary>> {
    edges.check_edges()?;

    let n_rings = edges.len() - 1;
    let mut selected = vec![0; n_rings];
    let mut values = vec![Vec::new(); n_rings];

    for (center, value) in map.cell_centers().iter().zip(map.values()) {
        let Some(i) = ring_index(edges, center[0].hypot(center[1])) else {
            continue;
        };
        selected[i] += 1;
        if let Some(value) = value {
            values[i].push(*value);
        }
    }

    let rings = edges
        .windows(2)
        .zip(selected)
        .zip(values)
        .map(|((w, selected), values)| RingSummary {
            inner: w[0],
            outer: w[1],
            selected,
            undefined: selected - values.len(),
            stats: RegionStats::from_values(&values),
        })
        .collect::<Vec<RingSummary>>();

    debug!(
        "Summarised {n_rings} rings, {} without defined values",
        rings.iter().filter(|r| r.stats.is_none()).count()
    );
    Ok(rings)
}

/// Ring `[low, high)` holding a radius
fn ring_index(edges: &[f64], radius: f64) -> Option<usize> {
    match (edges.first(), edges.last()) {
        (Some(low), Some(high)) if radius >= *low && radius < *high => {
            edges.find_bin_exclusive(radius).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use dosekit_grid::AxisSpec;

    fn map(values: Vec<Option<f64>>) -> ValueMap {
        let axis = AxisSpec::new(-2.0, 2.0, 4).unwrap();
        ValueMap::new(vec![axis, axis], values).unwrap()
    }

    #[test]
    fn undefined_cells_are_skipped() {
        let mut values = vec![Some(1.0); 16];
        values[5] = None;
        let rings = ring_statistics(&map(values), &[0.0, 1.0, 3.0]).unwrap();

        assert_eq!(rings[0].selected, 4);
        assert_eq!(rings[0].undefined, 1);
        assert_eq!(rings[0].stats.unwrap().count, 3);
        assert_eq!(rings[1].selected, 12);
        assert_eq!(rings[1].center(), 2.0);
    }

    #[test]
    fn empty_rings() {
        let rings = ring_statistics(&map(vec![None; 16]), &[0.0, 0.5, 1.0]).unwrap();

        // nothing inside 0.5 cm, everything inside 1 cm is undefined
        assert_eq!(rings[0].selected, 0);
        assert_eq!(rings[0].stats, None);
        assert_eq!(rings[1].undefined, 4);
        assert_eq!(rings[1].stats, None);
    }

    #[test]
    fn outer_edge_is_excluded() {
        let x = AxisSpec::new(0.0, 2.0, 1).unwrap();
        let y = AxisSpec::new(-1.0, 1.0, 1).unwrap();
        let single = ValueMap::new(vec![x, y], vec![Some(1.0)]).unwrap();

        // the only centre is at r = 1
        let rings = ring_statistics(&single, &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(rings[0].selected, 0);
        assert_eq!(rings[1].selected, 1);
    }

    #[test]
    fn invalid_edges() {
        let m = map(vec![Some(1.0); 16]);
        assert!(matches!(ring_statistics(&m, &[1.0]), Err(Error::Edges(_))));
        assert!(matches!(ring_statistics(&m, &[0.0, 2.0, 1.0]), Err(Error::Edges(_))));
    }
}
