//! Running sums for shells and bins

// dosekit modules
use dosekit_utils::SliceExt;

/// Shell containing `value` with every shell half open, `[low, high)`
///
/// Unlike a plain bin search the outer edge is excluded, so that each shell
/// has identical membership rules.
pub(crate) fn shell_index(edges: &[f64], value: f64) -> Option<usize> {
    match (edges.first(), edges.last()) {
        (Some(low), Some(high)) if value >= *low && value < *high => {
            edges.find_bin_exclusive(value).ok()
        }
        _ => None,
    }
}

/// Bin midpoints for a set of edges
pub(crate) fn midpoints(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Weight sums and contributor counts per bin
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tally {
    pub sums: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Tally {
    pub fn new(bins: usize) -> Self {
        Self {
            sums: vec![0.0; bins],
            counts: vec![0; bins],
        }
    }

    pub fn add(&mut self, index: usize, weight: f64) {
        self.sums[index] += weight;
        self.counts[index] += 1;
    }

    /// Mean per bin, zero where nothing contributed
    pub fn means(&self) -> Vec<f64> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(s, n)| if *n > 0 { s / *n as f64 } else { 0.0 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shells_are_half_open() {
        let edges = [0.5, 1.0, 2.0];
        assert_eq!(shell_index(&edges, 0.5), Some(0));
        assert_eq!(shell_index(&edges, 1.0), Some(1));
        assert_eq!(shell_index(&edges, 1.999), Some(1));
        assert_eq!(shell_index(&edges, 2.0), None);
        assert_eq!(shell_index(&edges, 0.4), None);
        assert_eq!(shell_index(&edges, f64::NAN), None);
    }

    #[test]
    fn empty_bins_are_zero() {
        let mut tally = Tally::new(3);
        tally.add(0, 2.0);
        tally.add(0, 4.0);
        tally.add(2, 1.0);
        assert_eq!(tally.means(), vec![3.0, 0.0, 1.0]);
        assert_eq!(tally.counts, vec![2, 0, 1]);
    }
}
