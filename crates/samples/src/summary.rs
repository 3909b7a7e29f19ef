//! Running totals collected while reading a sample source

// crate modules
use crate::sample::{Coordinate, Sample};

// dosekit modules
use dosekit_utils::{f, ValueExt};

// external crates
use serde::Serialize;

/// Counts and totals for a single read of a sample source
///
/// Nothing read from a file is silently discarded. Every line ends up in
/// exactly one of the header, comment, blank, malformed, rejected, or sample
/// counts.
///
/// The extents and total energy make gross corruption easy to spot, see
/// [IngestSummary::sanity_check()].
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    /// Number of lines read from the source
    pub lines: usize,
    /// Lines skipped as header by count
    pub header: usize,
    /// Lines skipped as comments
    pub comments: usize,
    /// Empty or whitespace-only lines
    pub blank: usize,
    /// Lines that could not be parsed as a sample record
    pub malformed: usize,
    /// Samples emitted to the caller
    pub samples: usize,
    /// Samples dropped for non-positive energy
    pub rejected: usize,
    /// Samples kept with their energy set to zero
    pub zero_weighted: usize,
    /// Sum of energy over all emitted samples (MeV)
    pub total_energy: f64,
    /// Extent of x over emitted samples (cm)
    pub x: Extent,
    /// Extent of y over emitted samples (cm)
    pub y: Extent,
    /// Extent of z over emitted samples (cm)
    pub z: Extent,
    /// Reading stopped early on an I/O failure
    pub interrupted: bool,
}

impl IngestSummary {
    /// Record an emitted sample in the running totals
    pub(crate) fn record(&mut self, sample: &Sample) {
        self.samples += 1;
        self.total_energy += sample.energy;
        self.x.include(sample.x);
        self.y.include(sample.y);
        self.z.include(sample.z);
    }

    /// Extent for a single coordinate
    pub fn extent(&self, coordinate: Coordinate) -> &Extent {
        match coordinate {
            Coordinate::X => &self.x,
            Coordinate::Y => &self.y,
            Coordinate::Z => &self.z,
        }
    }

    /// Number of lines that were not turned into samples for any reason
    pub fn skipped(&self) -> usize {
        self.header + self.comments + self.blank + self.malformed + self.rejected
    }

    /// Check the totals are physically sensible
    ///
    /// Returns every issue found, so an empty list means the data passed.
    ///
    /// - No samples at all
    /// - Total deposited energy is zero
    /// - Any coordinate reaches further than `bound` from the origin
    ///
    /// The last case is the classic millimetre/centimetre mix-up. A suggested
    /// power-of-ten correction factor is provided that would bring the data
    /// back inside the bound.
    ///
    /// ```rust
    /// # use dosekit_samples::{Sample, SampleReader, SanityIssue};
    /// # use std::io::Cursor;
    /// let text = "-89.7 0.0 0.0 1.0\n45.0 10.0 2.0 1.0\n";
    /// let mut stream = SampleReader::new().stream(Cursor::new(text)).unwrap();
    /// let _samples: Vec<Sample> = stream.by_ref().collect();
    ///
    /// // positions were written in mm, so everything is 10x too far out
    /// let issues = stream.summary().sanity_check(10.0);
    /// assert_eq!(issues.len(), 1);
    /// assert!(matches!(
    ///     issues[0],
    ///     SanityIssue::CoordinateOutOfBounds { suggested_factor, .. } if suggested_factor == 0.1
    /// ));
    /// ```
    pub fn sanity_check(&self, bound: f64) -> Vec<SanityIssue> {
        if self.samples == 0 {
            return vec![SanityIssue::NoSamples];
        }

        let mut issues = Vec::new();

        if self.total_energy <= 0.0 {
            issues.push(SanityIssue::ZeroTotalEnergy);
        }

        for coordinate in Coordinate::ALL {
            let reach = self.extent(coordinate).reach();
            if reach > bound {
                let magnitude = (reach / bound).log10().ceil();
                issues.push(SanityIssue::CoordinateOutOfBounds {
                    coordinate,
                    reach,
                    bound,
                    suggested_factor: 1.0 / 10f64.powi(magnitude as i32),
                });
            }
        }

        issues
    }
}

impl std::fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = "IngestSummary {\n".to_string();
        s += &f!("    lines: {}\n", self.lines);
        s += &f!(
            "    samples: {} ({} zero weighted)\n",
            self.samples,
            self.zero_weighted
        );
        s += &f!(
            "    skipped: {} (header {}, comments {}, blank {}, malformed {}, rejected {})\n",
            self.skipped(),
            self.header,
            self.comments,
            self.blank,
            self.malformed,
            self.rejected
        );
        s += &f!("    energy: {} MeV\n", self.total_energy.sci(5, 2));
        s += &f!("    x: {}\n", self.x);
        s += &f!("    y: {}\n", self.y);
        s += &f!("    z: {}\n", self.z);
        if self.interrupted {
            s += "    interrupted: true\n";
        }
        s += "}";
        write!(f, "{s}")
    }
}

/// Minimum and maximum of a coordinate over a set of samples
///
/// An extent with nothing included yet is empty, with `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    /// Lowest value seen
    pub min: f64,
    /// Highest value seen
    pub max: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Extent {
    /// Widen the extent to include `value`
    pub fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// True if nothing has been included
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Width of the extent, zero if empty
    pub fn span(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }

    /// Furthest distance from zero, zero if empty
    pub fn reach(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.min.abs().max(self.max.abs())
        }
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "empty")
        } else {
            write!(
                f,
                "{:.3} to {:.3} cm (span {:.3} cm)",
                self.min,
                self.max,
                self.span()
            )
        }
    }
}

/// Problems found by [IngestSummary::sanity_check()]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SanityIssue {
    /// The source contained no usable samples
    NoSamples,
    /// Samples were read but no energy was deposited
    ZeroTotalEnergy,
    /// A coordinate reaches further than physically expected
    CoordinateOutOfBounds {
        /// Offending coordinate
        coordinate: Coordinate,
        /// Furthest distance from the origin found (cm)
        reach: f64,
        /// Expected maximum distance (cm)
        bound: f64,
        /// Power-of-ten factor that would bring the data inside the bound
        suggested_factor: f64,
    },
}

impl std::fmt::Display for SanityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NoSamples => write!(f, "no samples were read"),
            Self::ZeroTotalEnergy => write!(f, "total deposited energy is zero"),
            Self::CoordinateOutOfBounds {
                coordinate,
                reach,
                bound,
                suggested_factor,
            } => write!(
                f,
                "{coordinate} reaches {reach:.3} cm, beyond the expected {bound:.3} cm \
                 (try a correction factor of {suggested_factor})"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extent() {
        let extent = Extent::default();
        assert!(extent.is_empty());
        assert_eq!(extent.span(), 0.0);
        assert_eq!(extent.reach(), 0.0);
    }

    #[test]
    fn no_samples_short_circuits() {
        let summary = IngestSummary::default();
        assert_eq!(summary.sanity_check(10.0), vec![SanityIssue::NoSamples]);
    }

    #[test]
    fn zero_energy_is_flagged() {
        let mut summary = IngestSummary::default();
        summary.record(&Sample::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(summary.sanity_check(10.0), vec![SanityIssue::ZeroTotalEnergy]);
    }

    #[test]
    fn factor_suggestion_scales_with_magnitude() {
        let mut summary = IngestSummary::default();
        summary.record(&Sample::new(0.0, 0.0, 450.0, 1.0));
        let issues = summary.sanity_check(9.0);
        assert_eq!(
            issues,
            vec![SanityIssue::CoordinateOutOfBounds {
                coordinate: Coordinate::Z,
                reach: 450.0,
                bound: 9.0,
                suggested_factor: 0.01,
            }]
        );
    }
}
