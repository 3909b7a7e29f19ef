//! Results of a pipeline run

// dosekit modules
use dosekit_grid::{BinSummary, DifferenceResult, Grid};
use dosekit_samples::{IngestSummary, SanityIssue};
use dosekit_stats::{RegionSummary, RingSummary, Significance};
use dosekit_tg43::{AngularProfile, RadialProfile, ReferenceDeviation};
use dosekit_utils::{f, ValueExt};

// standard library
use std::path::PathBuf;

// external crates
use serde::Serialize;

/// Counts of everything that was skipped, excluded, or left undefined
///
/// Anomalies are never raised one at a time. They are tallied here instead so
/// a run always completes and reports how much of the data was usable.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Lines that could not be parsed
    pub malformed_lines: usize,
    /// Samples dropped for non-positive energy
    pub rejected_samples: usize,
    /// Samples kept with zero energy
    pub zero_weighted_samples: usize,
    /// Samples with non-finite values
    pub invalid_samples: usize,
    /// Samples outside the grid extent
    pub excluded_samples: usize,
    /// Energy of samples outside the grid extent (MeV)
    pub excluded_energy: f64,
    /// Cells with no defined relative difference
    pub undefined_ratios: usize,
    /// Profiles or shells that could not be normalised
    pub normalization_fallbacks: usize,
    /// Points beyond the radial and angular profile shells
    pub profile_outside: usize,
    /// Points at the source centre, with no polar angle
    pub profile_at_origin: usize,
    /// Significance windows with too few values
    pub skipped_windows: usize,
    /// Issues found by the sanity check
    pub sanity_issues: usize,
}

impl Diagnostics {
    pub(crate) fn add_ingest(&mut self, summary: &IngestSummary, issues: &[SanityIssue]) {
        self.malformed_lines += summary.malformed;
        self.rejected_samples += summary.rejected;
        self.zero_weighted_samples += summary.zero_weighted;
        self.sanity_issues += issues.len();
    }

    pub(crate) fn add_binning(&mut self, summary: &BinSummary) {
        self.invalid_samples += summary.invalid;
        self.excluded_samples += summary.excluded;
        self.excluded_energy += summary.excluded_energy;
    }

    /// True if nothing at all was skipped or left undefined
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = "Diagnostics:\n".to_string();
        s += &f!("    malformed lines:   {}\n", self.malformed_lines);
        s += &f!(
            "    rejected samples:  {} ({} zero weighted)\n",
            self.rejected_samples,
            self.zero_weighted_samples
        );
        s += &f!("    invalid samples:   {}\n", self.invalid_samples);
        s += &f!(
            "    excluded samples:  {} ({} MeV)\n",
            self.excluded_samples,
            self.excluded_energy.sci(4, 2)
        );
        s += &f!("    undefined ratios:  {}\n", self.undefined_ratios);
        s += &f!("    norm. fallbacks:   {}\n", self.normalization_fallbacks);
        s += &f!(
            "    profile outside:   {} ({} at origin)\n",
            self.profile_outside,
            self.profile_at_origin
        );
        s += &f!("    skipped windows:   {}\n", self.skipped_windows);
        s += &f!("    sanity issues:     {}", self.sanity_issues);
        write!(f, "{s}")
    }
}

/// Ingestion and binning totals for a single sample file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// File the samples were read from
    pub source: PathBuf,
    /// Line and sample counts
    pub ingest: IngestSummary,
    /// Problems found by the sanity check
    pub sanity: Vec<SanityIssue>,
    /// Binning totals
    pub binning: BinSummary,
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("Source: {}\n", self.source.display());
        s += &f!("{}\n", self.ingest);
        s += &f!("{}\n", self.binning);
        for issue in &self.sanity {
            s += &f!("Sanity: {issue}\n");
        }
        write!(f, "{}", s.trim_end())
    }
}

/// Single dataset dosimetric parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosimetryReport {
    /// Ingestion and binning totals
    pub dataset: DatasetSummary,
    /// Binned energy, write with `write_grid_file()` if needed
    #[serde(skip)]
    pub grid: Grid,
    /// Radial dose function
    pub radial: RadialProfile,
    /// Anisotropy function, if configured
    pub angular: Option<AngularProfile>,
    /// Deviation of g(r) from the consensus data, if configured
    pub literature: Vec<ReferenceDeviation>,
    /// Everything skipped along the way
    pub diagnostics: Diagnostics,
}

impl std::fmt::Display for DosimetryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("{}\n\n", self.dataset);
        s += &f!("{}\n\n", self.radial);
        if let Some(angular) = &self.angular {
            s += &f!("{angular}\n\n");
        }
        if !self.literature.is_empty() {
            s += "Literature comparison:\n";
            s += "        r(cm) |  g(r)sim |  g(r)ref | deviation\n";
            for deviation in &self.literature {
                s += &f!("    {deviation}\n");
            }
            s += "\n";
        }
        s += &f!("{}", self.diagnostics);
        write!(f, "{s}")
    }
}

/// Two dataset comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Reference dataset, `None` for pre-built grids
    pub reference: Option<DatasetSummary>,
    /// Test dataset, `None` for pre-built grids
    pub test: Option<DatasetSummary>,
    /// Absolute and relative differences, test - reference
    #[serde(skip)]
    pub difference: DifferenceResult,
    /// Total energy of the reference grid (MeV)
    pub reference_energy: f64,
    /// Total energy of the test grid (MeV)
    pub test_energy: f64,
    /// Relative difference statistics (%) per region
    pub regions: Vec<RegionSummary>,
    /// Relative difference statistics (%) per ring about the source
    pub rings: Vec<RingSummary>,
    /// Local significance of the relative difference, if configured
    pub significance: Option<Significance>,
    /// Everything skipped along the way
    pub diagnostics: Diagnostics,
}

impl ComparisonReport {
    /// Change in total energy relative to the reference (%)
    pub fn energy_change_percent(&self) -> Option<f64> {
        (self.reference_energy > 0.0)
            .then(|| (self.test_energy - self.reference_energy) / self.reference_energy * 100.0)
    }
}

impl std::fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = String::new();
        if let Some(reference) = &self.reference {
            s += &f!("Reference\n{reference}\n\n");
        }
        if let Some(test) = &self.test {
            s += &f!("Test\n{test}\n\n");
        }

        s += &f!(
            "Total energy: {} -> {} MeV",
            self.reference_energy.sci(4, 2),
            self.test_energy.sci(4, 2)
        );
        match self.energy_change_percent() {
            Some(change) => s += &f!(" ({change:+.2}%)\n"),
            None => s += "\n",
        }
        s += &f!(
            "Defined relative differences: {:.1}% of cells\n\n",
            self.difference.defined_fraction() * 100.0
        );

        s += "Relative difference by region (%):\n";
        for region in &self.regions {
            s += &f!("    {region}\n");
        }
        s += "\n";

        if !self.rings.is_empty() {
            s += "Relative difference by ring (%):\n";
            for ring in &self.rings {
                s += &f!("    {ring}\n");
            }
            s += "\n";
        }

        if let Some(significance) = &self.significance {
            s += &f!("{significance}\n\n");
        }
        s += &f!("{}", self.diagnostics);
        write!(f, "{s}")
    }
}
