//! Stages wired together for the two common analyses

// crate modules
use crate::config::Config;
use crate::error::Result;
use crate::report::{ComparisonReport, DatasetSummary, Diagnostics, DosimetryReport};

// dosekit modules
use dosekit_grid::{difference, Binned, Binner, Grid};
use dosekit_samples::{IngestSummary, Sample, SampleReader};
use dosekit_stats::{local_significance, region_statistics, ring_statistics, Mask};
use dosekit_tg43::{compare_with_reference, AngularAggregator, RadialAggregator, RIVARD_2004_IR192};

// standard library
use std::path::Path;

// external crates
use log::{debug, info, warn};

/// Validated, ready to run analysis
///
/// Every stage is built once from the [Config] so invalid settings are found
/// before any file is opened.
///
/// ```rust, no_run
/// # use dosekit_pipeline::{Config, Pipeline};
/// let pipeline = Pipeline::new(Config::default()).unwrap();
///
/// // g(r) and F(r, θ) for a single simulation
/// let report = pipeline.dosimetry("water.out").unwrap();
/// println!("{report}");
///
/// // heterogeneous phantom against homogeneous water
/// let report = pipeline.compare("water.out", "bone.out").unwrap();
/// println!("{report}");
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    reader: SampleReader,
    binner: Binner,
    radial: RadialAggregator,
    angular: Option<AngularAggregator>,
}

impl Pipeline {
    /// Build every stage from a configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: config.reader(),
            binner: config.binner()?,
            radial: config.radial_aggregator()?,
            angular: config.angular_aggregator()?,
            config,
        })
    }

    /// Settings the pipeline was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingest, bin, and compute g(r) and F(r, θ) for a single sample file
    ///
    /// Samples are streamed straight into the binner and radial aggregator.
    /// They are only held in memory when F(r, θ) is configured, which needs
    /// the exact sample positions.
    ///
    /// A source that fails part way through is an error, no report is built
    /// from a partial read.
    pub fn dosimetry<P: AsRef<Path>>(&self, path: P) -> Result<DosimetryReport> {
        let path = path.as_ref();
        info!("Dosimetry for {}", path.display());

        let mut stream = self.reader.open(path)?;

        let (binned, radial, angular) = match &self.angular {
            Some(angular) => {
                let samples = stream.by_ref().collect::<Vec<Sample>>();
                (
                    self.binner.bin(&samples),
                    self.radial.from_samples(&samples),
                    Some(angular.from_samples(&samples)),
                )
            }
            None => {
                let mut accumulator = self.radial.accumulator();
                let binned = self
                    .binner
                    .bin(stream.by_ref().inspect(|s| accumulator.add_sample(s)));
                (binned, accumulator.finish(), None)
            }
        };

        let dataset = self.summarise(path, stream.into_summary()?, &binned);

        let literature = if self.config.literature {
            compare_with_reference(&radial, &RIVARD_2004_IR192)
        } else {
            Vec::new()
        };

        let mut diagnostics = Diagnostics::default();
        diagnostics.add_ingest(&dataset.ingest, &dataset.sanity);
        diagnostics.add_binning(&dataset.binning);
        diagnostics.normalization_fallbacks += usize::from(radial.is_fallback());
        diagnostics.profile_outside += radial.outside;
        if let Some(angular) = &angular {
            diagnostics.normalization_fallbacks += angular.fallback_shells.len();
            diagnostics.profile_outside += angular.outside;
            diagnostics.profile_at_origin += angular.at_origin;
        }

        debug!("Dosimetry complete, clean = {}", diagnostics.is_clean());

        Ok(DosimetryReport {
            dataset,
            grid: binned.grid,
            radial,
            angular,
            literature,
            diagnostics,
        })
    }

    /// Ingest and bin two sample files, then compare test against reference
    pub fn compare<P, Q>(&self, reference: P, test: Q) -> Result<ComparisonReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        info!(
            "Comparing {} against {}",
            test.as_ref().display(),
            reference.as_ref().display()
        );

        let (reference_grid, reference) = self.ingest(reference.as_ref())?;
        let (test_grid, test) = self.ingest(test.as_ref())?;

        let mut report = self.compare_grids(&reference_grid, &test_grid)?;

        for dataset in [&reference, &test] {
            report.diagnostics.add_ingest(&dataset.ingest, &dataset.sanity);
            report.diagnostics.add_binning(&dataset.binning);
        }
        report.reference = Some(reference);
        report.test = Some(test);

        Ok(report)
    }

    /// Compare two pre-built grids on identical axes
    ///
    /// Region masks and significance windows follow the grid axes, which do
    /// not have to match the configured binning axes.
    ///
    /// ```rust
    /// # use dosekit_grid::{AxisSpec, Grid};
    /// # use dosekit_pipeline::{Config, Pipeline};
    /// let axis = AxisSpec::new(-10.0, 10.0, 20).unwrap();
    /// let reference = Grid::from_parts(vec![axis, axis], vec![1.0; 400]).unwrap();
    /// let test = Grid::from_parts(vec![axis, axis], vec![1.05; 400]).unwrap();
    ///
    /// let report = Pipeline::new(Config::default())
    ///     .unwrap()
    ///     .compare_grids(&reference, &test)
    ///     .unwrap();
    ///
    /// let water = report.regions.iter().find(|r| r.name == "water").unwrap();
    /// assert!((water.stats.unwrap().mean - 5.0).abs() < 1e-9);
    /// assert_eq!(report.diagnostics.undefined_ratios, 0);
    /// ```
    pub fn compare_grids(&self, reference: &Grid, test: &Grid) -> Result<ComparisonReport> {
        let difference = difference(reference, test)?;
        let relative = difference.relative_percent();

        let masks = self
            .config
            .regions
            .iter()
            .map(|r| r.mask(relative.axes()))
            .collect::<Vec<Mask>>();
        let regions = region_statistics(&relative, &masks)?;

        let rings = if self.config.rings.is_empty() {
            Vec::new()
        } else {
            ring_statistics(&relative, &self.config.rings)?
        };

        let significance = match &self.config.significance {
            Some(settings) => Some(local_significance(
                &relative,
                settings.window,
                settings.min_valid,
            )?),
            None => None,
        };

        let diagnostics = Diagnostics {
            undefined_ratios: difference.undefined,
            skipped_windows: significance.as_ref().map_or(0, |s| s.skipped),
            ..Default::default()
        };

        Ok(ComparisonReport {
            reference: None,
            test: None,
            reference_energy: reference.total(),
            test_energy: test.total(),
            difference,
            regions,
            rings,
            significance,
            diagnostics,
        })
    }

    /// Stream a sample file into a new grid
    fn ingest(&self, path: &Path) -> Result<(Grid, DatasetSummary)> {
        let mut stream = self.reader.open(path)?;
        let binned = self.binner.bin(stream.by_ref());
        let dataset = self.summarise(path, stream.into_summary()?, &binned);
        Ok((binned.grid, dataset))
    }

    /// Run the sanity check and collect the totals for one file
    fn summarise(&self, path: &Path, ingest: IngestSummary, binned: &Binned) -> DatasetSummary {
        let sanity = ingest.sanity_check(self.config.sanity_bound);
        for issue in &sanity {
            warn!("{}: {issue}", path.display());
        }

        DatasetSummary {
            source: path.to_path_buf(),
            ingest,
            sanity,
            binning: binned.summary,
        }
    }
}
