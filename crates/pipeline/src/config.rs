//! Analysis settings shared by every pipeline stage

// crate modules
use crate::error::{Error, Result};

// dosekit modules
use dosekit_grid::{AxisSpec, Binner};
use dosekit_samples::{EnergyPolicy, SampleReader};
use dosekit_stats::NamedRegion;
use dosekit_tg43::{Aggregate, AngularAggregator, RadialAggregator};
use dosekit_utils::{f, SliceExt};

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// Every setting of a [Pipeline](crate::Pipeline)
///
/// All fields have defaults, so a configuration file only needs the values
/// that differ. An empty JSON object `{}` is a valid configuration.
///
/// ```rust
/// # use dosekit_pipeline::Config;
/// let config: Config = serde_json::from_str(r#"{
///     "correction_factor": 0.1,
///     "radial": { "reference_radius": 2.0 }
/// }"#).unwrap();
///
/// assert_eq!(config.correction_factor, 0.1);
/// assert_eq!(config.radial.reference_radius, 2.0);
/// assert_eq!(config.comment_marker, '#');
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Linear factor applied to every coordinate on read
    pub correction_factor: f64,
    /// Lines starting with this character are ignored
    pub comment_marker: char,
    /// Leading lines to skip in every sample file
    pub header_lines: usize,
    /// Treatment of samples with non-positive energy
    pub energy_policy: EnergyPolicy,
    /// Expected maximum distance from the origin of any sample (cm)
    pub sanity_bound: f64,
    /// Show a line count while reading
    pub progress: bool,
    /// Binning axes, 2 or 3, mapped to x, y(, z)
    pub axes: Vec<AxisSpec>,
    /// Radial dose function settings
    pub radial: RadialConfig,
    /// Anisotropy function settings, skipped if `null`
    pub angular: Option<AngularConfig>,
    /// Compare g(r) with the consensus Ir-192 data
    pub literature: bool,
    /// Regions summarised in comparisons
    pub regions: Vec<NamedRegion>,
    /// Ring edges (cm) for the radial profile of comparisons, skipped if empty
    pub rings: Vec<f64>,
    /// Local significance settings, skipped if `null`
    pub significance: Option<SignificanceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            correction_factor: 1.0,
            comment_marker: '#',
            header_lines: 0,
            energy_policy: EnergyPolicy::Reject,
            sanity_bound: 10.0,
            progress: false,
            axes: default_axes(),
            radial: RadialConfig::default(),
            angular: Some(AngularConfig::default()),
            literature: true,
            regions: NamedRegion::bone_phantom(),
            rings: default_rings(),
            significance: Some(SignificanceConfig::default()),
        }
    }
}

/// Square 18 x 18 cm plane at 1 mm resolution
fn default_axes() -> Vec<AxisSpec> {
    let axis = AxisSpec {
        min: -9.0,
        max: 9.0,
        bins: 180,
    };
    vec![axis, axis]
}

/// 18 rings of 0.5 cm out to the 9 cm phantom edge
fn default_rings() -> Vec<f64> {
    (0..19).map(|i| i as f64 * 0.5).collect()
}

/// Settings for g(r)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Shell edges (cm), ascending
    pub edges: Vec<f64>,
    /// Radius normalised to unity (cm)
    pub reference_radius: f64,
    /// Quantity computed per shell
    pub mode: Aggregate,
}

impl Default for RadialConfig {
    /// 149 shells from 0.1 to 15 cm
    fn default() -> Self {
        Self {
            edges: (0..150).map(|i| 0.1 + i as f64 * 14.9 / 149.0).collect(),
            reference_radius: 1.0,
            mode: Aggregate::Mean,
        }
    }
}

/// Settings for F(r, θ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngularConfig {
    /// Radial shell edges (cm), ascending
    pub radial_edges: Vec<f64>,
    /// Number of equal polar bins between 0 and 180 degrees
    pub bins: usize,
    /// Reference polar angle (degrees)
    pub reference_angle: f64,
}

impl Default for AngularConfig {
    fn default() -> Self {
        Self {
            radial_edges: vec![0.5, 1.0, 2.0, 3.0, 5.0, 7.5, 10.0],
            bins: 18,
            reference_angle: 90.0,
        }
    }
}

/// Settings for the sliding window t-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Odd window size in cells along every axis
    pub window: usize,
    /// Defined values needed before a window is tested
    pub min_valid: usize,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            window: 5,
            min_valid: 5,
        }
    }
}

impl Config {
    /// Read a configuration from a JSON file
    ///
    /// Missing fields take their default values. The result is validated
    /// before it is returned.
    ///
    /// ```rust, no_run
    /// # use dosekit_pipeline::Config;
    /// let config = Config::from_json_file("path/to/config.json").unwrap();
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path: &Path = Path::new(path.as_ref());
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check that every stage can be built from these settings
    pub fn validate(&self) -> Result<()> {
        let k = self.correction_factor;
        if !k.is_finite() || k <= 0.0 {
            return Err(invalid("correction_factor", f!("must be finite and positive, found {k}")));
        }

        let bound = self.sanity_bound;
        if !bound.is_finite() || bound <= 0.0 {
            return Err(invalid("sanity_bound", f!("must be finite and positive, found {bound}")));
        }

        if !self.rings.is_empty() {
            self.rings
                .check_edges()
                .map_err(|e| invalid("rings", f!("{e}")))?;
        }

        if let Some(significance) = &self.significance {
            if significance.window == 0 || significance.window % 2 == 0 {
                return Err(invalid(
                    "significance.window",
                    f!("must be odd, found {}", significance.window),
                ));
            }
            if significance.min_valid < 2 {
                return Err(invalid(
                    "significance.min_valid",
                    f!("must be at least 2, found {}", significance.min_valid),
                ));
            }
        }

        self.binner()?;
        self.radial_aggregator()?;
        self.angular_aggregator()?;
        Ok(())
    }

    /// Sample reader with the ingestion settings applied
    pub(crate) fn reader(&self) -> SampleReader {
        let mut reader = SampleReader::new();
        reader.set_correction_factor(self.correction_factor);
        reader.set_comment_marker(self.comment_marker);
        reader.set_header_lines(self.header_lines);
        reader.set_energy_policy(self.energy_policy);
        if !self.progress {
            reader.disable_progress();
        }
        reader
    }

    pub(crate) fn binner(&self) -> Result<Binner> {
        Ok(Binner::new(self.axes.clone())?)
    }

    pub(crate) fn radial_aggregator(&self) -> Result<RadialAggregator> {
        let mut radial = RadialAggregator::new(self.radial.edges.clone())?;
        radial.set_reference_radius(self.radial.reference_radius)?;
        radial.set_mode(self.radial.mode);
        Ok(radial)
    }

    pub(crate) fn angular_aggregator(&self) -> Result<Option<AngularAggregator>> {
        let Some(settings) = &self.angular else {
            return Ok(None);
        };

        if settings.bins == 0 {
            return Err(invalid("angular.bins", "must be at least 1".to_string()));
        }

        let mut angular = AngularAggregator::new(
            settings.radial_edges.clone(),
            AngularAggregator::uniform_angular_edges(settings.bins),
        )?;
        angular.set_reference_angle(settings.reference_angle.to_radians())?;
        Ok(Some(angular))
    }
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::InvalidConfig { field, reason }
}
