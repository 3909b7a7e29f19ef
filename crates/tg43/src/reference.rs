//! Literature reference data for validating simulated profiles

// crate modules
use crate::radial::RadialProfile;

// dosekit modules
use dosekit_utils::f;

// external crates
use log::debug;
use serde::Serialize;

/// Tabulated radial dose function for a particular source model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceTable {
    /// Source of the data
    pub name: &'static str,
    /// Tabulated distances (cm), ascending
    pub radii: &'static [f64],
    /// g(r) at each distance
    pub values: &'static [f64],
}

/// Consensus g(r) for HDR Ir-192 from TG-43U1 (Rivard et al. 2004)
pub const RIVARD_2004_IR192: ReferenceTable = ReferenceTable {
    name: "Rivard et al. 2004, HDR Ir-192",
    radii: &[0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 7.5, 10.0],
    values: &[
        1.0465, 1.0230, 1.0115, 1.0000, 0.9780, 0.9590, 0.9255, 0.8925, 0.8595, 0.7965, 0.7420,
    ],
};

impl ReferenceTable {
    /// Linear interpolation within the tabulated range
    ///
    /// Distances outside the table are `None`, there is no extrapolation.
    ///
    /// ```rust
    /// # use dosekit_tg43::RIVARD_2004_IR192;
    /// assert_eq!(RIVARD_2004_IR192.interpolate(1.0), Some(1.0));
    /// assert!((RIVARD_2004_IR192.interpolate(1.25).unwrap() - 0.989).abs() < 1e-12);
    /// assert_eq!(RIVARD_2004_IR192.interpolate(12.0), None);
    /// ```
    pub fn interpolate(&self, radius: f64) -> Option<f64> {
        if let Some(i) = self.radii.iter().position(|r| *r == radius) {
            return Some(self.values[i]);
        }

        let position = self
            .radii
            .windows(2)
            .position(|w| w[0] <= radius && radius <= w[1])?;

        let (r0, r1) = (self.radii[position], self.radii[position + 1]);
        let (g0, g1) = (self.values[position], self.values[position + 1]);
        Some(g0 + (g1 - g0) * (radius - r0) / (r1 - r0))
    }
}

/// Simulated and literature values at a single shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceDeviation {
    /// Shell centre (cm)
    pub radius: f64,
    /// Simulated value
    pub simulated: f64,
    /// Literature value interpolated to the shell centre
    pub reference: f64,
    /// `(simulated - reference) / reference` in percent
    pub deviation_percent: f64,
}

impl std::fmt::Display for ReferenceDeviation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = f!(
            "{:8.3} cm | {:8.4} | {:8.4} | {:+8.2}%",
            self.radius,
            self.simulated,
            self.reference,
            self.deviation_percent
        );
        write!(f, "{s}")
    }
}

/// Compare every shell of a profile with a literature table
///
/// Shells with a centre outside the tabulated range are left out.
///
/// ```rust
/// # use dosekit_tg43::{compare_with_reference, RadialAggregator, RIVARD_2004_IR192};
/// # use dosekit_samples::Sample;
/// let samples = (1..100)
///     .map(|i| Sample::new(0.1 * i as f64, 0.0, 0.0, 1.0))
///     .collect::<Vec<Sample>>();
///
/// let radial = RadialAggregator::new(vec![0.5, 1.5, 2.5]).unwrap();
/// let profile = radial.from_samples(&samples);
///
/// // a flat profile sits above the falling literature curve
/// let deviations = compare_with_reference(&profile, &RIVARD_2004_IR192);
/// assert_eq!(deviations.len(), 2);
/// assert!(deviations[1].deviation_percent > 0.0);
/// ```
pub fn compare_with_reference(
    profile: &RadialProfile,
    table: &ReferenceTable,
) -> Vec<ReferenceDeviation> {
    let deviations = profile
        .points()
        .filter_map(|(radius, simulated)| {
            table.interpolate(radius).map(|reference| ReferenceDeviation {
                radius,
                simulated,
                reference,
                deviation_percent: (simulated - reference) / reference * 100.0,
            })
        })
        .collect::<Vec<ReferenceDeviation>>();

    debug!(
        "Compared {} of {} shells against {}",
        deviations.len(),
        profile.centers.len(),
        table.name
    );

    deviations
}
