//! Module for sample-related data and implementations

// dosekit modules
use dosekit_utils::ValueExt;

// external crates
use serde::{Deserialize, Serialize};

/// A single energy deposition event from the transport code
///
/// Coordinates are in centimetres and the deposited energy in MeV, once any
/// unit correction has been applied by the reader.
///
/// Samples are plain `Copy` values. Nothing in the toolkit modifies a sample
/// once it has been read, corrections produce a new one.
///
/// ```rust
/// # use dosekit_samples::Sample;
/// let sample = Sample::new(3.0, 4.0, 0.0, 0.25);
/// assert_eq!(sample.radius(), 5.0);
/// assert_eq!(sample.polar_angle(), Some(std::f64::consts::FRAC_PI_2));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// x position (cm)
    pub x: f64,
    /// y position (cm)
    pub y: f64,
    /// z position (cm)
    pub z: f64,
    /// Deposited energy (MeV)
    pub energy: f64,
}

impl Sample {
    /// New sample from a position and energy
    pub const fn new(x: f64, y: f64, z: f64, energy: f64) -> Self {
        Self { x, y, z, energy }
    }

    /// Apply a linear unit correction to the position
    ///
    /// Every coordinate is multiplied by `factor` and the energy is unchanged.
    ///
    /// ```rust
    /// # use dosekit_samples::Sample;
    /// // positions written in mm but labelled as cm
    /// let raw = Sample::new(-89.7, 12.0, 5.0, 0.031);
    /// let fixed = raw.corrected(0.1);
    ///
    /// assert!((fixed.x + 8.97).abs() < 1e-12);
    /// assert_eq!(fixed.energy, 0.031);
    /// ```
    pub fn corrected(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
            energy: self.energy,
        }
    }

    /// Position as an `[x, y, z]` array
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Value of a single coordinate
    pub fn coordinate(&self, coordinate: Coordinate) -> f64 {
        match coordinate {
            Coordinate::X => self.x,
            Coordinate::Y => self.y,
            Coordinate::Z => self.z,
        }
    }

    /// Distance from the origin, i.e. from the source centre
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Polar angle from the +z axis (source long axis) in radians
    ///
    /// Undefined at the origin, where `None` is returned.
    pub fn polar_angle(&self) -> Option<f64> {
        let r = self.radius();
        if r > 0.0 {
            // clamp protects acos from rounding just outside [-1, 1]
            Some((self.z / r).clamp(-1.0, 1.0).acos())
        } else {
            None
        }
    }

    /// True if every field is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.energy.is_finite()
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4}) {:>13}",
            self.x,
            self.y,
            self.z,
            self.energy.sci(5, 2)
        )
    }
}

/// Cartesian coordinate labels
///
/// Grid dimensions are always mapped onto these in order, so a two dimensional
/// grid is (x, y) in the z = 0 plane and a three dimensional grid is (x, y, z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    /// x coordinate
    X,
    /// y coordinate
    Y,
    /// z coordinate, along the source long axis
    Z,
}

impl Coordinate {
    /// All coordinates in grid dimension order
    pub const ALL: [Coordinate; 3] = [Coordinate::X, Coordinate::Y, Coordinate::Z];

    /// Coordinate for a grid dimension index, if there is one
    pub fn from_dimension(dimension: usize) -> Option<Self> {
        Self::ALL.get(dimension).copied()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Coordinate::X => "x",
            Coordinate::Y => "y",
            Coordinate::Z => "z",
        };
        write!(f, "{name}")
    }
}

/// What to do with samples that deposit no energy, or negative energy
///
/// Negative deposition is unphysical but does appear in some transport
/// outputs. The policy has to be chosen explicitly since it changes the totals.
///
/// | Policy       | Sample with energy <= 0                      |
/// | ------------ | -------------------------------------------- |
/// | `Reject`     | Dropped and counted as rejected              |
/// | `ZeroWeight` | Kept with energy set to 0.0 and counted      |
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyPolicy {
    /// Exclude the sample entirely
    #[default]
    Reject,
    /// Keep the position but contribute no energy
    ZeroWeight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correction_round_trip() {
        let sample = Sample::new(-8.97, 0.125, 4.5, 1.0e-3);
        let back = sample.corrected(10.0).corrected(0.1);
        assert!((back.x - sample.x).abs() < 1e-12);
        assert!((back.y - sample.y).abs() < 1e-12);
        assert!((back.z - sample.z).abs() < 1e-12);
        assert_eq!(back.energy, sample.energy);
    }

    #[test]
    fn polar_angle_limits() {
        assert_eq!(Sample::new(0.0, 0.0, 0.0, 1.0).polar_angle(), None);
        assert_eq!(Sample::new(0.0, 0.0, 2.0, 1.0).polar_angle(), Some(0.0));
        assert_eq!(
            Sample::new(0.0, 0.0, -2.0, 1.0).polar_angle(),
            Some(std::f64::consts::PI)
        );
    }

    #[test]
    fn coordinate_lookup() {
        let sample = Sample::new(1.0, 2.0, 3.0, 0.5);
        assert_eq!(sample.coordinate(Coordinate::Y), 2.0);
        assert_eq!(Coordinate::from_dimension(2), Some(Coordinate::Z));
        assert_eq!(Coordinate::from_dimension(3), None);
    }
}
