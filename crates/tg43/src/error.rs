//! Result and Error types for the tg43 module

/// Type alias for `Result<T, tg43::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `dosekit-tg43`
pub enum Error {
    /// Failure in a utility operation such as an edge check
    #[error(transparent)]
    Utility(#[from] dosekit_utils::Error),

    /// Radial edges must start at or beyond the source centre
    #[error("radial edges must be non-negative (first edge {0})")]
    NegativeRadius(f64),

    /// Polar edges must lie within [0, pi]
    #[error("polar angle edges must lie within [0, pi] (found {min} to {max})")]
    InvalidAngularEdges { min: f64, max: f64 },

    /// Reference value not covered by the binning
    #[error("reference {value} outside of binned range [{lower}, {upper}]")]
    ReferenceOutOfRange { value: f64, lower: f64, upper: f64 },

    /// Reference radius must be a positive finite distance
    #[error("reference radius must be finite and positive (found {0})")]
    InvalidReferenceRadius(f64),

    /// Angular profiles need a third dimension
    #[error("angular profiles need a 3D grid (found {0}D)")]
    UnsupportedGrid(usize),
}
