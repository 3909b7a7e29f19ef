//! Result and Error types for the grid module

// crate modules
use crate::axis::AxisSpec;

/// Type alias for `Result<T, grid::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `dosekit-grid`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Failure to serialise or deserialise a grid container
    #[error("failed to (de)serialise grid container")]
    Bincode(#[from] Box<bincode::ErrorKind>),

    /// Failure in a utility operation such as a bin search
    #[error(transparent)]
    Utility(#[from] dosekit_utils::Error),

    /// Axis with an empty or inverted range, or no bins
    #[error("invalid axis (min {min}, max {max}, bins {bins})")]
    InvalidAxis { min: f64, max: f64, bins: usize },

    /// Edges that can not be represented by a uniform axis
    #[error("bin edges are not uniform, edge {index} deviates")]
    NonUniformEdges { index: usize },

    /// Only 2D and 3D grids are supported
    #[error("unsupported number of dimensions ({0}), expected 2 or 3")]
    UnsupportedDimensions(usize),

    /// Flat value array does not match the axes
    #[error("expected {expected} values for the grid axes, found {found}")]
    ValueCountMismatch { expected: usize, found: usize },

    /// Two datasets were binned on different axes
    #[error("grid axes do not match (expected {expected:?}, found {found:?})")]
    ShapeMismatch {
        expected: Vec<AxisSpec>,
        found: Vec<AxisSpec>,
    },

    /// Index outside of the grid dimensions
    #[error("index {index} is out of range for dimension of length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// Container header is not recognised
    #[error("not a dosekit grid container (found magic bytes {found:?})")]
    UnknownContainer { found: [u8; 4] },

    /// Container written by an incompatible version
    #[error("unsupported grid container version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },
}
