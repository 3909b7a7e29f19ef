//! Result and Error types for the stats module

/// Type alias for `Result<T, stats::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `dosekit-stats`
pub enum Error {
    /// Failure in a grid operation
    #[error(transparent)]
    Grid(#[from] dosekit_grid::Error),

    /// Ring edges are unusable
    #[error(transparent)]
    Edges(#[from] dosekit_utils::Error),

    /// Mask does not cover the same cells as the map
    #[error("mask '{name}' has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Mask array length does not match its axes
    #[error("mask '{name}' has {found} cells, axes need {expected}")]
    MaskLength {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Windows must have an odd, non-zero size to have a centre
    #[error("window size must be odd and non-zero (found {0})")]
    InvalidWindow(usize),

    /// The t distribution could not be built
    #[error("failed to build t distribution: {0}")]
    Distribution(String),

    /// A t-test needs at least two values per window
    #[error("minimum valid count must be at least 2 (found {0})")]
    InvalidMinimumCount(usize),
}
