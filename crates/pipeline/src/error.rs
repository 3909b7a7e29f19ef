//! Result and Error types for the pipeline module

/// Type alias for `Result<T, pipeline::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `dosekit-pipeline`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Failure to read or write JSON
    #[error("failed to (de)serialise JSON")]
    Json(#[from] serde_json::Error),

    /// Failure to write CSV
    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),

    /// Failure reading samples
    #[error(transparent)]
    Samples(#[from] dosekit_samples::Error),

    /// Failure in a grid operation
    #[error(transparent)]
    Grid(#[from] dosekit_grid::Error),

    /// Failure computing TG-43 parameters
    #[error(transparent)]
    Tg43(#[from] dosekit_tg43::Error),

    /// Failure computing statistics
    #[error(transparent)]
    Stats(#[from] dosekit_stats::Error),

    /// Configuration value that can never work
    #[error("invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}
