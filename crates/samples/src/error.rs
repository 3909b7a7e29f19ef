//! Result and Error types for dosekit-samples

use std::path::PathBuf;

/// Type alias for Result<T, samples::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `dosekit-samples` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("sample source {path:?} could not be opened")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading stopped early after line {line}")]
    Interrupted {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("unit correction factor must be finite and positive (found {0})")]
    InvalidCorrectionFactor(f64),

    #[error("failed to initialise progress bar: {0}")]
    ProgressBar(String),
}
