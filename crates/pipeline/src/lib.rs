//! Configurable dosimetry and comparison pipelines for dose samples
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod pipeline;
mod report;
mod writers;

// Inline anything important for a nice public API
#[doc(inline)]
pub use config::{AngularConfig, Config, RadialConfig, SignificanceConfig};

#[doc(inline)]
pub use pipeline::Pipeline;

#[doc(inline)]
pub use report::{ComparisonReport, DatasetSummary, Diagnostics, DosimetryReport};

#[doc(inline)]
pub use writers::{write_angular_csv, write_json, write_radial_csv};

#[doc(inline)]
pub use error::{Error, Result};
