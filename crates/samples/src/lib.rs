//! Point-sample energy deposition records and file reading
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod sample;
mod summary;

pub mod reader;

#[doc(inline)]
pub use reader::{open_samples, read_samples, SampleReader, SampleStream};

#[doc(inline)]
pub use sample::{Coordinate, EnergyPolicy, Sample};

#[doc(inline)]
pub use summary::{Extent, IngestSummary, SanityIssue};

#[doc(inline)]
pub use error::{Error, Result};
