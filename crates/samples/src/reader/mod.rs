//! Reading point-sample files
//!
//! Each data line holds one energy deposition event:
//!
//! ```text
//! # x(cm)      y(cm)      z(cm)      edep(MeV)
//! -8.9700E+01  1.2500E+00 0.0000E+00 3.1023E-02
//! ```
//!
//! Fields are whitespace separated and anything after the fourth is ignored.
//! Comments, blank lines, and lines that fail to parse are skipped and
//! counted in the [IngestSummary](crate::IngestSummary).
//!
//! For full control use [SampleReader]. The convenience functions here cover
//! the common case of a file with only a unit correction to apply, and never
//! print progress.

mod parsers;
mod stream;

#[doc(inline)]
pub use stream::{SampleReader, SampleStream};

// crate modules
use crate::error::Result;
use crate::sample::Sample;
use crate::summary::IngestSummary;

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read every sample from a file into memory
///
/// `factor` is the linear unit correction applied to every coordinate, use
/// `1.0` for none. Fails if the file can not be read to the end.
///
/// Example
/// ```rust, no_run
/// # use dosekit_samples::read_samples;
/// let (samples, summary) = read_samples("path/to/EnergyDeposition.out", 0.1).unwrap();
/// assert_eq!(samples.len(), summary.samples);
/// ```
pub fn read_samples<P: AsRef<Path>>(path: P, factor: f64) -> Result<(Vec<Sample>, IngestSummary)> {
    let mut stream = open_samples(path, factor)?;
    let samples = stream.by_ref().collect();
    Ok((samples, stream.into_summary()?))
}

/// Open a file as a lazy stream of samples
///
/// Preferred over [read_samples()] for large files, since nothing is kept in
/// memory beyond the current line.
///
/// Example
/// ```rust, no_run
/// # use dosekit_samples::open_samples;
/// let mut stream = open_samples("path/to/EnergyDeposition.out", 1.0).unwrap();
/// let total: f64 = stream.by_ref().map(|s| s.energy).sum();
/// ```
pub fn open_samples<P: AsRef<Path>>(path: P, factor: f64) -> Result<SampleStream<BufReader<File>>> {
    let mut reader = SampleReader::new();
    reader.set_correction_factor(factor);
    reader.disable_progress();
    reader.open(path)
}
