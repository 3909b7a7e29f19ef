// crate modules
use crate::error::{Error, Result};
use crate::reader::parsers;
use crate::sample::{EnergyPolicy, Sample};
use crate::summary::IngestSummary;

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, warn};

/// Number of malformed lines reported individually before going quiet
const MALFORMED_WARNING_LIMIT: usize = 5;

/// A configurable reader for point-sample energy deposition files
///
/// The reader itself holds only settings. Calling [open()](SampleReader::open)
/// or [stream()](SampleReader::stream) produces a [SampleStream], which is
/// where the reading actually happens.
///
/// Minimal Example:
/// ```rust, no_run
/// # use dosekit_samples::{SampleReader, EnergyPolicy};
/// let mut reader = SampleReader::new();
/// reader.set_correction_factor(0.1);      // mm mislabelled as cm
/// reader.set_energy_policy(EnergyPolicy::ZeroWeight);
/// reader.disable_progress();
///
/// let mut stream = reader.open("path/to/EnergyDeposition.out").unwrap();
/// let total: f64 = stream.by_ref().map(|s| s.energy).sum();
/// println!("{}", stream.summary());
/// ```
#[derive(Debug, Clone)]
pub struct SampleReader {
    /// Linear factor applied to every coordinate
    correction_factor: f64,
    /// Lines starting with this are ignored
    comment_marker: char,
    /// Number of leading lines to skip unconditionally
    header_lines: usize,
    /// Treatment of samples with energy <= 0
    energy_policy: EnergyPolicy,
    /// Disable progress bar?
    disable_progress: bool,
}

impl Default for SampleReader {
    fn default() -> Self {
        Self {
            correction_factor: 1.0,
            comment_marker: '#',
            header_lines: 0,
            energy_policy: EnergyPolicy::Reject,
            disable_progress: false,
        }
    }
}

impl SampleReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Setter for the coordinate correction factor, 1.0 by default
    ///
    /// Validated when a stream is created.
    pub fn set_correction_factor(&mut self, factor: f64) {
        self.correction_factor = factor;
    }

    /// Setter for the comment marker, `#` by default
    pub fn set_comment_marker(&mut self, marker: char) {
        self.comment_marker = marker;
    }

    /// Setter for the number of header lines to skip, 0 by default
    pub fn set_header_lines(&mut self, count: usize) {
        self.header_lines = count;
    }

    /// Setter for the treatment of non-positive energies
    pub fn set_energy_policy(&mut self, policy: EnergyPolicy) {
        self.energy_policy = policy;
    }

    /// Do not print the progress indicators
    pub fn disable_progress(&mut self) {
        self.disable_progress = true;
    }

    /// Open a sample file for reading
    ///
    /// Fails with [Error::SourceNotFound] if the file does not exist. Any
    /// other failure to open the file is an [Error::IOError].
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<SampleStream<BufReader<File>>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::SourceNotFound {
                path: path.to_path_buf(),
                source,
            },
            _ => Error::IOError(source),
        })?;
        debug!("Reading samples from {}", path.display());
        self.stream(BufReader::new(file))
    }

    /// Read samples from any buffered source
    ///
    /// ```rust
    /// # use dosekit_samples::SampleReader;
    /// # use std::io::Cursor;
    /// let text = "# x y z edep\n1.0 2.0 3.0 0.5\nnot a sample\n";
    /// let mut stream = SampleReader::new().stream(Cursor::new(text)).unwrap();
    ///
    /// let samples = stream.by_ref().collect::<Vec<_>>();
    /// assert_eq!(samples.len(), 1);
    /// assert_eq!(stream.summary().malformed, 1);
    /// ```
    pub fn stream<R: BufRead>(&self, reader: R) -> Result<SampleStream<R>> {
        let k = self.correction_factor;
        if !k.is_finite() || k <= 0.0 {
            return Err(Error::InvalidCorrectionFactor(k));
        }

        let mut progress_bar = self.init_progress_bar()?;
        if !self.disable_progress {
            progress_bar.refresh()?;
        }

        Ok(SampleStream {
            reader,
            buffer: Vec::new(),
            settings: self.clone(),
            summary: IngestSummary::default(),
            error: None,
            progress_bar,
            is_finished: false,
        })
    }

    /// Initialise the progress bar, if wanted
    fn init_progress_bar(&self) -> Result<Bar> {
        BarBuilder::default()
            .unit(" lines")
            .unit_scale(true)
            .disable(self.disable_progress)
            .bar_format("{count} lines [{rate} lines/s]   ")
            .build()
            .map_err(Error::ProgressBar)
    }
}

/// Lazy, single-pass sequence of [Sample]s
///
/// Reads one line at a time, so at most a single line is held in memory.
/// Every line that does not become a sample is counted in the
/// [IngestSummary], which is complete once the iterator returns `None`.
/// Lines that are not valid UTF-8 are malformed like any other bad record.
///
/// A failure of the underlying source ends the iteration early. The error is
/// kept and returned by [into_summary()](SampleStream::into_summary), so a
/// partial read is never mistaken for a complete one.
///
/// The stream can not be restarted. Open the source again to re-read it.
///
/// Use `by_ref()` to keep hold of the stream while handing it to something
/// that consumes an iterator:
///
/// ```rust
/// # use dosekit_samples::SampleReader;
/// # use std::io::Cursor;
/// let text = "0 0 0 10.0\n1 0 0 5.0\n2 0 0 -1.0\n";
/// let mut stream = SampleReader::new().stream(Cursor::new(text)).unwrap();
///
/// let total: f64 = stream.by_ref().map(|s| s.energy).sum();
/// let summary = stream.into_summary().unwrap();
///
/// assert_eq!(total, 15.0);
/// assert_eq!(summary.rejected, 1);
/// ```
pub struct SampleStream<R> {
    reader: R,
    buffer: Vec<u8>,
    settings: SampleReader,
    summary: IngestSummary,
    error: Option<std::io::Error>,
    progress_bar: Bar,
    is_finished: bool,
}

impl<R> SampleStream<R> {
    /// Counts and totals so far, complete once the stream is exhausted
    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    /// Consume the stream and keep only the summary
    ///
    /// Fails with [Error::Interrupted] if the source stopped early, in which
    /// case the samples already produced are incomplete.
    pub fn into_summary(self) -> Result<IngestSummary> {
        match self.error {
            Some(source) => Err(Error::Interrupted {
                line: self.summary.lines,
                source,
            }),
            None => Ok(self.summary),
        }
    }

    /// True once every line has been read
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// Apply the energy policy to a corrected sample
    ///
    /// Returns `None` for rejected samples, which are counted.
    fn apply_policy(&mut self, sample: Sample) -> Option<Sample> {
        if sample.energy > 0.0 {
            return Some(sample);
        }

        match self.settings.energy_policy {
            EnergyPolicy::Reject => {
                self.summary.rejected += 1;
                None
            }
            EnergyPolicy::ZeroWeight => {
                self.summary.zero_weighted += 1;
                Some(Sample {
                    energy: 0.0,
                    ..sample
                })
            }
        }
    }

    /// Final reporting once the source is exhausted
    fn finish(&mut self) {
        if self.is_finished {
            return;
        }
        self.is_finished = true;

        // need an extra line for clean spacing if the progress bar is printed
        if !self.settings.disable_progress {
            eprintln!()
        }

        if self.summary.malformed > MALFORMED_WARNING_LIMIT {
            warn!(
                "Skipped {} malformed lines in total ({} not shown)",
                self.summary.malformed,
                self.summary.malformed - MALFORMED_WARNING_LIMIT
            );
        }

        if self.summary.rejected > 0 {
            warn!(
                "Rejected {} samples with non-positive energy",
                self.summary.rejected
            );
        }

        debug!(
            "Read {} samples from {} lines, total energy {:e} MeV",
            self.summary.samples, self.summary.lines, self.summary.total_energy
        );
    }
}

impl<R: BufRead> Iterator for SampleStream<R> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.is_finished {
            return None;
        }

        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.finish();
                    return None;
                }
                Ok(_) => (),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Reading stopped after line {}: {e}", self.summary.lines);
                    self.summary.interrupted = true;
                    self.error = Some(e);
                    self.finish();
                    return None;
                }
            }

            self.summary.lines += 1;
            self.progress_bar.update(1).ok();

            if self.summary.lines <= self.settings.header_lines {
                self.summary.header += 1;
                continue;
            }

            let line = match std::str::from_utf8(&self.buffer) {
                Ok(line) => line.trim_end_matches(['\n', '\r']),
                Err(_) => {
                    malformed(&mut self.summary, &String::from_utf8_lossy(&self.buffer));
                    continue;
                }
            };

            if parsers::is_blank(line) {
                self.summary.blank += 1;
                continue;
            }

            if parsers::is_comment(line, self.settings.comment_marker) {
                self.summary.comments += 1;
                continue;
            }

            let sample = match parsers::record(line) {
                Ok((_, [x, y, z, energy])) => {
                    Sample::new(x, y, z, energy).corrected(self.settings.correction_factor)
                }
                Err(_) => {
                    malformed(&mut self.summary, line);
                    continue;
                }
            };

            // checked after correction, a large coordinate can overflow
            if !sample.is_finite() {
                malformed(&mut self.summary, line);
                continue;
            }

            if let Some(sample) = self.apply_policy(sample) {
                self.summary.record(&sample);
                return Some(sample);
            }
        }
    }
}

/// Record a line that could not be read as a sample
fn malformed(summary: &mut IngestSummary, line: &str) {
    summary.malformed += 1;
    if summary.malformed <= MALFORMED_WARNING_LIMIT {
        warn!("Skipping malformed line {}: \"{}\"", summary.lines, line.trim());
    }
}

impl<R> std::fmt::Debug for SampleStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SampleStream")
            .field("settings", &self.settings)
            .field("summary", &self.summary)
            .field("error", &self.error)
            .field("is_finished", &self.is_finished)
            .finish()
    }
}
