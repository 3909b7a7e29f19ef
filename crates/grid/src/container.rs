//! Binary container for pre-built grids
//!
//! Grids are written with `bincode` behind a small fixed header so that
//! histograms built once from large sample files can be reloaded quickly.
//!
//! ```text
//! "DKGR"  4 magic bytes
//! u32     container version
//! ...     bincode encoded axes and values
//! ```

// crate modules
use crate::axis::AxisSpec;
use crate::error::{Error, Result};
use crate::grid::Grid;

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

// external crates
use bincode::{deserialize_from, serialize_into};
use log::debug;

/// Magic bytes at the start of every container
const MAGIC: [u8; 4] = *b"DKGR";

/// Current container version
const VERSION: u32 = 1;

/// Write a [Grid] to a binary container file
///
/// ```rust, no_run
/// # use dosekit_grid::{write_grid_file, AxisSpec, Grid};
/// let axis = AxisSpec::new(-9.0, 9.0, 180).unwrap();
/// let grid = Grid::zeros(vec![axis, axis]).unwrap();
///
/// write_grid_file(&grid, "./water.grid").unwrap();
/// ```
pub fn write_grid_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;

    writer.write_all(&MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    serialize_into(&mut writer, grid.axes())?;
    serialize_into(&mut writer, grid.values())?;
    writer.flush()?;

    Ok(())
}

/// Read a [Grid] from a binary container file
///
/// The header is checked before anything is deserialised, and the grid is
/// validated exactly as [Grid::from_parts()] would.
///
/// ```rust, no_run
/// # use dosekit_grid::read_grid_file;
/// let grid = read_grid_file("./water.grid").unwrap();
/// println!("{grid}");
/// ```
pub fn read_grid_file<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let mut reader = init_reader(path.as_ref())?;

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::UnknownContainer { found: magic });
    }

    let mut buffer = [0u8; std::mem::size_of::<u32>()];
    reader.read_exact(&mut buffer)?;
    let version = u32::from_le_bytes(buffer);
    if version != VERSION {
        return Err(Error::UnsupportedVersion {
            expected: VERSION,
            found: version,
        });
    }

    let axes: Vec<AxisSpec> = deserialize_from(&mut reader)?;
    let values: Vec<f64> = deserialize_from(&mut reader)?;

    Grid::from_parts(axes, values)
}

/// Initialise a reader from anything that can be turned into a path
fn init_reader(path: &Path) -> Result<BufReader<File>> {
    debug!("Reading grid container {}", path.display());
    let file = File::open(path)?;
    Ok(BufReader::new(file))
}

/// Initialise a writer from anything that can be turned into a path
fn init_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}
