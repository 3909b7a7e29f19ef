//! Regular grids of accumulated energy and comparisons between them
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod axis;
mod binner;
mod container;
mod difference;
mod error;
mod grid;
mod value_map;

// Inline anything important for a nice public API
#[doc(inline)]
pub use axis::AxisSpec;

#[doc(inline)]
pub use grid::Grid;

#[doc(inline)]
pub use value_map::ValueMap;

#[doc(inline)]
pub use binner::{BinSummary, Binned, Binner};

#[doc(inline)]
pub use difference::{difference, ratio, DifferenceResult};

#[doc(inline)]
pub use container::{read_grid_file, write_grid_file};

#[doc(inline)]
pub use error::{Error, Result};
