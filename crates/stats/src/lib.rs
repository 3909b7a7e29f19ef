//! Region statistics and local significance for dose difference maps
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod descriptive;
mod error;
mod region;
mod ring;
mod significance;

// Inline anything important for a nice public API
#[doc(inline)]
pub use descriptive::RegionStats;

#[doc(inline)]
pub use region::{region_statistics, Mask, NamedRegion, Region, RegionSummary};

#[doc(inline)]
pub use ring::{ring_statistics, RingSummary};

#[doc(inline)]
pub use significance::{local_significance, Significance, WindowStat};

#[doc(inline)]
pub use error::{Error, Result};
