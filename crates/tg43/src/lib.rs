//! TG-43 dosimetric parameters from point samples or grids
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod angular;
mod error;
mod radial;
mod reference;
mod tally;

// Inline anything important for a nice public API
#[doc(inline)]
pub use radial::{Aggregate, Normalization, RadialAccumulator, RadialAggregator, RadialProfile};

#[doc(inline)]
pub use angular::{AngularAggregator, AngularProfile};

#[doc(inline)]
pub use reference::{compare_with_reference, ReferenceDeviation, ReferenceTable, RIVARD_2004_IR192};

#[doc(inline)]
pub use error::{Error, Result};
