//! `dosekit` is a semi-modular toolkit for post-processing Monte Carlo
//! brachytherapy dose samples
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use dosekit_utils as utils;

#[cfg(feature = "grid")]
#[cfg_attr(docsrs, doc(cfg(feature = "grid")))]
#[doc(inline)]
pub use dosekit_grid as grid;

#[cfg(feature = "pipeline")]
#[cfg_attr(docsrs, doc(cfg(feature = "pipeline")))]
#[doc(inline)]
pub use dosekit_pipeline as pipeline;

#[cfg(feature = "samples")]
#[cfg_attr(docsrs, doc(cfg(feature = "samples")))]
#[doc(inline)]
pub use dosekit_samples as samples;

#[cfg(feature = "stats")]
#[cfg_attr(docsrs, doc(cfg(feature = "stats")))]
#[doc(inline)]
pub use dosekit_stats as stats;

#[cfg(feature = "tg43")]
#[cfg_attr(docsrs, doc(cfg(feature = "tg43")))]
#[doc(inline)]
pub use dosekit_tg43 as tg43;
