#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// utilities to draw on images.
pub mod draw;

/// corner detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// operations to normalize images.
pub mod normalize;

/// module containing parallization utilities.
pub mod parallel;
