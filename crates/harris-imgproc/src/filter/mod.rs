//! Filter operations
//!
//! This module provides filter operations for image processing.

/// Filter kernels
pub mod kernels;
pub use kernels::gaussian_kernel_size;

/// Border handling
mod border;
pub use border::*;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;
