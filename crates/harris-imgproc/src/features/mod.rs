//! Corner detection from the image structure tensor.
//!
//! The Harris pipeline is split into small stages that can also be used on
//! their own:
//!
//! - [`GaussianSmoother`]: validated gaussian smoothing.
//! - [`GradientField`]: sobel derivatives of a smoothed image.
//! - [`StructureTensorField`]: windowed gradient products.
//! - [`harris_response`] / [`min_eigen_response`]: per-pixel corner scores.
//! - [`threshold_response`]: candidates above a fraction of the maximum score.
//! - [`non_max_suppression`]: local maxima over clipped windows.
//!
//! [`HarrisDetector`] chains them. [`GoodFeaturesDetector`] is an alternative
//! Shi-Tomasi selection. Both implement [`CornerDetector`].
//!
//! # Examples
//!
//! ```
//! use harris_image::Image;
//! use harris_imgproc::features::{harris_corners, HarrisConfig};
//!
//! let image = Image::<u8, 1>::from_size_val([32, 32].into(), 128).unwrap();
//! let corners = harris_corners(&image, &HarrisConfig::default()).unwrap();
//! assert!(corners.is_empty());
//! ```

mod detector;
pub use detector::*;

mod error;
pub use error::*;

mod gftt;
pub use gftt::*;

mod harris;
pub use harris::{harris_corners, HarrisConfig, HarrisDetection, HarrisDetector};

mod nms;
pub use nms::*;

mod responses;
pub use responses::*;

mod smoother;
pub use smoother::{gaussian_blur, GaussianSmoother, MAX_SIGMA};

mod structure_tensor;
pub use structure_tensor::*;

mod threshold;
pub use threshold::*;
