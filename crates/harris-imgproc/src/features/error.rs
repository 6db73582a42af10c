use harris_image::{ImageError, ImageSize};

/// An error type for the corner detection pipelines.
///
/// An image without corners is not an error: detectors return an empty corner set.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum HarrisError {
    /// The input image has zero width or zero height.
    #[error("Invalid input image: {0} has no pixels")]
    InvalidInput(ImageSize),

    /// A configuration value is outside its valid range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },

    /// Error propagated from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl HarrisError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        HarrisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
