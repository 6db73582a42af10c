/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must share a size do not.
    #[error("Image size mismatch: ({0}x{1}) vs ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a filter kernel is empty or has an even length.
    #[error("Invalid kernel length: kernel_x={0}, kernel_y={1}")]
    InvalidKernelLength(usize, usize),

    /// Error when a pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) out of bounds for image of size {2}x{3}")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a channel index is out of bounds.
    #[error("Channel index {0} out of bounds for image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a pixel value cannot be cast to the target type.
    #[error("Failed to cast pixel value to {0}")]
    CastError(String),
}
