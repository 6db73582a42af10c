use harris_image::Image;

use super::HarrisError;

/// Represents a detected corner point in an image with its position and score.
///
/// Coordinates are integer pixel positions with the origin at the top-left
/// corner: `x` is the column and `y` the row.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corner {
    /// The x-coordinate (column) of the corner in the image.
    pub x: usize,
    /// The y-coordinate (row) of the corner in the image.
    pub y: usize,
    /// The detector response at the corner.
    pub score: f32,
}

impl Corner {
    /// Creates a new corner with the specified coordinates and score.
    pub fn new(x: usize, y: usize, score: f32) -> Self {
        Corner { x, y, score }
    }
}

/// A corner selection strategy over a grayscale 8-bit image.
///
/// Implementations are stateless across calls: every invocation processes one
/// image and returns its corner set.
pub trait CornerDetector {
    /// Detect corners in `src`.
    ///
    /// An image without corners yields `Ok` with an empty vector.
    fn detect(&self, src: &Image<u8, 1>) -> Result<Vec<Corner>, HarrisError>;
}
