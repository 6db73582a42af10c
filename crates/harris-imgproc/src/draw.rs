use harris_image::{Image, ImageError};

/// Helper function to set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a filled circle on an image inplace.
///
/// Pixels whose center lies within `radius` of `center` are painted. Parts of
/// the circle outside the image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle in pixels.
/// * `color` - The fill color as an array of `C` elements.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let r_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r_sq {
                set_pixel(img, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Expand a single channel image into `C` identical channels.
///
/// Handy to paint colored markers over a grayscale image.
pub fn gray_to_channels<const C: usize>(src: &Image<u8, 1>) -> Result<Image<u8, C>, ImageError> {
    let data = src
        .as_slice()
        .iter()
        .flat_map(|&v| std::iter::repeat(v).take(C))
        .collect::<Vec<_>>();

    Image::new(src.size(), data)
}
