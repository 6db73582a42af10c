use harris_image::{Image, ImageError};

use super::{kernels, separable_filter_with_strategy, BorderType};
use crate::parallel::ExecutionStrategy;

/// Compute the first order spatial derivatives with the 3x3 sobel operator.
///
/// The kernels are not normalized: a unit step along x yields a response of 4
/// on the step, as OpenCV's `Sobel(ksize = 3)` does. Borders are reflected
/// ([`BorderType::Reflect101`]) so a constant image has zero gradient everywhere.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dx` - The destination x-derivative with shape (H, W, C).
/// * `dy` - The destination y-derivative with shape (H, W, C).
/// * `strategy` - Execution strategy for the underlying separable filters.
pub fn spatial_gradient_sobel<const C: usize>(
    src: &Image<f32, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    let (deriv, smooth) = kernels::sobel_kernel_1d();

    separable_filter_with_strategy(
        src,
        dx,
        &deriv,
        &smooth,
        BorderType::Reflect101,
        strategy,
    )?;
    separable_filter_with_strategy(
        src,
        dy,
        &smooth,
        &deriv,
        BorderType::Reflect101,
        strategy,
    )?;

    Ok(())
}
