use harris_image::Image;

use super::HarrisError;
use crate::filter::{gaussian_kernel_size, kernels, separable_filter_with_strategy, BorderType};
use crate::parallel::ExecutionStrategy;

/// Largest accepted gaussian sigma.
pub const MAX_SIGMA: f32 = 1000.0;

pub(crate) fn validate_sigma(sigma: f32) -> Result<(), HarrisError> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(HarrisError::invalid_parameter(
            "sigma",
            format!("must be finite and greater than 0, got {sigma}"),
        ));
    }
    if sigma > MAX_SIGMA {
        return Err(HarrisError::invalid_parameter(
            "sigma",
            format!("must not exceed {MAX_SIGMA}, got {sigma}"),
        ));
    }
    Ok(())
}

/// Gaussian smoothing with a validated sigma.
///
/// Holds the normalized 1D kernel of size `2 * ceil(3 * sigma) + 1`, applied
/// along both axes with reflected borders. The Harris pipeline reuses this very
/// kernel as the structure tensor window.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianSmoother {
    sigma: f32,
    kernel: Vec<f32>,
}

impl GaussianSmoother {
    /// Build the smoother.
    ///
    /// # Errors
    ///
    /// [`HarrisError::InvalidParameter`] when `sigma` is not finite, not
    /// positive or above [`MAX_SIGMA`].
    pub fn new(sigma: f32) -> Result<Self, HarrisError> {
        validate_sigma(sigma)?;
        let kernel = kernels::gaussian_kernel_1d(gaussian_kernel_size(sigma), sigma);
        Ok(Self { sigma, kernel })
    }

    /// The gaussian sigma.
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// The 1D kernel.
    pub fn kernel(&self) -> &[f32] {
        &self.kernel
    }

    /// Smooth `src` into `dst`, both of the same size.
    pub fn apply<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        strategy: ExecutionStrategy,
    ) -> Result<(), HarrisError> {
        separable_filter_with_strategy(
            src,
            dst,
            &self.kernel,
            &self.kernel,
            BorderType::Reflect101,
            strategy,
        )?;
        Ok(())
    }

    /// Convert an 8-bit image to floating point (0-255 scale) and smooth it.
    pub fn smooth_u8(
        &self,
        src: &Image<u8, 1>,
        strategy: ExecutionStrategy,
    ) -> Result<Image<f32, 1>, HarrisError> {
        let gray = src.cast_and_scale(1.0f32)?;
        let mut smoothed = Image::from_size_val(gray.size(), 0.0f32)?;
        self.apply(&gray, &mut smoothed, strategy)?;
        Ok(smoothed)
    }
}

/// Blur an image with a gaussian kernel of size `2 * ceil(3 * sigma) + 1`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The standard deviation of the gaussian, in pixels.
/// * `strategy` - Execution strategy.
///
/// # Errors
///
/// [`HarrisError::InvalidParameter`] for an invalid `sigma`, before `dst` is
/// touched; [`HarrisError::Image`] when the sizes differ.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
    strategy: ExecutionStrategy,
) -> Result<(), HarrisError> {
    GaussianSmoother::new(sigma)?.apply(src, dst, strategy)
}
