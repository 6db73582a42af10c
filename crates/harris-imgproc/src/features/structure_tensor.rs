use harris_image::{Image, ImageError, ImageSize};

use crate::filter::{separable_filter_with_strategy, spatial_gradient_sobel, BorderType};
use crate::parallel::{par_iter_rows_val_two, ExecutionStrategy};

/// Per-pixel first order derivatives of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientField {
    /// Derivative along x (columns).
    pub gx: Image<f32, 1>,
    /// Derivative along y (rows).
    pub gy: Image<f32, 1>,
}

impl GradientField {
    /// Compute the sobel gradients of `src`.
    pub fn from_image(src: &Image<f32, 1>, strategy: ExecutionStrategy) -> Result<Self, ImageError> {
        let mut gx = Image::from_size_val(src.size(), 0.0f32)?;
        let mut gy = Image::from_size_val(src.size(), 0.0f32)?;
        spatial_gradient_sobel(src, &mut gx, &mut gy, strategy)?;
        Ok(Self { gx, gy })
    }

    /// Size shared by both gradient images.
    pub fn size(&self) -> ImageSize {
        self.gx.size()
    }

    /// Euclidean gradient magnitude `sqrt(gx² + gy²)`.
    pub fn magnitude(&self, strategy: ExecutionStrategy) -> Result<Image<f32, 1>, ImageError> {
        let mut dst = Image::from_size_val(self.size(), 0.0f32)?;
        par_iter_rows_val_two(&self.gx, &self.gy, &mut dst, strategy, |&dx, &dy, out| {
            *out = (dx * dx + dy * dy).sqrt();
        });
        Ok(dst)
    }

    /// Gradient orientation `atan2(gy, gx)` in degrees, in `[-180, 180]`.
    pub fn angle_degrees(&self, strategy: ExecutionStrategy) -> Result<Image<f32, 1>, ImageError> {
        let mut dst = Image::from_size_val(self.size(), 0.0f32)?;
        par_iter_rows_val_two(&self.gx, &self.gy, &mut dst, strategy, |&dx, &dy, out| {
            *out = dy.atan2(dx).to_degrees();
        });
        Ok(dst)
    }
}

/// The three distinct entries of the per-pixel 2x2 structure tensor
/// `[[sxx, sxy], [sxy, syy]]`.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureTensorField {
    /// Windowed sum of `gx²`.
    pub sxx: Image<f32, 1>,
    /// Windowed sum of `gy²`.
    pub syy: Image<f32, 1>,
    /// Windowed sum of `gx·gy`.
    pub sxy: Image<f32, 1>,
}

impl StructureTensorField {
    /// Build the structure tensor from a gradient field.
    ///
    /// The pointwise products `gx²`, `gy²` and `gx·gy` are each smoothed with the
    /// separable `window` kernel (applied along both axes), which turns them into
    /// weighted neighbourhood sums.
    ///
    /// # Arguments
    ///
    /// * `gradients` - The image gradients.
    /// * `window` - 1D window kernel, odd length.
    /// * `strategy` - Execution strategy for the pointwise products and the filters.
    pub fn from_gradients(
        gradients: &GradientField,
        window: &[f32],
        strategy: ExecutionStrategy,
    ) -> Result<Self, ImageError> {
        let size = gradients.size();
        let (gx, gy) = (&gradients.gx, &gradients.gy);

        let mut dx2 = Image::from_size_val(size, 0.0f32)?;
        let mut dy2 = Image::from_size_val(size, 0.0f32)?;
        let mut dxy = Image::from_size_val(size, 0.0f32)?;
        par_iter_rows_val_two(gx, gy, &mut dx2, strategy, |&dx, _, out| *out = dx * dx);
        par_iter_rows_val_two(gx, gy, &mut dy2, strategy, |_, &dy, out| *out = dy * dy);
        par_iter_rows_val_two(gx, gy, &mut dxy, strategy, |&dx, &dy, out| *out = dx * dy);

        let smooth = |src: &Image<f32, 1>| -> Result<Image<f32, 1>, ImageError> {
            let mut dst = Image::from_size_val(size, 0.0f32)?;
            separable_filter_with_strategy(
                src,
                &mut dst,
                window,
                window,
                BorderType::Reflect101,
                strategy,
            )?;
            Ok(dst)
        };

        Ok(Self {
            sxx: smooth(&dx2)?,
            syy: smooth(&dy2)?,
            sxy: smooth(&dxy)?,
        })
    }

    /// Size shared by the three tensor images.
    pub fn size(&self) -> ImageSize {
        self.sxx.size()
    }
}
