use std::time::Instant;

use harris_image::{Image, ImageError};

use super::smoother::validate_sigma;
use super::{
    harris_response, non_max_suppression, threshold_response, Corner, CornerDetector,
    GaussianSmoother, GradientField, HarrisError, ResponseCandidates, StructureTensorField,
    DEFAULT_HARRIS_K,
};
use crate::normalize::normalize_min_max_u8;
use crate::parallel::ExecutionStrategy;

/// Parameters of the Harris corner pipeline.
///
/// The same `sigma` drives the initial image smoothing and the structure tensor
/// window.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HarrisConfig {
    /// Standard deviation of the gaussian kernel, in pixels.
    pub sigma: f32,
    /// Harris sensitivity constant.
    pub k: f32,
    /// Fraction of the maximum response a pixel must exceed, in `(0, 1]`.
    pub threshold_ratio: f32,
    /// Half-width of the non-maximum suppression window.
    pub nms_radius: usize,
    /// Execution strategy of every stage.
    pub strategy: ExecutionStrategy,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            k: DEFAULT_HARRIS_K,
            threshold_ratio: 0.1,
            nms_radius: 1,
            strategy: ExecutionStrategy::Auto,
        }
    }
}

impl HarrisConfig {
    /// Set the gaussian sigma.
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the Harris constant.
    pub fn with_k(mut self, k: f32) -> Self {
        self.k = k;
        self
    }

    /// Set the threshold ratio.
    pub fn with_threshold_ratio(mut self, threshold_ratio: f32) -> Self {
        self.threshold_ratio = threshold_ratio;
        self
    }

    /// Set the non-maximum suppression radius.
    pub fn with_nms_radius(mut self, nms_radius: usize) -> Self {
        self.nms_radius = nms_radius;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check every parameter, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), HarrisError> {
        validate_sigma(self.sigma)?;

        if !self.k.is_finite() {
            return Err(HarrisError::invalid_parameter(
                "k",
                format!("must be finite, got {}", self.k),
            ));
        }

        if !(self.threshold_ratio > 0.0 && self.threshold_ratio <= 1.0) {
            return Err(HarrisError::invalid_parameter(
                "threshold_ratio",
                format!("must be in (0, 1], got {}", self.threshold_ratio),
            ));
        }

        Ok(())
    }
}

pub(crate) fn check_input(src: &Image<u8, 1>) -> Result<(), HarrisError> {
    if src.size().is_empty() {
        return Err(HarrisError::InvalidInput(src.size()));
    }
    Ok(())
}

fn to_u8(src: &Image<f32, 1>, strategy: ExecutionStrategy) -> Result<Image<u8, 1>, ImageError> {
    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    normalize_min_max_u8(src, &mut dst, strategy)?;
    Ok(dst)
}

/// Output of a Harris run, keeping every intermediate grid.
#[derive(Clone, Debug)]
pub struct HarrisDetection {
    /// The detected corners in scan order.
    pub corners: Vec<Corner>,
    /// The gaussian smoothed input.
    pub smoothed: Image<f32, 1>,
    /// Sobel gradients of the smoothed input.
    pub gradients: GradientField,
    /// Gaussian windowed structure tensor.
    pub tensor: StructureTensorField,
    /// Harris response map.
    pub response: Image<f32, 1>,
    /// Thresholded candidates before non-maximum suppression.
    pub candidates: ResponseCandidates,
    strategy: ExecutionStrategy,
}

impl HarrisDetection {
    /// The smoothed image rescaled to `[0, 255]`.
    pub fn smoothed_u8(&self) -> Result<Image<u8, 1>, ImageError> {
        to_u8(&self.smoothed, self.strategy)
    }

    /// The gradient magnitude rescaled to `[0, 255]`.
    pub fn gradient_magnitude_u8(&self) -> Result<Image<u8, 1>, ImageError> {
        to_u8(&self.gradients.magnitude(self.strategy)?, self.strategy)
    }

    /// The response map rescaled to `[0, 255]`.
    pub fn response_u8(&self) -> Result<Image<u8, 1>, ImageError> {
        to_u8(&self.response, self.strategy)
    }

    /// The gradient orientation rescaled to `[0, 255]`.
    pub fn gradient_angle_u8(&self) -> Result<Image<u8, 1>, ImageError> {
        to_u8(&self.gradients.angle_degrees(self.strategy)?, self.strategy)
    }
}

/// Harris corner detector built from an explicit structure tensor.
///
/// The pipeline runs, in order:
///
/// 1. gaussian smoothing with a `2 * ceil(3 * sigma) + 1` kernel;
/// 2. 3x3 sobel gradients;
/// 3. gaussian windowing of `gx²`, `gy²`, `gx·gy` with the same kernel;
/// 4. the Harris response `det - k * trace²`;
/// 5. thresholding at `threshold_ratio * max(response)`;
/// 6. non-maximum suppression over clipped windows.
///
/// # Example
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::features::{HarrisConfig, HarrisDetector};
///
/// let mut data = vec![0u8; 64 * 64];
/// for y in 32..64 {
///     for x in 32..64 {
///         data[y * 64 + x] = 255;
///     }
/// }
/// let image = Image::<u8, 1>::new([64, 64].into(), data).unwrap();
///
/// let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
/// let corners = detector.detect(&image).unwrap();
/// assert_eq!(corners.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct HarrisDetector {
    config: HarrisConfig,
    smoother: GaussianSmoother,
}

impl HarrisDetector {
    /// Validate the configuration and prepare the gaussian kernel.
    pub fn new(config: HarrisConfig) -> Result<Self, HarrisError> {
        config.validate()?;
        let smoother = GaussianSmoother::new(config.sigma)?;
        Ok(Self { config, smoother })
    }

    /// The detector configuration.
    pub fn config(&self) -> &HarrisConfig {
        &self.config
    }

    /// The 1D gaussian kernel shared by the smoothing and windowing stages.
    pub fn kernel(&self) -> &[f32] {
        self.smoother.kernel()
    }

    /// Detect corners, returning them in scan order.
    pub fn detect(&self, src: &Image<u8, 1>) -> Result<Vec<Corner>, HarrisError> {
        Ok(self.detect_with_intermediates(src)?.corners)
    }

    /// Detect corners and keep every intermediate grid.
    pub fn detect_with_intermediates(
        &self,
        src: &Image<u8, 1>,
    ) -> Result<HarrisDetection, HarrisError> {
        check_input(src)?;

        let strategy = self.config.strategy;
        let now = Instant::now();
        log::debug!(
            "harris: image {}, kernel size {}, {:?}",
            src.size(),
            self.kernel().len(),
            self.config
        );

        let smoothed = self.smoother.smooth_u8(src, strategy)?;
        let gradients = GradientField::from_image(&smoothed, strategy)?;
        let tensor = StructureTensorField::from_gradients(&gradients, self.kernel(), strategy)?;

        let mut response = Image::from_size_val(src.size(), 0.0f32)?;
        harris_response(&tensor, &mut response, self.config.k, strategy)?;

        let candidates = threshold_response(&response, self.config.threshold_ratio);
        log::debug!(
            "harris: max response {:?}, threshold {:?}, {} candidates",
            candidates.max_response,
            candidates.threshold,
            candidates.points.len()
        );

        let corners = non_max_suppression(
            &response,
            &candidates.points,
            self.config.nms_radius,
            strategy,
        );
        log::debug!(
            "harris: {} corners in {:?}",
            corners.len(),
            now.elapsed()
        );

        Ok(HarrisDetection {
            corners,
            smoothed,
            gradients,
            tensor,
            response,
            candidates,
            strategy,
        })
    }
}

impl CornerDetector for HarrisDetector {
    fn detect(&self, src: &Image<u8, 1>) -> Result<Vec<Corner>, HarrisError> {
        HarrisDetector::detect(self, src)
    }
}

/// Run the Harris pipeline once with the given configuration.
///
/// # Arguments
///
/// * `src` - The grayscale input image.
/// * `config` - The pipeline parameters, validated before any processing.
///
/// # Returns
///
/// The corners in scan order; an empty vector when the image has no corners.
pub fn harris_corners(src: &Image<u8, 1>, config: &HarrisConfig) -> Result<Vec<Corner>, HarrisError> {
    HarrisDetector::new(*config)?.detect(src)
}
