use std::time::Instant;

use rayon::prelude::*;

use harris_image::Image;

use super::harris::check_input;
use super::smoother::validate_sigma;
use super::{
    harris_response, is_local_max, min_eigen_response, response_max, Corner, CornerDetector,
    GaussianSmoother, GradientField, HarrisError, StructureTensorField, DEFAULT_HARRIS_K,
};
use crate::filter::kernels;
use crate::parallel::ExecutionStrategy;

/// Parameters of the good-features-to-track (Shi-Tomasi) corner selection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GoodFeaturesConfig {
    /// Standard deviation of the gaussian pre-smoothing, in pixels.
    pub sigma: f32,
    /// Maximum number of corners returned, `0` for no limit.
    pub max_corners: usize,
    /// Minimal accepted score as a fraction of the best score, in `(0, 1]`.
    pub quality_level: f32,
    /// Minimal euclidean distance between returned corners.
    pub min_distance: f32,
    /// Side of the box window summing the gradient products, odd.
    pub block_size: usize,
    /// Score with the Harris response instead of the smallest eigenvalue.
    pub use_harris: bool,
    /// Harris constant, used when `use_harris` is set.
    pub k: f32,
    /// Execution strategy of every stage.
    pub strategy: ExecutionStrategy,
}

impl Default for GoodFeaturesConfig {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            max_corners: 1000,
            quality_level: 0.01,
            min_distance: 10.0,
            block_size: 3,
            use_harris: false,
            k: DEFAULT_HARRIS_K,
            strategy: ExecutionStrategy::Auto,
        }
    }
}

impl GoodFeaturesConfig {
    /// Set the maximum number of corners.
    pub fn with_max_corners(mut self, max_corners: usize) -> Self {
        self.max_corners = max_corners;
        self
    }

    /// Set the quality level.
    pub fn with_quality_level(mut self, quality_level: f32) -> Self {
        self.quality_level = quality_level;
        self
    }

    /// Set the minimal distance between corners.
    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Score with the Harris response and constant `k`.
    pub fn with_harris(mut self, k: f32) -> Self {
        self.use_harris = true;
        self.k = k;
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

        if !(self.quality_level > 0.0 && self.quality_level <= 1.0) {
            return Err(HarrisError::invalid_parameter(
                "quality_level",
                format!("must be in (0, 1], got {}", self.quality_level),
            ));
        }

        if !(self.min_distance.is_finite() && self.min_distance >= 0.0) {
            return Err(HarrisError::invalid_parameter(
                "min_distance",
                format!("must be finite and non negative, got {}", self.min_distance),
            ));
        }

        if self.block_size % 2 == 0 {
            return Err(HarrisError::invalid_parameter(
                "block_size",
                format!("must be odd, got {}", self.block_size),
            ));
        }

        if !self.k.is_finite() {
            return Err(HarrisError::invalid_parameter(
                "k",
                format!("must be finite, got {}", self.k),
            ));
        }

        Ok(())
    }
}

/// Good-features-to-track corner selection.
///
/// Scores every pixel with the smallest eigenvalue of a box windowed structure
/// tensor (or the Harris response), keeps the 3x3 local maxima above
/// `quality_level * max`, then greedily accepts the strongest ones that keep
/// `min_distance` from every corner accepted before.
///
/// Unlike [`super::HarrisDetector`], the corners are returned strongest first.
/// The 1 pixel image border never holds a corner.
#[derive(Clone, Debug)]
pub struct GoodFeaturesDetector {
    config: GoodFeaturesConfig,
    smoother: GaussianSmoother,
    window: Vec<f32>,
}

impl GoodFeaturesDetector {
    /// Validate the configuration and prepare the smoothing and window kernels.
    pub fn new(config: GoodFeaturesConfig) -> Result<Self, HarrisError> {
        config.validate()?;
        let smoother = GaussianSmoother::new(config.sigma)?;
        let window = kernels::box_blur_kernel_1d(config.block_size);
        Ok(Self {
            config,
            smoother,
            window,
        })
    }

    /// The detector configuration.
    pub fn config(&self) -> &GoodFeaturesConfig {
        &self.config
    }

    /// Compute the per-pixel corner score.
    pub fn score(&self, src: &Image<u8, 1>) -> Result<Image<f32, 1>, HarrisError> {
        check_input(src)?;
        let strategy = self.config.strategy;

        let smoothed = self.smoother.smooth_u8(src, strategy)?;
        let gradients = GradientField::from_image(&smoothed, strategy)?;
        let tensor = StructureTensorField::from_gradients(&gradients, &self.window, strategy)?;

        let mut score = Image::from_size_val(src.size(), 0.0f32)?;
        if self.config.use_harris {
            harris_response(&tensor, &mut score, self.config.k, strategy)?;
        } else {
            min_eigen_response(&tensor, &mut score, strategy)?;
        }
        Ok(score)
    }

    /// Detect corners, strongest first.
    pub fn detect(&self, src: &Image<u8, 1>) -> Result<Vec<Corner>, HarrisError> {
        let now = Instant::now();
        let score = self.score(src)?;

        let threshold = match response_max(&score) {
            Some(max) if max > 0.0 => self.config.quality_level * max,
            _ => return Ok(Vec::new()),
        };

        let mut candidates = local_maxima(&score, threshold, self.config.strategy);
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        let num_candidates = candidates.len();

        let corners = enforce_min_distance(
            candidates,
            self.config.min_distance,
            self.config.max_corners,
        );
        log::debug!(
            "good features: threshold {}, {} candidates, {} corners in {:?}",
            threshold,
            num_candidates,
            corners.len(),
            now.elapsed()
        );

        Ok(corners)
    }
}

impl CornerDetector for GoodFeaturesDetector {
    fn detect(&self, src: &Image<u8, 1>) -> Result<Vec<Corner>, HarrisError> {
        GoodFeaturesDetector::detect(self, src)
    }
}

/// Interior 3x3 local maxima strictly above `threshold`, in scan order.
fn local_maxima(score: &Image<f32, 1>, threshold: f32, strategy: ExecutionStrategy) -> Vec<Corner> {
    let (cols, rows) = (score.cols(), score.rows());
    if cols < 3 || rows < 3 {
        return Vec::new();
    }

    let row_maxima = |y: usize| {
        let row = &score.as_slice()[y * cols..(y + 1) * cols];
        (1..cols - 1)
            .filter(|&x| row[x] > threshold && is_local_max(score, x, y, 1))
            .map(|x| Corner::new(x, y, row[x]))
            .collect::<Vec<_>>()
    };

    if strategy.is_parallel(score.size().area()) {
        (1..rows - 1).into_par_iter().flat_map_iter(row_maxima).collect()
    } else {
        (1..rows - 1).flat_map(row_maxima).collect()
    }
}

/// Greedily keep corners, in the given order, that lie at least `min_distance`
/// away from every corner already kept.
fn enforce_min_distance(candidates: Vec<Corner>, min_distance: f32, max_corners: usize) -> Vec<Corner> {
    let limit = if max_corners == 0 {
        usize::MAX
    } else {
        max_corners
    };
    let min_dist_sq = min_distance * min_distance;

    let mut accepted: Vec<Corner> = Vec::new();
    for corner in candidates {
        if accepted.len() >= limit {
            break;
        }
        let far_enough = accepted.iter().all(|other| {
            let dx = corner.x as f32 - other.x as f32;
            let dy = corner.y as f32 - other.y as f32;
            dx * dx + dy * dy >= min_dist_sq
        });
        if far_enough {
            accepted.push(corner);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validate() {
        assert!(GoodFeaturesConfig::default().validate().is_ok());

        let invalid = [
            ("quality_level", GoodFeaturesConfig::default().with_quality_level(0.0)),
            ("quality_level", GoodFeaturesConfig::default().with_quality_level(2.0)),
            ("min_distance", GoodFeaturesConfig::default().with_min_distance(-1.0)),
            ("min_distance", GoodFeaturesConfig::default().with_min_distance(f32::NAN)),
            ("block_size", GoodFeaturesConfig::default().with_block_size(0)),
            ("block_size", GoodFeaturesConfig::default().with_block_size(4)),
            ("k", GoodFeaturesConfig::default().with_harris(f32::NAN)),
        ];
        for (expected, config) in invalid {
            match config.validate() {
                Err(HarrisError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("{config:?}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_enforce_min_distance() {
        let candidates = vec![
            Corner::new(10, 10, 9.0),
            Corner::new(13, 14, 8.0),
            Corner::new(30, 10, 7.0),
            Corner::new(10, 30, 6.0),
        ];

        // (13, 14) lies exactly 5 away from (10, 10)
        let kept = enforce_min_distance(candidates.clone(), 5.0, 0);
        assert_eq!(kept.len(), 4);

        let kept = enforce_min_distance(candidates.clone(), 5.5, 0);
        assert_eq!(
            kept,
            vec![
                Corner::new(10, 10, 9.0),
                Corner::new(30, 10, 7.0),
                Corner::new(10, 30, 6.0)
            ]
        );

        let kept = enforce_min_distance(candidates, 5.5, 2);
        assert_eq!(
            kept,
            vec![Corner::new(10, 10, 9.0), Corner::new(30, 10, 7.0)]
        );
    }

    #[test]
    fn test_local_maxima_skips_border() -> Result<(), HarrisError> {
        #[rustfmt::skip]
        let score = Image::<f32, 1>::new(
            [5, 4].into(),
            vec![
                9.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 4.0, 0.0,
                0.0, 2.0, 0.0, 0.0, 0.0,
            ],
        )?;
        let maxima = local_maxima(&score, 0.5, ExecutionStrategy::Serial);
        assert_eq!(maxima, vec![Corner::new(3, 2, 4.0)]);
        Ok(())
    }

    #[test]
    fn test_detect_uniform_image() -> Result<(), HarrisError> {
        let image = Image::<u8, 1>::from_size_val([32, 32].into(), 77)?;
        let detector = GoodFeaturesDetector::new(GoodFeaturesConfig::default())?;
        assert!(detector.detect(&image)?.is_empty());
        Ok(())
    }
}
