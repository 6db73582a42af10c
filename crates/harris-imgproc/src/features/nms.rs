use rayon::prelude::*;

use harris_image::Image;

use super::Corner;
use crate::parallel::ExecutionStrategy;

/// Whether `(x, y)` holds the largest value within the square window of
/// half-width `radius` around it, clipped to the image bounds.
///
/// Pixels tying with the window maximum count as maxima. A position outside
/// the map, including any position of an empty map, is never a maximum.
pub fn is_local_max(response: &Image<f32, 1>, x: usize, y: usize, radius: usize) -> bool {
    let (cols, rows) = (response.cols(), response.rows());
    if x >= cols || y >= rows {
        return false;
    }
    let data = response.as_slice();
    let value = data[y * cols + x];

    let x_end = x.saturating_add(radius).min(cols - 1);
    let y_end = y.saturating_add(radius).min(rows - 1);

    (y.saturating_sub(radius)..=y_end).all(|wy| {
        let row = &data[wy * cols..(wy + 1) * cols];
        row[x.saturating_sub(radius)..=x_end]
            .iter()
            .all(|&v| v <= value)
    })
}

/// Keep the candidates that are local maxima of the response map.
///
/// Each candidate is compared against the maximum of the window
/// `[y - radius, y + radius] x [x - radius, x + radius]`, clipped at the image
/// edges. Candidates equal to that maximum are retained, so a plateau of equal
/// values yields several adjacent corners.
///
/// # Arguments
///
/// * `response` - The corner response map.
/// * `candidates` - Candidate pixels as `(x, y)`; those outside the map are dropped.
/// * `radius` - Window half-width; `0` keeps every candidate.
/// * `strategy` - Execution strategy for the candidate scan.
///
/// # Returns
///
/// The retained corners, in the order of `candidates`.
pub fn non_max_suppression(
    response: &Image<f32, 1>,
    candidates: &[(usize, usize)],
    radius: usize,
    strategy: ExecutionStrategy,
) -> Vec<Corner> {
    let cols = response.cols();
    let to_corner = |&(x, y): &(usize, usize)| {
        is_local_max(response, x, y, radius)
            .then(|| Corner::new(x, y, response.as_slice()[y * cols + x]))
    };

    if strategy.is_parallel(response.size().area()) {
        candidates.par_iter().filter_map(to_corner).collect()
    } else {
        candidates.iter().filter_map(to_corner).collect()
    }
}
