use harris_image::Image;

/// Pixels of a response map that pass a threshold relative to the map maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseCandidates {
    /// Largest response in the map, `None` for an empty map.
    pub max_response: Option<f32>,
    /// `ratio * max_response`, or `None` when the map has no positive response.
    pub threshold: Option<f32>,
    /// Candidate pixels as `(x, y)` in row-major scan order.
    pub points: Vec<(usize, usize)>,
}

impl ResponseCandidates {
    /// Whether no pixel passed the threshold.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Largest value of a response map.
///
/// The scan always runs top-to-bottom, left-to-right on the current thread, so
/// the result is reproducible bit for bit. NaN values are skipped.
pub fn response_max(response: &Image<f32, 1>) -> Option<f32> {
    response
        .as_slice()
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            Some(max) if max >= v => Some(max),
            _ => Some(v),
        })
}

/// Select the pixels whose response exceeds `ratio * max(response)`.
///
/// The threshold is recomputed for every map, never an absolute constant. When
/// the maximum is not positive the candidate set is empty: a textureless image
/// simply has no corners.
///
/// # Arguments
///
/// * `response` - The corner response map.
/// * `ratio` - Fraction of the maximum response, expected in `(0, 1]`.
pub fn threshold_response(response: &Image<f32, 1>, ratio: f32) -> ResponseCandidates {
    let max_response = response_max(response);

    let threshold = match max_response {
        Some(max) if max > 0.0 => ratio * max,
        _ => {
            return ResponseCandidates {
                max_response,
                threshold: None,
                points: Vec::new(),
            }
        }
    };

    let cols = response.cols();
    let points = response
        .as_slice()
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > threshold)
        .map(|(idx, _)| (idx % cols, idx / cols))
        .collect();

    ResponseCandidates {
        max_response,
        threshold: Some(threshold),
        points,
    }
}
