/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A normalized kernel whose taps sum to one.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Size of the gaussian kernel used for a given sigma: `2 * ceil(3 * sigma) + 1`.
///
/// The result is always odd so the kernel has a well defined center tap.
pub fn gaussian_kernel_size(sigma: f32) -> usize {
    2 * (3.0 * sigma).ceil() as usize + 1
}

/// Create a gaussian blur kernel.
///
/// The taps are evaluated and normalized in `f64` before the cast, so a tiny
/// sigma degenerates to the identity kernel instead of NaN.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A normalized kernel whose taps sum to one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mean = (kernel_size as f64 - 1.0) / 2.0;
    let sigma = sigma as f64;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    let kernel = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - mean;
            (-(x * x) / (2.0 * sigma_sq)).exp()
        })
        .collect::<Vec<_>>();

    // normalize the kernel
    let norm = kernel.iter().sum::<f64>();
    kernel.iter().map(|k| (k / norm) as f32).collect()
}

/// Create the separable 3x3 sobel kernels.
///
/// # Returns
///
/// A tuple `(derivative, smoothing)`. The x-gradient applies `derivative` along
/// rows and `smoothing` along columns; the y-gradient swaps them.
pub fn sobel_kernel_1d() -> ([f32; 3], [f32; 3]) {
    ([-1.0, 0.0, 1.0], [1.0, 2.0, 1.0])
}
