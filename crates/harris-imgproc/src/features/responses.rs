use harris_image::{Image, ImageError};

use super::StructureTensorField;
use crate::parallel::{par_iter_rows_val_three, ExecutionStrategy};

/// Default Harris sensitivity constant.
pub const DEFAULT_HARRIS_K: f32 = 0.04;

fn check_size(tensor: &StructureTensorField, dst: &Image<f32, 1>) -> Result<(), ImageError> {
    if tensor.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            tensor.size().width,
            tensor.size().height,
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Compute the Harris corner response from a structure tensor.
///
/// For every pixel with tensor `M = [[sxx, sxy], [sxy, syy]]`:
///
/// ```text
/// R = det(M) - k * trace(M)²
/// ```
///
/// Corners give large positive values, edges negative values and flat regions
/// values close to zero.
///
/// # Arguments
///
/// * `tensor` - The structure tensor field.
/// * `dst` - The response map with the size of the tensor field.
/// * `k` - The Harris sensitivity constant, conventionally in `[0.04, 0.06]`.
/// * `strategy` - Execution strategy.
pub fn harris_response(
    tensor: &StructureTensorField,
    dst: &mut Image<f32, 1>,
    k: f32,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    check_size(tensor, dst)?;

    par_iter_rows_val_three(
        &tensor.sxx,
        &tensor.syy,
        &tensor.sxy,
        dst,
        strategy,
        |&sxx, &syy, &sxy, out| {
            let det = sxx * syy - sxy * sxy;
            let trace = sxx + syy;
            *out = det - k * trace * trace;
        },
    );

    Ok(())
}

/// Compute the Shi-Tomasi response: the smallest eigenvalue of the structure tensor.
///
/// ```text
/// λmin = (sxx + syy) / 2 - sqrt(((sxx - syy) / 2)² + sxy²)
/// ```
pub fn min_eigen_response(
    tensor: &StructureTensorField,
    dst: &mut Image<f32, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    check_size(tensor, dst)?;

    par_iter_rows_val_three(
        &tensor.sxx,
        &tensor.syy,
        &tensor.sxy,
        dst,
        strategy,
        |&sxx, &syy, &sxy, out| {
            let half_trace = (sxx + syy) * 0.5;
            let half_diff = (sxx - syy) * 0.5;
            *out = half_trace - (half_diff * half_diff + sxy * sxy).sqrt();
        },
    );

    Ok(())
}
