//! Min-max normalization of images.
//!
//! Used to turn unbounded floating point grids (gradients, corner responses)
//! into displayable 8-bit images, the way OpenCV's `NORM_MINMAX` does.

use rayon::prelude::*;

use harris_image::{Image, ImageError};

use crate::parallel::ExecutionStrategy;

/// Find the minimum and maximum values in an image.
///
/// The scan runs in row-major order on the current thread, so the result is
/// deterministic. NaN values are ignored.
///
/// # Returns
///
/// `None` if the image has no (non NaN) pixels.
///
/// # Example
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::normalize::find_min_max;
///
/// let image = Image::<f32, 1>::new([2, 2].into(), vec![3.0, -1.0, 0.5, 2.0]).unwrap();
/// assert_eq!(find_min_max(&image), Some((-1.0, 3.0)));
/// ```
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Option<(T, T)>
where
    T: Copy + PartialOrd,
{
    let mut values = image
        .as_slice()
        .iter()
        .filter(|x| x.partial_cmp(x).is_some());
    let first = *values.next()?;

    Some(values.fold((first, first), |(min, max), &x| {
        (
            if x < min { x } else { min },
            if x > max { x } else { max },
        )
    }))
}

/// Rescale a floating point image linearly onto the full 8-bit range.
///
/// The minimum maps to 0 and the maximum to 255, rounding to nearest. A constant
/// image maps to 0. The min/max scan is always serial; `strategy` only
/// controls the per-pixel rescale.
///
/// # Example
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::normalize::normalize_min_max_u8;
/// use harris_imgproc::parallel::ExecutionStrategy;
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![-2.0, 0.0, 2.0]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// normalize_min_max_u8(&src, &mut dst, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(dst.as_slice(), &[0, 128, 255]);
/// ```
pub fn normalize_min_max_u8<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<u8, C>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let Some((min_val, max_val)) = find_min_max(src) else {
        return Ok(());
    };

    let range = max_val - min_val;
    let scale = if range > f32::EPSILON {
        255.0 / range
    } else {
        0.0
    };

    let rescale = |(dst_val, &src_val): (&mut u8, &f32)| {
        *dst_val = ((src_val - min_val) * scale).round().clamp(0.0, 255.0) as u8;
    };

    if strategy.is_parallel(src.size().area()) {
        dst.as_slice_mut()
            .par_iter_mut()
            .zip(src.as_slice().par_iter())
            .for_each(rescale);
    } else {
        dst.as_slice_mut()
            .iter_mut()
            .zip(src.as_slice().iter())
            .for_each(rescale);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_min_max() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([2, 2].into(), vec![0, 1, 0, 1, 2, 3, 0, 1, 0, 1, 2, 3])?;
        assert_eq!(find_min_max(&image), Some((0, 3)));

        let empty = Image::<f32, 1>::new([0, 0].into(), vec![])?;
        assert_eq!(find_min_max(&empty), None);

        let with_nan = Image::<f32, 1>::new([3, 1].into(), vec![f32::NAN, 2.0, -1.0])?;
        assert_eq!(find_min_max(&with_nan), Some((-1.0, 2.0)));
        Ok(())
    }

    #[test]
    fn test_normalize_min_max_u8() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f32, 1>::new(
            [3, 2].into(),
            vec![
                0.0, 510.0, 1020.0,
                766.0, 258.0, 636.0,
            ],
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 7)?;
        normalize_min_max_u8(&image, &mut dst, ExecutionStrategy::Serial)?;
        assert_eq!(dst.as_slice(), &[0, 128, 255, 192, 65, 159]);
        Ok(())
    }

    #[test]
    fn test_normalize_min_max_u8_strategies() -> Result<(), ImageError> {
        let data = (0..40 * 30).map(|i| ((i * 31) % 97) as f32 - 20.0).collect();
        let image = Image::<f32, 1>::new([40, 30].into(), data)?;

        let mut serial = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        let mut parallel = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        normalize_min_max_u8(&image, &mut serial, ExecutionStrategy::Serial)?;
        normalize_min_max_u8(&image, &mut parallel, ExecutionStrategy::Parallel)?;
        assert_eq!(serial, parallel);
        assert_eq!(serial.as_slice().iter().copied().min(), Some(0));
        assert_eq!(serial.as_slice().iter().copied().max(), Some(255));
        Ok(())
    }

    #[test]
    fn test_normalize_min_max_u8_constant() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val([3, 3].into(), 12.5)?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 7)?;
        normalize_min_max_u8(&image, &mut dst, ExecutionStrategy::Serial)?;
        assert!(dst.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn test_normalize_min_max_u8_size_mismatch() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val([3, 3].into(), 1.0)?;
        let mut dst = Image::<u8, 1>::from_size_val([2, 3].into(), 0)?;
        assert_eq!(
            normalize_min_max_u8(&image, &mut dst, ExecutionStrategy::Serial),
            Err(ImageError::InvalidImageSize(3, 3, 2, 3))
        );
        Ok(())
    }
}
