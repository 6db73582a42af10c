use harris_image::{Image, ImageError};
use rayon::prelude::*;

use super::BorderType;
use crate::parallel::ExecutionStrategy;

/// A separable 2D filter that applies horizontal and vertical 1D convolutions sequentially.
///
/// The source index of every tap is resolved once per axis against the border
/// mode, so the inner loops never read outside the image.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    border: BorderType,
}

/// Resolve the source index of every tap of a centered kernel for every position on an axis.
///
/// The table is laid out as `len` consecutive groups of `kernel_len` entries.
fn tap_table(len: usize, kernel_len: usize, border: BorderType) -> Vec<Option<usize>> {
    let half = (kernel_len / 2) as isize;
    (0..len)
        .flat_map(|pos| {
            (0..kernel_len).map(move |k| border.map_index(pos as isize + k as isize - half, len))
        })
        .collect()
}

impl SeparableFilter<'_> {
    fn apply<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        strategy: ExecutionStrategy,
    ) {
        let rows = src.rows();
        let cols = src.cols();
        if rows == 0 || cols == 0 {
            return;
        }

        let taps_x = tap_table(cols, self.kernel_x.len(), self.border);
        let taps_y = tap_table(rows, self.kernel_y.len(), self.border);

        let src_data = src.as_slice();
        let mut temp = vec![0.0f32; src_data.len()];
        let row_stride = cols * C;

        let horizontal = |(r, row_temp): (usize, &mut [f32])| {
            let src_row = &src_data[r * row_stride..(r + 1) * row_stride];
            for (c, out) in row_temp.chunks_exact_mut(C).enumerate() {
                let taps = &taps_x[c * self.kernel_x.len()..(c + 1) * self.kernel_x.len()];
                let mut acc = [0.0f32; C];
                for (&k, tap) in self.kernel_x.iter().zip(taps.iter()) {
                    if let Some(x) = tap {
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            *acc_val += src_row[x * C + ch] * k;
                        }
                    }
                }
                out.copy_from_slice(&acc);
            }
        };

        if strategy.is_parallel(rows * cols) {
            temp.par_chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(horizontal);
        } else {
            temp.chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(horizontal);
        }

        let temp = &temp;
        let vertical = |(r, row_dst): (usize, &mut [f32])| {
            let taps = &taps_y[r * self.kernel_y.len()..(r + 1) * self.kernel_y.len()];
            for (c, out) in row_dst.chunks_exact_mut(C).enumerate() {
                let mut acc = [0.0f32; C];
                for (&k, tap) in self.kernel_y.iter().zip(taps.iter()) {
                    if let Some(y) = tap {
                        let idx = y * row_stride + c * C;
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            *acc_val += temp[idx + ch] * k;
                        }
                    }
                }
                out.copy_from_slice(&acc);
            }
        };

        let dst_data = dst.as_slice_mut();
        if strategy.is_parallel(rows * cols) {
            dst_data
                .par_chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(vertical);
        } else {
            dst_data
                .chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(vertical);
        }
    }
}

/// Apply a separable filter with border and execution strategy control.
///
/// The kernels are applied as a correlation centered on each pixel: first
/// `kernel_x` along every row, then `kernel_y` along every column. Kernels are
/// used as given, without normalization.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, odd length.
/// * `kernel_y` - The vertical kernel, odd length.
/// * `border` - How taps falling outside the image are resolved.
/// * `strategy` - Execution strategy: `Serial`, `Parallel`, or `Auto`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidKernelLength`] if a kernel is empty or has an even
/// length, and [`ImageError::InvalidImageSize`] if `src` and `dst` differ in size.
pub fn separable_filter_with_strategy<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    border: BorderType,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if kernel_x.len() % 2 == 0 || kernel_y.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelLength(
            kernel_x.len(),
            kernel_y.len(),
        ));
    }

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let filter = SeparableFilter {
        kernel_x,
        kernel_y,
        border,
    };
    filter.apply(src, dst, strategy);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_image::ImageSize;

    fn reflect_serial(
        src: &Image<f32, 1>,
        dst: &mut Image<f32, 1>,
        kernel_x: &[f32],
        kernel_y: &[f32],
    ) -> Result<(), ImageError> {
        separable_filter_with_strategy(
            src,
            dst,
            kernel_x,
            kernel_y,
            BorderType::Reflect101,
            ExecutionStrategy::Serial,
        )
    }

    #[test]
    fn test_separable_filter_impulse() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };

        #[rustfmt::skip]
        let img = Image::<f32, 1>::new(
            size,
            vec![
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ],
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let kernel_x = vec![1.0, 1.0, 1.0];
        let kernel_y = vec![1.0, 1.0, 1.0];
        reflect_serial(&img, &mut dst, &kernel_x, &kernel_y)?;

        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ]
        );

        let xsum = dst.as_slice().iter().sum::<f32>();
        assert_eq!(xsum, 9.0);

        Ok(())
    }

    #[test]
    fn test_separable_filter_borders() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::new([4, 1].into(), vec![1.0, 2.0, 3.0, 4.0])?;
        let kernel_x = vec![1.0, 1.0, 1.0];
        let kernel_y = vec![1.0];

        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        for (border, expected) in [
            // 2|1 2 3 4|3
            (BorderType::Reflect101, [5.0, 6.0, 9.0, 10.0]),
            // 1|1 2 3 4|4
            (BorderType::Replicate, [4.0, 6.0, 9.0, 11.0]),
            // 0|1 2 3 4|0
            (BorderType::Constant, [3.0, 6.0, 9.0, 7.0]),
        ] {
            separable_filter_with_strategy(
                &img,
                &mut dst,
                &kernel_x,
                &kernel_y,
                border,
                ExecutionStrategy::Serial,
            )?;
            assert_eq!(dst.as_slice(), &expected);
        }
        Ok(())
    }

    #[test]
    fn test_separable_filter_uniform_reflect() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::from_size_val([6, 4].into(), 7.0)?;
        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let deriv = vec![-1.0, 0.0, 1.0];
        let smooth = vec![1.0, 2.0, 1.0];
        reflect_serial(&img, &mut dst, &deriv, &smooth)?;
        assert!(dst.as_slice().iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn test_separable_filter_multichannel() -> Result<(), ImageError> {
        let img = Image::<f32, 2>::new([3, 1].into(), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0])?;
        let mut dst = Image::<f32, 2>::from_size_val(img.size(), 0.0)?;
        separable_filter_with_strategy(
            &img,
            &mut dst,
            &[1.0, 0.0, 0.0],
            &[1.0],
            BorderType::Constant,
            ExecutionStrategy::Serial,
        )?;
        // shifts each channel one pixel to the right
        assert_eq!(dst.as_slice(), &[0.0, 0.0, 1.0, 10.0, 2.0, 20.0]);
        Ok(())
    }

    #[test]
    fn test_separable_filter_invalid() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        assert_eq!(
            reflect_serial(&img, &mut dst, &[1.0, 1.0], &[1.0]),
            Err(ImageError::InvalidKernelLength(2, 1))
        );
        assert_eq!(
            reflect_serial(&img, &mut dst, &[], &[1.0]),
            Err(ImageError::InvalidKernelLength(0, 1))
        );

        let mut other = Image::<f32, 1>::from_size_val([4, 3].into(), 0.0)?;
        assert_eq!(
            reflect_serial(&img, &mut other, &[1.0], &[1.0]),
            Err(ImageError::InvalidImageSize(3, 3, 4, 3))
        );
        Ok(())
    }

    #[test]
    fn test_separable_filter_with_strategy() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 17,
            height: 13,
        };
        let data = (0..size.area()).map(|i| ((i * 37) % 101) as f32).collect();
        let img = Image::<f32, 1>::new(size, data)?;
        let kernel = crate::filter::kernels::gaussian_kernel_1d(7, 1.0);

        let mut dst_serial = Image::<f32, 1>::from_size_val(size, 0.0)?;
        separable_filter_with_strategy(
            &img,
            &mut dst_serial,
            &kernel,
            &kernel,
            BorderType::Reflect101,
            ExecutionStrategy::Serial,
        )?;

        let mut dst_parallel = Image::<f32, 1>::from_size_val(size, 0.0)?;
        separable_filter_with_strategy(
            &img,
            &mut dst_parallel,
            &kernel,
            &kernel,
            BorderType::Reflect101,
            ExecutionStrategy::Parallel,
        )?;

        assert_eq!(dst_serial.as_slice(), dst_parallel.as_slice());
        Ok(())
    }
}
