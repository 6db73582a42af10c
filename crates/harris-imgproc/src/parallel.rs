use rayon::prelude::*;

use harris_image::Image;

/// Number of pixels from which [`ExecutionStrategy::Auto`] switches to parallel execution.
pub const AUTO_PARALLEL_MIN_PIXELS: usize = 100_000;

/// Controls how row-wise operations are executed.
///
/// Every strategy produces bit-identical results: work is split by rows and no
/// operation depends on the order in which rows are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    Serial,

    /// Process rows in parallel on the global Rayon thread pool.
    Parallel,

    /// Parallel for images with at least [`AUTO_PARALLEL_MIN_PIXELS`] pixels, serial otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Whether an operation over `num_pixels` pixels should run in parallel.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => num_pixels >= AUTO_PARALLEL_MIN_PIXELS,
        }
    }
}

/// Apply a function to each pixel of two single-channel sources, writing into `dst`.
///
/// PRECONDITION: all images have the same size.
pub fn par_iter_rows_val_two<T1, T2, T3>(
    src1: &Image<T1, 1>,
    src2: &Image<T2, 1>,
    dst: &mut Image<T3, 1>,
    strategy: ExecutionStrategy,
    f: impl Fn(&T1, &T2, &mut T3) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
    T3: Send + Sync,
{
    let cols = src1.cols().max(1);
    let row_op = |((src1_chunk, src2_chunk), dst_chunk): ((&[T1], &[T2]), &mut [T3])| {
        src1_chunk
            .iter()
            .zip(src2_chunk.iter())
            .zip(dst_chunk.iter_mut())
            .for_each(|((a, b), out)| f(a, b, out));
    };

    if strategy.is_parallel(src1.size().area()) {
        src1.as_slice()
            .par_chunks_exact(cols)
            .zip(src2.as_slice().par_chunks_exact(cols))
            .zip(dst.as_slice_mut().par_chunks_exact_mut(cols))
            .for_each(row_op);
    } else {
        src1.as_slice()
            .chunks_exact(cols)
            .zip(src2.as_slice().chunks_exact(cols))
            .zip(dst.as_slice_mut().chunks_exact_mut(cols))
            .for_each(row_op);
    }
}

/// Apply a function to each pixel of three single-channel sources, writing into `dst`.
///
/// PRECONDITION: all images have the same size.
pub fn par_iter_rows_val_three<T1, T2, T3, T4>(
    src1: &Image<T1, 1>,
    src2: &Image<T2, 1>,
    src3: &Image<T3, 1>,
    dst: &mut Image<T4, 1>,
    strategy: ExecutionStrategy,
    f: impl Fn(&T1, &T2, &T3, &mut T4) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
    T3: Send + Sync,
    T4: Send + Sync,
{
    let cols = src1.cols().max(1);
    let row_op =
        |(((c1, c2), c3), out): (((&[T1], &[T2]), &[T3]), &mut [T4])| {
            c1.iter()
                .zip(c2.iter())
                .zip(c3.iter())
                .zip(out.iter_mut())
                .for_each(|(((a, b), c), o)| f(a, b, c, o));
        };

    if strategy.is_parallel(src1.size().area()) {
        src1.as_slice()
            .par_chunks_exact(cols)
            .zip(src2.as_slice().par_chunks_exact(cols))
            .zip(src3.as_slice().par_chunks_exact(cols))
            .zip(dst.as_slice_mut().par_chunks_exact_mut(cols))
            .for_each(row_op);
    } else {
        src1.as_slice()
            .chunks_exact(cols)
            .zip(src2.as_slice().chunks_exact(cols))
            .zip(src3.as_slice().chunks_exact(cols))
            .zip(dst.as_slice_mut().chunks_exact_mut(cols))
            .for_each(row_op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_image::ImageError;

    #[test]
    fn test_is_parallel() {
        assert!(!ExecutionStrategy::Serial.is_parallel(usize::MAX));
        assert!(ExecutionStrategy::Parallel.is_parallel(1));
        assert!(!ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_MIN_PIXELS - 1));
        assert!(ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_MIN_PIXELS));
    }

    #[test]
    fn test_par_iter_rows_val_two() -> Result<(), ImageError> {
        let a = Image::<f32, 1>::new([3, 2].into(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let b = Image::<f32, 1>::from_size_val(a.size(), 2.0)?;

        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Parallel] {
            let mut dst = Image::<f32, 1>::from_size_val(a.size(), 0.0)?;
            par_iter_rows_val_two(&a, &b, &mut dst, strategy, |x, y, out| *out = x * y);
            assert_eq!(dst.as_slice(), &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        }
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_val_three() -> Result<(), ImageError> {
        let a = Image::<f32, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0])?;
        let b = Image::<f32, 1>::from_size_val(a.size(), 1.0)?;
        let c = Image::<f32, 1>::from_size_val(a.size(), 10.0)?;

        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Parallel] {
            let mut dst = Image::<f32, 1>::from_size_val(a.size(), 0.0)?;
            par_iter_rows_val_three(&a, &b, &c, &mut dst, strategy, |x, y, z, out| {
                *out = x + y + z
            });
            assert_eq!(dst.as_slice(), &[12.0, 13.0, 14.0, 15.0]);
        }
        Ok(())
    }
}
