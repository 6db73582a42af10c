/// Border handling modes for filter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderType {
    /// Treat all out-of-bounds pixels as zero.
    /// Corresponds to OpenCV's `BORDER_CONSTANT` with a zero value.
    Constant,

    /// Replicate the value of the nearest border pixel.
    /// Corresponds to OpenCV's `BORDER_REPLICATE`.
    Replicate,

    /// Reflect the image across the border, excluding the border pixel.
    /// Corresponds to OpenCV's `BORDER_REFLECT_101`.
    #[default]
    Reflect101,
}

fn reflect101_index(idx: isize, len: isize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let idx = idx.rem_euclid(period);
    if idx >= len {
        (period - idx) as usize
    } else {
        idx as usize
    }
}

impl BorderType {
    /// Map a possibly out-of-range index onto `[0, len)`.
    ///
    /// Returns `None` when the tap falls outside the image and contributes zero
    /// ([`BorderType::Constant`]).
    ///
    /// PRECONDITION: `len > 0`.
    pub fn map_index(&self, idx: isize, len: usize) -> Option<usize> {
        let len = len as isize;
        if (0..len).contains(&idx) {
            return Some(idx as usize);
        }
        match self {
            BorderType::Constant => None,
            BorderType::Replicate => Some(idx.clamp(0, len - 1) as usize),
            BorderType::Reflect101 => Some(reflect101_index(idx, len)),
        }
    }
}
