#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use harris_image as image;

#[doc(inline)]
pub use harris_imgproc as imgproc;
