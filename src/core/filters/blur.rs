//! 3x3 Gaussian smoothing.

use super::{convolve3x3, ensure_nonempty, FilterStage};
use crate::error::TaskError;
use image::RgbImage;

/// Smooths the image with a 3x3 Gaussian kernel to reduce noise ahead of
/// edge extraction.
pub struct GaussianBlur;

// [1 2 1; 2 4 2; 1 2 1] / 16
const KERNEL: [[i32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];

impl FilterStage for GaussianBlur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError> {
        ensure_nonempty(self.name(), image)?;
        Ok(convolve3x3(image, KERNEL, 16))
    }
}
