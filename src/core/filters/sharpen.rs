//! Sharpening via a 3x3 convolution kernel.

use super::{convolve3x3, ensure_nonempty, FilterStage};
use crate::error::TaskError;
use image::RgbImage;

/// Enhances edges and fine detail after smoothing.
///
/// Accumulates in i32 and clamps to 0-255 as the final step, since the
/// kernel can push values outside the display range.
pub struct Sharpen;

// [0 -1 0; -1 5 -1; 0 -1 0]
const KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

impl FilterStage for Sharpen {
    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError> {
        ensure_nonempty(self.name(), image)?;
        Ok(convolve3x3(image, KERNEL, 1))
    }
}
