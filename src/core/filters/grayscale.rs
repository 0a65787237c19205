//! Grayscale conversion using the BT.601 luminance weights.

use super::{ensure_nonempty, FilterStage};
use crate::error::TaskError;
use image::{Rgb, RgbImage};

/// Converts to grayscale, replicating the luminance across all three
/// channels so downstream stages keep seeing an RGB buffer.
pub struct Grayscale;

impl FilterStage for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError> {
        ensure_nonempty(self.name(), image)?;

        let output = RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let Rgb([r, g, b]) = *image.get_pixel(x, y);
            let luma =
                (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
            Rgb([luma, luma, luma])
        });

        Ok(output)
    }
}
