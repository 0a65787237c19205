//! Brightness adjustment.

use super::{ensure_nonempty, FilterStage};
use crate::error::TaskError;
use image::{Rgb, RgbImage};

/// Adds a constant delta to every channel, clamping to 0-255 last.
pub struct Brightness {
    delta: i32,
}

impl Brightness {
    pub fn new(delta: i32) -> Self {
        Self { delta }
    }
}

impl Default for Brightness {
    /// The delta the benchmarked pipeline uses
    fn default() -> Self {
        Self { delta: 30 }
    }
}

impl FilterStage for Brightness {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError> {
        ensure_nonempty(self.name(), image)?;

        let output = RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let Rgb([r, g, b]) = *image.get_pixel(x, y);
            Rgb([
                (r as i32 + self.delta).clamp(0, 255) as u8,
                (g as i32 + self.delta).clamp(0, 255) as u8,
                (b as i32 + self.delta).clamp(0, 255) as u8,
            ])
        });

        Ok(output)
    }
}
