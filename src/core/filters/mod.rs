//! # Filters Module
//!
//! The fixed image transformation pipeline.
//!
//! ## Stage Order
//! grayscale -> gaussian blur -> sobel edges -> sharpen -> brightness
//!
//! ## Invariants
//! - Every stage is a pure function of its input buffer and parameters.
//!   No stage keeps state between calls, so the same pipeline value can be
//!   shared across threads and rebuilt per process without changing output.
//! - Stages that reduce to a single luminance plane (grayscale, sobel)
//!   replicate the result across all three channels, so downstream stages
//!   always receive an RGB buffer. Channel-count mismatches between
//!   execution strategies are ruled out by construction.
//! - Stages that can overflow 8 bits (sharpen, brightness) accumulate in a
//!   wider type and clamp to 0-255 as their final step.
//!
//! ## Example
//! ```rust,ignore
//! use image_pipeline_bench::core::filters::FilterPipeline;
//!
//! let pipeline = FilterPipeline::standard();
//! let processed = pipeline.apply(&image)?;
//! ```

mod blur;
mod brightness;
mod grayscale;
mod sharpen;
mod sobel;

pub use blur::GaussianBlur;
pub use brightness::Brightness;
pub use grayscale::Grayscale;
pub use sharpen::Sharpen;
pub use sobel::SobelEdges;

use crate::error::TaskError;
use image::RgbImage;

/// A single named, pure transformation over an RGB buffer.
///
/// Implementations must be stateless: output depends only on the input
/// buffer and the stage's own parameters.
pub trait FilterStage: Send + Sync {
    /// Stage name, used in shape errors and logs
    fn name(&self) -> &'static str;

    /// Apply the transformation, producing a new buffer
    fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError>;
}

/// Reject zero-dimension buffers before a stage touches pixel data.
pub(crate) fn ensure_nonempty(stage: &'static str, image: &RgbImage) -> Result<(), TaskError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(TaskError::InvalidShape {
            stage: stage.to_string(),
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Convolve one channel-interleaved RGB buffer with a 3x3 integer kernel.
///
/// Accumulates in i32, divides by `divisor`, clamps to 0-255. Borders are
/// handled by clamping sample coordinates to the image edge.
pub(crate) fn convolve3x3(image: &RgbImage, kernel: [[i32; 3]; 3], divisor: i32) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0i32; 3];
        for (ky, row) in kernel.iter().enumerate() {
            for (kx, &weight) in row.iter().enumerate() {
                let sx = (x as i64 + kx as i64 - 1).clamp(0, width as i64 - 1) as u32;
                let sy = (y as i64 + ky as i64 - 1).clamp(0, height as i64 - 1) as u32;
                let pixel = image.get_pixel(sx, sy);
                for c in 0..3 {
                    acc[c] += weight * pixel.0[c] as i32;
                }
            }
        }
        image::Rgb([
            (acc[0] / divisor).clamp(0, 255) as u8,
            (acc[1] / divisor).clamp(0, 255) as u8,
            (acc[2] / divisor).clamp(0, 255) as u8,
        ])
    })
}

/// An ordered, immutable composition of filter stages.
///
/// Constructed once per process (or per worker) and reused across tasks.
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    /// Build a pipeline from an explicit stage list
    pub fn new(stages: Vec<Box<dyn FilterStage>>) -> Self {
        Self { stages }
    }

    /// The canonical five-stage pipeline the benchmark measures
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Grayscale),
            Box::new(GaussianBlur),
            Box::new(SobelEdges),
            Box::new(Sharpen),
            Box::new(Brightness::default()),
        ])
    }

    /// Apply all stages in order
    pub fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError> {
        let mut current = image.clone();
        for stage in &self.stages {
            current = stage.apply(&current)?;
        }
        Ok(current)
    }

    /// Stage names in application order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::standard()
    }
}
