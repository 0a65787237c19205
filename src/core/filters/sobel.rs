//! Sobel edge extraction with min-max normalization.

use super::{ensure_nonempty, FilterStage};
use crate::error::TaskError;
use image::{Rgb, RgbImage};

/// Extracts edges via 3x3 Sobel gradients.
///
/// The gradient magnitude is min-max normalized to the 0-255 range and
/// replicated back across all three channels. A flat image (zero gradient
/// everywhere) normalizes to all zeros.
pub struct SobelEdges;

const GX: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const GY: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

impl FilterStage for SobelEdges {
    fn name(&self) -> &'static str {
        "sobel"
    }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, TaskError> {
        ensure_nonempty(self.name(), image)?;

        let (width, height) = image.dimensions();

        // Work on a single luminance plane. The input is normally already
        // gray-replicated by the grayscale stage, in which case this is the
        // identity on channel values.
        let luma: Vec<f64> = image
            .pixels()
            .map(|Rgb([r, g, b])| {
                0.299 * *r as f64 + 0.587 * *g as f64 + 0.114 * *b as f64
            })
            .collect();

        let sample = |x: i64, y: i64| -> f64 {
            let sx = x.clamp(0, width as i64 - 1) as usize;
            let sy = y.clamp(0, height as i64 - 1) as usize;
            luma[sy * width as usize + sx]
        };

        let mut magnitude = vec![0.0f64; (width * height) as usize];
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let mut gx = 0.0;
                let mut gy = 0.0;
                for ky in 0..3 {
                    for kx in 0..3 {
                        let value = sample(x + kx - 1, y + ky - 1);
                        gx += GX[ky as usize][kx as usize] as f64 * value;
                        gy += GY[ky as usize][kx as usize] as f64 * value;
                    }
                }
                magnitude[(y * width as i64 + x) as usize] = (gx * gx + gy * gy).sqrt();
            }
        }

        let min = magnitude.iter().copied().fold(f64::INFINITY, f64::min);
        let max = magnitude.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let output = RgbImage::from_fn(width, height, |x, y| {
            let m = magnitude[(y * width + x) as usize];
            let scaled = if range > 0.0 {
                ((m - min) / range * 255.0).round() as u8
            } else {
                0
            };
            Rgb([scaled, scaled, scaled])
        });

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_has_no_edges() {
        let input = RgbImage::from_pixel(6, 6, Rgb([128, 128, 128]));
        let output = SobelEdges.apply(&input).unwrap();

        for pixel in output.pixels() {
            assert_eq!(pixel.0, [0, 0, 0]);
        }
    }

    #[test]
    fn vertical_edge_is_detected_and_normalized_to_full_range() {
        let input = RgbImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });

        let output = SobelEdges.apply(&input).unwrap();

        // The strongest response along the edge normalizes to 255
        let max = output.pixels().map(|p| p.0[0]).max().unwrap();
        assert_eq!(max, 255);

        // Far from the edge the response normalizes to 0
        assert_eq!(output.get_pixel(0, 4).0[0], 0);
    }

    #[test]
    fn output_is_gray_replicated() {
        let input = RgbImage::from_fn(5, 5, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 0]));
        let output = SobelEdges.apply(&input).unwrap();

        for pixel in output.pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }
}
