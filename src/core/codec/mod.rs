//! # Codec Module
//!
//! Decodes and encodes images for the pipeline.
//!
//! Every image is normalized to 8-bit RGB on decode so the filter stages
//! always see the same buffer layout regardless of the on-disk format.
//! Encoding keeps the source file name, so the output format follows the
//! extension.

use crate::error::TaskError;
use image::RgbImage;
use std::fs;
use std::path::Path;

/// Decode an image file into an 8-bit RGB buffer.
pub fn decode(path: &Path) -> Result<RgbImage, TaskError> {
    let image = image::open(path).map_err(|e| TaskError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(image.to_rgb8())
}

/// Encode an RGB buffer to disk, creating parent directories as needed.
pub fn encode(image: &RgbImage, path: &Path) -> Result<(), TaskError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TaskError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    image.save(path).map_err(|e| TaskError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn checkerboard(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn encode_then_decode_preserves_pixels() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("board.png");

        let original = checkerboard(8, 6);
        encode(&original, &path).unwrap();
        let decoded = decode(&path).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn encode_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("deeper").join("out.png");

        encode(&checkerboard(4, 4), &path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn decode_missing_file_fails() {
        let result = decode(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(TaskError::Decode { .. })));
    }

    #[test]
    fn decode_corrupt_file_fails_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.png");
        fs::write(&path, b"this is not a png").unwrap();

        match decode(&path) {
            Err(TaskError::Decode { path: p, .. }) => {
                assert!(p.ends_with("corrupt.png"));
            }
            other => panic!("expected decode error, got {:?}", other.map(|_| ())),
        }
    }
}
