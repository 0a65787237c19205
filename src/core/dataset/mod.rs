//! # Dataset Module
//!
//! Enumerates the input image files for a benchmark run.
//!
//! The listing is non-recursive, sorted by file name and filtered to
//! recognized image extensions, so every run (and every execution strategy
//! within a run) sees the identical ordered task list.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - BMP (.bmp)

use crate::error::DatasetError;
use crate::events::{DatasetEvent, Event, EventSender};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filters directory entries to supported image files
pub struct ImageFilter {
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Create a filter with the default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "bmp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        // Hidden files never count as dataset members
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// List the image files of a dataset directory.
///
/// Returns at most `limit` paths (when given), sorted by file name for
/// deterministic ordering across runs. Fails with [`DatasetError::NotFound`]
/// if the directory is missing and [`DatasetError::Empty`] if no file
/// matches a recognized extension.
pub fn list_images(dir: &Path, limit: Option<usize>) -> Result<Vec<PathBuf>, DatasetError> {
    list_images_with_events(dir, limit, &crate::events::null_sender())
}

/// Same as [`list_images`], reporting progress via events.
pub fn list_images_with_events(
    dir: &Path,
    limit: Option<usize>,
    events: &EventSender,
) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    events.send(Event::Dataset(DatasetEvent::Started {
        path: dir.to_path_buf(),
    }));

    let filter = ImageFilter::new();
    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
            DatasetError::ReadDirectory {
                path,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error")),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if !filter.should_include(entry.path()) {
            continue;
        }

        images.push(entry.into_path());

        if let Some(limit) = limit {
            if images.len() >= limit {
                break;
            }
        }
    }

    if images.is_empty() {
        return Err(DatasetError::Empty {
            path: dir.to_path_buf(),
        });
    }

    tracing::info!(count = images.len(), dir = %dir.display(), "dataset loaded");
    events.send(Event::Dataset(DatasetEvent::Loaded {
        total_images: images.len(),
    }));

    Ok(images)
}
