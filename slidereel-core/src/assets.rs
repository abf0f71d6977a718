use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SlideshowError};

/// File extensions picked up from the input directory (matched as written)
pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Ordered list of absolute image paths.
///
/// Sorted by file name; the position of an image decides when it plays, which
/// pan/zoom trajectory it gets and which input index it is fed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
}

impl ImageSequence {
    /// Build a sequence from already-resolved paths, sorting them by file name
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Self { paths }
    }

    /// Enumerate `.jpg`/`.jpeg` files in `dir` (non-recursive)
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SlideshowError::InputDirNotFound(dir.to_path_buf()));
        }
        let dir = fs::canonicalize(dir)?;

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(SlideshowError::NoImages(dir));
        }

        let sequence = Self::new(paths);
        log::info!("Found {} images in {}", sequence.len(), dir.display());
        Ok(sequence)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}
