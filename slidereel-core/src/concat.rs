use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::assets::ImageSequence;
use crate::error::Result;

/// One image in a concat-demuxer list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatEntry {
    pub path: PathBuf,
    /// `None` only for the trailing repeat of the last image
    pub duration_secs: Option<u32>,
}

/// Input list for FFmpeg's concat demuxer (no-crossfade path)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<ConcatEntry>,
}

impl ConcatManifest {
    pub fn entries(&self) -> &[ConcatEntry] {
        &self.entries
    }

    /// Write the manifest to a temporary file, removed when the handle is dropped
    pub fn write_temp(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("slidereel-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(self.to_string().as_bytes())?;
        file.flush()?;
        log::debug!("Wrote concat manifest to {}", file.path().display());
        Ok(file)
    }
}

impl fmt::Display for ConcatManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "file '{}'", escape_path(&entry.path))?;
            if let Some(duration) = entry.duration_secs {
                writeln!(f, "duration {duration}")?;
            }
        }
        Ok(())
    }
}

/// Pair each image with its display time, then repeat the last image once.
///
/// The concat demuxer ignores the duration of the final entry, so the repeat
/// is what makes the last image hold for its full time.
pub fn build_concat_manifest(images: &ImageSequence, image_duration_secs: u32) -> ConcatManifest {
    let mut entries: Vec<ConcatEntry> = images
        .iter()
        .map(|path| ConcatEntry {
            path: path.clone(),
            duration_secs: Some(image_duration_secs),
        })
        .collect();

    if let Some(last) = images.paths().last() {
        entries.push(ConcatEntry {
            path: last.clone(),
            duration_secs: None,
        });
    }
    ConcatManifest { entries }
}

impl Serialize for ConcatManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}
