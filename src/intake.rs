use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use crate::error::{CompressionError, Result};
use crate::formats::detect_media_type;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Raw bytes submitted for compression, with the metadata a browser `File`
/// would carry.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPayload {
    pub name: String,
    pub media_type: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
    pub bytes: Arc<[u8]>,
}

impl BinaryPayload {
    pub fn new(
        name: impl Into<String>,
        media_type: Option<&str>,
        last_modified: u64,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            last_modified,
            bytes: bytes.into(),
        }
    }

    /// Read a file, deriving its media type from the extension or contents.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let last_modified = fs::metadata(path)?
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let media_type = detect_media_type(path, &bytes);

        Ok(Self::new(name, media_type, last_modified, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|m| m.starts_with("image/"))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Expand a file path, directory, or glob pattern into candidate image files.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    Ok(image_files)
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read every collected file. Unreadable files are reported and skipped.
pub fn read_payloads(paths: &[PathBuf]) -> Vec<BinaryPayload> {
    paths
        .iter()
        .filter_map(|path| match BinaryPayload::read(path) {
            Ok(payload) => Some(payload),
            Err(e) => {
                crate::warn!("Skipping {:?}: {}", path, e);
                None
            }
        })
        .collect()
}
