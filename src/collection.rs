//! Queued images, their lifecycle status, and the ordered collection that
//! owns them.
//!
//! Status moves `Pending -> Compressing -> Done | Error` within one batch. The
//! collection is the only place a status changes: [`ImageCollection::mark_compressing`]
//! starts a run and [`ImageCollection::merge_results`] settles it.

use crate::batch::BatchJob;
use crate::constants::{DOWNLOAD_PREFIX, OUTPUT_EXTENSION};
use crate::handle::{HandleRegistry, TransientHandle};
use crate::intake::BinaryPayload;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(String);

impl ImageId {
    /// `name-lastModified-random`, unique even for repeated file names.
    pub fn generate(name: &str, last_modified: u64) -> Self {
        Self(format!(
            "{}-{}-{}",
            name,
            last_modified,
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus {
    Pending,
    Compressing,
    Done {
        output: TransientHandle,
        size_bytes: u64,
        width: u32,
        height: u32,
    },
    Error {
        message: String,
    },
}

impl ImageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ImageStatus::Pending => "pending",
            ImageStatus::Compressing => "compressing",
            ImageStatus::Done { .. } => "done",
            ImageStatus::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ImageStatus::Done { .. } | ImageStatus::Error { .. })
    }
}

/// Settled result of one compression task, keyed by image id.
#[derive(Debug, Clone)]
pub enum CompressionOutcome {
    Done {
        id: ImageId,
        output: TransientHandle,
        width: u32,
        height: u32,
    },
    Failed {
        id: ImageId,
        message: String,
    },
}

impl CompressionOutcome {
    pub fn id(&self) -> &ImageId {
        match self {
            CompressionOutcome::Done { id, .. } | CompressionOutcome::Failed { id, .. } => id,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, CompressionOutcome::Done { .. })
    }

    fn into_status(self) -> ImageStatus {
        match self {
            CompressionOutcome::Done {
                output,
                width,
                height,
                ..
            } => ImageStatus::Done {
                size_bytes: output.size_bytes(),
                output,
                width,
                height,
            },
            CompressionOutcome::Failed { message, .. } => ImageStatus::Error { message },
        }
    }
}

/// A compressed output ready to be saved under `filename`.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub output: TransientHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedImage {
    id: ImageId,
    source: BinaryPayload,
    preview: TransientHandle,
    original_size: u64,
    status: ImageStatus,
}

impl QueuedImage {
    pub fn new(source: BinaryPayload, registry: &Arc<dyn HandleRegistry>) -> Self {
        let preview = TransientHandle::acquire(
            registry,
            source.media_type.clone().unwrap_or_default(),
            Arc::clone(&source.bytes),
        );
        Self {
            id: ImageId::generate(&source.name, source.last_modified),
            original_size: source.size_bytes(),
            preview,
            source,
            status: ImageStatus::Pending,
        }
    }

    pub fn id(&self) -> &ImageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn source(&self) -> &BinaryPayload {
        &self.source
    }

    pub fn preview(&self) -> &TransientHandle {
        &self.preview
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn status(&self) -> &ImageStatus {
        &self.status
    }

    pub fn compressed_size(&self) -> Option<u64> {
        match &self.status {
            ImageStatus::Done { size_bytes, .. } => Some(*size_bytes),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ImageStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Percentage saved against the original, rounded; negative when the
    /// output grew.
    pub fn reduction_percent(&self) -> Option<i64> {
        let compressed = self.compressed_size()?;
        if self.original_size == 0 {
            return None;
        }
        let saved = self.original_size as f64 - compressed as f64;
        Some((saved / self.original_size as f64 * 100.0).round() as i64)
    }

    /// Only available once the image is done.
    pub fn download(&self) -> Option<Download> {
        match &self.status {
            ImageStatus::Done { output, .. } => Some(Download {
                filename: download_filename(&self.source.name),
                output: output.clone(),
            }),
            _ => None,
        }
    }
}

pub fn download_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| name.to_string());
    format!("{}{}.{}", DOWNLOAD_PREFIX, stem, OUTPUT_EXTENSION)
}

/// Insertion-ordered set of queued images.
#[derive(Debug, Default)]
pub struct ImageCollection {
    items: Vec<QueuedImage>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn images(&self) -> &[QueuedImage] {
        &self.items
    }

    pub fn get(&self, id: &ImageId) -> Option<&QueuedImage> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Append items in order, skipping any whose id is already present.
    /// Returns how many were added.
    pub fn add(&mut self, items: impl IntoIterator<Item = QueuedImage>) -> usize {
        let mut added = 0;
        for item in items {
            if self.get(&item.id).is_some() {
                crate::verbose!("Skipping duplicate image id {}", item.id);
                continue;
            }
            self.items.push(item);
            added += 1;
        }
        added
    }

    /// Drop the item and every handle it holds.
    pub fn remove(&mut self, id: &ImageId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Flip every item to `Compressing` in one step and return the work for
    /// the batch. Outputs from an earlier run are released here.
    pub fn mark_compressing(&mut self) -> Vec<BatchJob> {
        self.items
            .iter_mut()
            .map(|item| {
                item.status = ImageStatus::Compressing;
                BatchJob {
                    id: item.id.clone(),
                    source: Arc::clone(&item.source.bytes),
                }
            })
            .collect()
    }

    /// Apply settled outcomes by id. Outcomes for removed items, or for items
    /// that are no longer compressing, are dropped. Returns how many applied.
    pub fn merge_results(&mut self, outcomes: impl IntoIterator<Item = CompressionOutcome>) -> usize {
        let mut merged = 0;
        for outcome in outcomes {
            if self.merge_outcome(outcome) {
                merged += 1;
            }
        }
        merged
    }

    /// Apply one outcome; false when it was dropped.
    pub fn merge_outcome(&mut self, outcome: CompressionOutcome) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| &item.id == outcome.id()) else {
            crate::verbose!("Dropping result for removed image {}", outcome.id());
            return false;
        };
        if item.status != ImageStatus::Compressing {
            return false;
        }
        item.status = outcome.into_status();
        true
    }

    /// True once there is at least one item and none is still pending or
    /// compressing.
    pub fn is_settled(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.status.is_terminal())
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.items.iter().filter_map(QueuedImage::download).collect()
    }
}
