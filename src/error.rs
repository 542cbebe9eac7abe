use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Drawing surface unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Compression task panicked: {0}")]
    TaskPanicked(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Unknown quality tier: {0}")]
    UnknownTier(String),

    #[error("A compression batch is already running")]
    BatchInProgress,

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

impl CompressionError {
    /// Errors that belong to a single item's compression task. These end up
    /// as that item's `Error` status and never abort a batch.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            CompressionError::Decode(_)
                | CompressionError::Encode(_)
                | CompressionError::ContextUnavailable(_)
                | CompressionError::TaskPanicked(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
