pub mod batch;
pub mod cli;
pub mod collection;
pub mod compressor;
pub mod constants;
pub mod error;
pub mod formats;
pub mod handle;
pub mod intake;
pub mod logger;
pub mod session;
pub mod tier;
pub mod utils;

pub use batch::{BatchJob, BatchOptions, BatchOrchestrator, BatchReport, ProgressHook};
pub use collection::{
    CompressionOutcome, Download, ImageCollection, ImageId, ImageStatus, QueuedImage,
};
pub use compressor::{
    target_dimensions, CompressedImage, CompressorConfig, ImageCompressor, ResampleFilter,
};
pub use error::{CompressionError, Result};
pub use handle::{HandleId, HandleRegistry, InMemoryRegistry, TransientHandle};
pub use intake::{collect_image_files, read_payloads, BinaryPayload};
pub use session::Session;
pub use tier::{default_tier, find_tier, scale_for, QualityTier, QUALITY_TIERS};
