//! The interface a front end drives: enqueue payloads, pick a tier, compress,
//! read back the state and the downloads.
//!
//! All collection mutations (enqueue, remove, clear, and the batch's mark and
//! merge steps) are serialized behind one lock. A batch does not hold the
//! lock while compressing.

use crate::batch::{BatchOptions, BatchOrchestrator, BatchReport, ProgressHook};
use crate::collection::{Download, ImageCollection, ImageId, QueuedImage};
use crate::compressor::{CompressorConfig, ImageCompressor};
use crate::error::{CompressionError, Result};
use crate::handle::{HandleRegistry, InMemoryRegistry};
use crate::intake::BinaryPayload;
use crate::tier::{scale_for, QualityTier};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct Session {
    collection: Mutex<ImageCollection>,
    registry: Arc<dyn HandleRegistry>,
    orchestrator: BatchOrchestrator,
    running: AtomicBool,
}

/// Clears the running flag when a batch ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new(config: CompressorConfig, options: &BatchOptions) -> Result<Self> {
        Self::with_registry(Arc::new(InMemoryRegistry::new()), config, options)
    }

    pub fn with_registry(
        registry: Arc<dyn HandleRegistry>,
        config: CompressorConfig,
        options: &BatchOptions,
    ) -> Result<Self> {
        let orchestrator = BatchOrchestrator::new(
            ImageCompressor::new(config),
            Arc::clone(&registry),
            options,
        )?;
        Ok(Self {
            collection: Mutex::new(ImageCollection::new()),
            registry,
            orchestrator,
            running: AtomicBool::new(false),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ImageCollection> {
        self.collection.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn registry(&self) -> &Arc<dyn HandleRegistry> {
        &self.registry
    }

    /// Queue every image payload as `Pending`; anything that is not an image
    /// is ignored. Returns the newly queued entries.
    pub fn enqueue(&self, payloads: impl IntoIterator<Item = BinaryPayload>) -> Vec<QueuedImage> {
        let fresh: Vec<QueuedImage> = payloads
            .into_iter()
            .filter(|payload| {
                let keep = payload.is_image();
                if !keep {
                    crate::verbose!("Ignoring non-image payload {}", payload.name);
                }
                keep
            })
            .map(|payload| QueuedImage::new(payload, &self.registry))
            .collect();

        self.lock().add(fresh.iter().cloned());
        fresh
    }

    pub fn remove(&self, id: &ImageId) -> bool {
        self.lock().remove(id)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_compressing(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Snapshot in insertion order.
    pub fn list_images(&self) -> Vec<QueuedImage> {
        self.lock().images().to_vec()
    }

    pub fn is_settled(&self) -> bool {
        self.lock().is_settled()
    }

    pub fn downloadable_of(&self, image: &QueuedImage) -> Option<Download> {
        image.download()
    }

    /// Every finished output at the time of the call, in collection order.
    pub fn downloadables(&self) -> Vec<Download> {
        self.lock().downloads()
    }

    /// Compress everything currently queued at `tier` and return once every
    /// item has settled.
    pub fn compress_all(&self, tier: &QualityTier) -> Result<BatchReport> {
        self.compress_all_with_progress(tier, None)
    }

    pub fn compress_all_with_progress(
        &self,
        tier: &QualityTier,
        progress: Option<&ProgressHook<'_>>,
    ) -> Result<BatchReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CompressionError::BatchInProgress);
        }
        let _guard = RunningGuard(&self.running);

        crate::verbose!("Starting batch at {}", tier);
        Ok(self
            .orchestrator
            .run_batch(&self.collection, scale_for(tier), progress))
    }

    /// Runs [`Session::compress_all`] on tokio's blocking pool.
    pub async fn compress_all_async(self: Arc<Self>, tier: QualityTier) -> Result<BatchReport> {
        tokio::task::spawn_blocking(move || self.compress_all(&tier))
            .await
            .map_err(|e| CompressionError::TaskPanicked(e.to_string()))?
    }
}
