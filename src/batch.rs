use crate::collection::{CompressionOutcome, ImageCollection, ImageId};
use crate::compressor::ImageCompressor;
use crate::constants::OUTPUT_MEDIA_TYPE;
use crate::error::{CompressionError, Result};
use crate::handle::{HandleRegistry, TransientHandle};
use crate::utils::calculate_compression_ratio;
use rayon::prelude::*;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One image's share of a batch: its id and a read-only view of its source.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub id: ImageId,
    pub source: Arc<[u8]>,
}

/// Called once per task as soon as it settles, in completion order.
pub type ProgressHook<'a> = dyn Fn(&CompressionOutcome) + Send + Sync + 'a;

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Worker threads; `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_original_bytes: u64,
    pub total_compressed_bytes: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn reduction_percent(&self) -> f64 {
        calculate_compression_ratio(self.total_original_bytes, self.total_compressed_bytes)
    }

    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs the compressor over every queued image and merges the settled
/// results back. One task's failure never reaches its siblings.
pub struct BatchOrchestrator {
    compressor: ImageCompressor,
    registry: Arc<dyn HandleRegistry>,
    pool: Option<rayon::ThreadPool>,
}

impl BatchOrchestrator {
    pub fn new(
        compressor: ImageCompressor,
        registry: Arc<dyn HandleRegistry>,
        options: &BatchOptions,
    ) -> Result<Self> {
        let pool = match options.threads {
            Some(num_threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| CompressionError::WorkerPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            compressor,
            registry,
            pool,
        })
    }

    pub fn compressor(&self) -> &ImageCompressor {
        &self.compressor
    }

    /// Mark, compress, join, merge.
    ///
    /// The collection lock is held only while marking and while merging, so
    /// items removed in between stay removed. The report only counts results
    /// that were merged.
    pub fn run_batch(
        &self,
        collection: &Mutex<ImageCollection>,
        scale: f64,
        progress: Option<&ProgressHook<'_>>,
    ) -> BatchReport {
        let start_time = Instant::now();

        let jobs = collection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .mark_compressing();
        let dispatched = jobs.len();
        let original_sizes: HashMap<ImageId, u64> = jobs
            .iter()
            .map(|job| (job.id.clone(), job.source.len() as u64))
            .collect();

        crate::verbose!("Compressing {} images at scale {:.3}", dispatched, scale);

        let outcomes = self.compress_jobs(jobs, scale, progress);

        let mut report = BatchReport::default();
        let mut guard = collection.lock().unwrap_or_else(|e| e.into_inner());
        for outcome in outcomes {
            let original = original_sizes.get(outcome.id()).copied().unwrap_or(0);
            let compressed = match &outcome {
                CompressionOutcome::Done { output, .. } => Some(output.size_bytes()),
                CompressionOutcome::Failed { .. } => None,
            };
            if !guard.merge_outcome(outcome) {
                continue;
            }

            report.total += 1;
            report.total_original_bytes += original;
            match compressed {
                Some(size) => {
                    report.succeeded += 1;
                    report.total_compressed_bytes += size;
                }
                None => report.failed += 1,
            }
        }
        drop(guard);

        if report.total < dispatched {
            crate::verbose!(
                "{} results dropped for images removed mid-batch",
                dispatched - report.total
            );
        }

        report.elapsed = start_time.elapsed();
        report
    }

    /// Compress every job independently and wait for all of them to settle.
    pub fn compress_jobs(
        &self,
        jobs: Vec<BatchJob>,
        scale: f64,
        progress: Option<&ProgressHook<'_>>,
    ) -> Vec<CompressionOutcome> {
        let run = || {
            jobs.into_par_iter()
                .map(|job| {
                    let outcome = self.settle(job, scale);
                    if let Some(hook) = progress {
                        hook(&outcome);
                    }
                    outcome
                })
                .collect::<Vec<_>>()
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    fn settle(&self, job: BatchJob, scale: f64) -> CompressionOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.compressor.compress(&job.source, scale)
        }))
        .unwrap_or_else(|payload| Err(CompressionError::TaskPanicked(panic_message(payload))));

        match result {
            Ok(compressed) => CompressionOutcome::Done {
                id: job.id,
                width: compressed.width,
                height: compressed.height,
                output: TransientHandle::acquire(
                    &self.registry,
                    OUTPUT_MEDIA_TYPE,
                    Arc::from(compressed.bytes),
                ),
            },
            Err(e) => {
                debug_assert!(e.is_item_scoped(), "non-item error from compressor: {}", e);
                crate::verbose!("Failed to compress {}: {}", job.id, e);
                CompressionOutcome::Failed {
                    id: job.id,
                    message: e.to_string(),
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
