//! Split → enhance (parallel) → compose → sharpen → persist.

mod compose;
mod coordinator;
mod sharpen;
mod split;
mod workers;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::enhance::{EnhanceConfig, SharpenConfig};
use crate::storage::{RasterSink, StorageError};

pub use compose::compose_strips;
pub use coordinator::PipelineHandle;
pub use sharpen::sharpen;
pub use split::{split_into_strips, strip_height};
pub use workers::{enhance_strips, StripEnhancer, ToneEnhancer};

const PROGRESS_ENHANCING: &str = "Please wait while we enhance and crop your image";
const PROGRESS_SHARPENING: &str = "Sharpening the image for you.";

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source raster is malformed ({width}x{height})")]
    MalformedRaster { width: u32, height: u32 },
    #[error("{strips} strips over {height} rows leaves zero-height strips")]
    ZeroHeightStrips { height: u32, strips: usize },
    #[error("enhancement of strip {index} failed: {reason}")]
    StripFailed { index: usize, reason: String },
    #[error("worker for strip {index} exited without a result")]
    WorkerLost { index: usize },
    #[error("strip {index} is {actual} px wide, expected {expected}")]
    StripWidthMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },
    #[error("failed to persist the enhanced image")]
    Persist(#[from] StorageError),
    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to start pipeline coordinator")]
    Spawn(#[source] std::io::Error),
    #[error("pipeline coordinator stopped before reporting a result")]
    CoordinatorPanicked,
}

/// Phase transitions reported while a pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineProgress {
    Enhancing { strips: usize },
    Composited { width: u32, height: u32 },
    Sharpening,
}

impl PipelineProgress {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Enhancing { .. } => PROGRESS_ENHANCING,
            Self::Composited { .. } | Self::Sharpening => PROGRESS_SHARPENING,
        }
    }
}

/// Number of parallel execution units, at least one.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineConfig {
    /// Strip and thread count; `None` uses [`available_workers`].
    pub workers: Option<usize>,
    pub enhance: EnhanceConfig,
    pub sharpen: SharpenConfig,
}

impl PipelineConfig {
    pub fn resolved_workers(&self) -> usize {
        self.workers
            .filter(|workers| *workers > 0)
            .unwrap_or_else(available_workers)
    }
}

/// A configured pipeline. Cheap to clone; clones share the worker pool.
#[derive(Clone)]
pub struct EnhancementPipeline {
    workers: usize,
    sharpen: SharpenConfig,
    enhancer: Arc<dyn StripEnhancer>,
    sink: Arc<dyn RasterSink>,
    pool: Arc<ThreadPool>,
}

impl EnhancementPipeline {
    pub fn new(config: PipelineConfig, sink: Arc<dyn RasterSink>) -> PipelineResult<Self> {
        let workers = config.resolved_workers();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("scancrop-strip-{index}"))
            .build()?;
        Ok(Self {
            workers,
            sharpen: config.sharpen,
            enhancer: Arc::new(ToneEnhancer::new(config.enhance)),
            sink,
            pool: Arc::new(pool),
        })
    }

    /// Replaces the per-strip enhancement.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn StripEnhancer>) -> Self {
        self.enhancer = enhancer;
        self
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every phase on the calling thread and returns the final raster
    /// after it has been persisted.
    pub fn run_blocking(
        &self,
        raster: RgbaImage,
        mut on_progress: impl FnMut(PipelineProgress),
    ) -> PipelineResult<RgbaImage> {
        let started = Instant::now();
        let strips = split_into_strips(&raster, self.workers)?;
        drop(raster);

        tracing::info!(strips = strips.len(), "enhancing strips");
        on_progress(PipelineProgress::Enhancing {
            strips: strips.len(),
        });
        let enhanced = enhance_strips(&self.pool, &self.enhancer, strips)?;

        let composite = compose_strips(&enhanced)?;
        drop(enhanced);
        let (width, height) = composite.dimensions();
        tracing::info!(width, height, "strips composited");
        on_progress(PipelineProgress::Composited { width, height });

        on_progress(PipelineProgress::Sharpening);
        let sharpen_config = self.sharpen;
        let final_raster = self.pool.install(|| sharpen(&composite, &sharpen_config));
        drop(composite);

        self.sink.persist(&final_raster)?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enhancement pipeline finished"
        );
        Ok(final_raster)
    }
}

/// Starts `pipeline` on a background coordinator and returns immediately.
///
/// `on_progress` fires at each phase transition and `on_complete` fires once
/// with the final raster on success. Both run on the thread that drives the
/// returned handle.
pub fn run_enhancement_pipeline(
    raster: RgbaImage,
    pipeline: &EnhancementPipeline,
    on_progress: impl FnMut(PipelineProgress) + 'static,
    on_complete: impl FnOnce(RgbaImage) + 'static,
) -> PipelineHandle {
    coordinator::spawn_coordinator(
        pipeline.clone(),
        raster,
        Box::new(on_progress),
        Box::new(on_complete),
    )
}
