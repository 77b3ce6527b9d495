use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use image::RgbaImage;

use super::{EnhancementPipeline, PipelineError, PipelineProgress, PipelineResult};

enum PipelineEvent {
    Progress(PipelineProgress),
    Finished(PipelineResult<RgbaImage>),
}

type ProgressCallback = Box<dyn FnMut(PipelineProgress)>;
type CompleteCallback = Box<dyn FnOnce(RgbaImage)>;

/// Caller-side end of a running pipeline.
///
/// Work happens on a background thread. Callbacks are dispatched on whichever
/// thread calls [`PipelineHandle::poll`] or [`PipelineHandle::wait`], so an
/// event loop can drive them from its own thread.
pub struct PipelineHandle {
    events: Receiver<PipelineEvent>,
    thread: Option<JoinHandle<()>>,
    on_progress: ProgressCallback,
    on_complete: Option<CompleteCallback>,
    finished: bool,
}

impl PipelineHandle {
    /// Dispatches every event produced so far without blocking.
    ///
    /// Returns `Ok(false)` while the pipeline is still running and `Ok(true)`
    /// once it completed. A failure is returned by the call that observes it.
    pub fn poll(&mut self) -> PipelineResult<bool> {
        while !self.finished {
            match self.events.try_recv() {
                Ok(event) => self.dispatch(event)?,
                Err(TryRecvError::Empty) => return Ok(false),
                Err(TryRecvError::Disconnected) => return self.coordinator_gone(),
            }
        }
        Ok(true)
    }

    /// Blocks until the pipeline finishes, dispatching callbacks as events arrive.
    pub fn wait(mut self) -> PipelineResult<()> {
        while !self.finished {
            match self.events.recv() {
                Ok(event) => self.dispatch(event)?,
                Err(_) => {
                    self.coordinator_gone()?;
                }
            }
        }
        self.join();
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn dispatch(&mut self, event: PipelineEvent) -> PipelineResult<()> {
        match event {
            PipelineEvent::Progress(progress) => (self.on_progress)(progress),
            PipelineEvent::Finished(result) => {
                self.finished = true;
                let final_raster = result?;
                if let Some(on_complete) = self.on_complete.take() {
                    on_complete(final_raster);
                }
            }
        }
        Ok(())
    }

    fn coordinator_gone(&mut self) -> PipelineResult<bool> {
        self.finished = true;
        self.join();
        Err(PipelineError::CoordinatorPanicked)
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("pipeline coordinator thread panicked");
            }
        }
    }
}

/// Runs `pipeline` over `raster` on a dedicated coordinator thread.
pub(super) fn spawn_coordinator(
    pipeline: EnhancementPipeline,
    raster: RgbaImage,
    on_progress: ProgressCallback,
    on_complete: CompleteCallback,
) -> PipelineHandle {
    let (sender, events) = mpsc::channel::<PipelineEvent>();
    let progress_sender = sender.clone();
    let finished_sender = sender.clone();

    let spawned = std::thread::Builder::new()
        .name("scancrop-pipeline".to_string())
        .spawn(move || {
            let result = pipeline.run_blocking(raster, |progress| {
                let _ = progress_sender.send(PipelineEvent::Progress(progress));
            });
            let _ = sender.send(PipelineEvent::Finished(result));
        });

    let thread = match spawned {
        Ok(thread) => Some(thread),
        Err(err) => {
            tracing::warn!(?err, "failed to spawn pipeline coordinator");
            let _ = finished_sender.send(PipelineEvent::Finished(Err(PipelineError::Spawn(err))));
            None
        }
    };

    PipelineHandle {
        events,
        thread,
        on_progress,
        on_complete: Some(on_complete),
        finished: false,
    }
}
