use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use image::RgbaImage;
use rayon::ThreadPool;

use crate::enhance::{enhance_strip, EnhanceConfig};

use super::{PipelineError, PipelineResult};

/// Per-strip enhancement. Implementations see only their own strip.
pub trait StripEnhancer: Send + Sync {
    fn enhance(&self, index: usize, strip: RgbaImage) -> Result<RgbaImage, String>;
}

impl<F> StripEnhancer for F
where
    F: Fn(usize, RgbaImage) -> Result<RgbaImage, String> + Send + Sync,
{
    fn enhance(&self, index: usize, strip: RgbaImage) -> Result<RgbaImage, String> {
        self(index, strip)
    }
}

/// Brightness/contrast enhancement driven by [`EnhanceConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneEnhancer {
    config: EnhanceConfig,
}

impl ToneEnhancer {
    pub const fn new(config: EnhanceConfig) -> Self {
        Self { config }
    }
}

impl StripEnhancer for ToneEnhancer {
    fn enhance(&self, _index: usize, strip: RgbaImage) -> Result<RgbaImage, String> {
        Ok(enhance_strip(strip, &self.config))
    }
}

type StripOutcome = Result<RgbaImage, String>;

/// Pending result of one strip; resolved exactly once by its worker.
struct StripPromise {
    index: usize,
    receiver: Receiver<StripOutcome>,
}

impl StripPromise {
    fn wait(self) -> PipelineResult<RgbaImage> {
        match self.receiver.recv() {
            Ok(Ok(strip)) => Ok(strip),
            Ok(Err(reason)) => Err(PipelineError::StripFailed {
                index: self.index,
                reason,
            }),
            Err(_) => Err(PipelineError::WorkerLost { index: self.index }),
        }
    }
}

/// Enhances every strip on `pool` and returns them in input order.
///
/// Blocks until every worker has reported. If any strip fails, the error of
/// the lowest failing index is returned and no partial result is produced.
pub fn enhance_strips(
    pool: &ThreadPool,
    enhancer: &Arc<dyn StripEnhancer>,
    strips: Vec<RgbaImage>,
) -> PipelineResult<Vec<RgbaImage>> {
    let promises: Vec<StripPromise> = strips
        .into_iter()
        .enumerate()
        .map(|(index, strip)| spawn_strip(pool, Arc::clone(enhancer), index, strip))
        .collect();
    wait_for_all(promises)
}

fn spawn_strip(
    pool: &ThreadPool,
    enhancer: Arc<dyn StripEnhancer>,
    index: usize,
    strip: RgbaImage,
) -> StripPromise {
    let (sender, receiver) = mpsc::sync_channel::<StripOutcome>(1);
    pool.spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| enhancer.enhance(index, strip)))
            .unwrap_or_else(|payload| Err(panic_reason(payload.as_ref())));
        if let Err(reason) = &outcome {
            tracing::warn!(index, %reason, "strip enhancement failed");
        } else {
            tracing::debug!(index, "strip enhanced");
        }
        let _ = sender.send(outcome);
    });
    StripPromise { index, receiver }
}

fn wait_for_all(promises: Vec<StripPromise>) -> PipelineResult<Vec<RgbaImage>> {
    let mut slots: Vec<Option<RgbaImage>> = promises.iter().map(|_| None).collect();
    let mut first_failure = None;

    for promise in promises {
        let index = promise.index;
        match promise.wait() {
            Ok(strip) => slots[index] = Some(strip),
            Err(err) => {
                first_failure.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_failure {
        return Err(err);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(PipelineError::WorkerLost { index }))
        .collect()
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rayon::ThreadPoolBuilder;
    use std::sync::{Condvar, Mutex};

    fn pool(threads: usize) -> ThreadPool {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("thread pool")
    }

    fn tagged_strips(count: u8) -> Vec<RgbaImage> {
        (0..count)
            .map(|tag| RgbaImage::from_pixel(3, 2, Rgba([tag, 0, 0, 255])))
            .collect()
    }

    #[test]
    fn results_keep_input_order_when_workers_finish_in_reverse() {
        const STRIPS: usize = 4;
        // Worker `i` may only finish once worker `i + 1` has.
        let turn = Arc::new((Mutex::new(STRIPS - 1), Condvar::new()));
        let finished = Arc::new(Mutex::new(Vec::new()));

        let enhancer: Arc<dyn StripEnhancer> = {
            let turn = Arc::clone(&turn);
            let finished = Arc::clone(&finished);
            Arc::new(move |index: usize, mut strip: RgbaImage| -> StripOutcome {
                let (lock, ready) = &*turn;
                let mut next = lock.lock().expect("turn lock");
                while *next != index {
                    next = ready.wait(next).expect("turn wait");
                }
                for pixel in strip.pixels_mut() {
                    pixel[1] = 100 + index as u8;
                }
                finished.lock().expect("finished lock").push(index);
                *next = index.wrapping_sub(1);
                ready.notify_all();
                Ok(strip)
            })
        };

        let enhanced =
            enhance_strips(&pool(STRIPS), &enhancer, tagged_strips(STRIPS as u8)).expect("enhance");

        assert_eq!(*finished.lock().expect("finished lock"), vec![3, 2, 1, 0]);
        for (index, strip) in enhanced.iter().enumerate() {
            assert_eq!(strip.get_pixel(0, 0).0, [index as u8, 100 + index as u8, 0, 255]);
        }
    }

    #[test]
    fn failing_strip_fails_the_whole_batch() {
        let enhancer: Arc<dyn StripEnhancer> = Arc::new(|index: usize, strip: RgbaImage| -> StripOutcome {
            if index == 2 {
                Err("sensor noise".to_string())
            } else {
                Ok(strip)
            }
        });
        let err = enhance_strips(&pool(2), &enhancer, tagged_strips(4)).expect_err("strip 2 fails");
        assert!(matches!(
            err,
            PipelineError::StripFailed { index: 2, ref reason } if reason == "sensor noise"
        ));
    }

    #[test]
    fn panicking_worker_is_reported_as_a_strip_failure() {
        let enhancer: Arc<dyn StripEnhancer> = Arc::new(|index: usize, strip: RgbaImage| -> StripOutcome {
            if index == 1 {
                panic!("strip {index} exploded");
            }
            Ok(strip)
        });
        let err = enhance_strips(&pool(2), &enhancer, tagged_strips(3)).expect_err("panic");
        assert!(matches!(
            err,
            PipelineError::StripFailed { index: 1, ref reason } if reason == "strip 1 exploded"
        ));
    }

    #[test]
    fn lowest_failing_index_wins() {
        let enhancer: Arc<dyn StripEnhancer> =
            Arc::new(|index: usize, _strip: RgbaImage| -> StripOutcome {
                Err(format!("failed {index}"))
            });
        let err = enhance_strips(&pool(3), &enhancer, tagged_strips(3)).expect_err("all fail");
        assert!(matches!(err, PipelineError::StripFailed { index: 0, .. }));
    }

    #[test]
    fn tone_enhancer_applies_the_configured_brightness() {
        let enhancer: Arc<dyn StripEnhancer> = Arc::new(ToneEnhancer::new(EnhanceConfig {
            brightness: 5,
            contrast: 0.0,
            iterations: 1,
        }));
        let enhanced = enhance_strips(&pool(2), &enhancer, tagged_strips(2)).expect("enhance");
        assert_eq!(enhanced[1].get_pixel(2, 1).0, [6, 5, 5, 255]);
    }
}
