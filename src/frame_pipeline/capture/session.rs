use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn};

use crate::frame_pipeline::{
    capture::frame_loop::{LoopAction, LoopController},
    capture::processor::FrameProcessor,
    capture::types::{BatchReport, CaptureConfig, CapturedFrames},
    common::error::Result,
    device::CameraHandle,
    display::{DisplayFrames, FrameMailbox},
    snapshot::{CsvGridWriter, GridWriter},
};

/// Pause after a failed frame pull so a dead device does not spin the thread
const PULL_RETRY_DELAY: Duration = Duration::from_millis(10);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Ticks that pulled a full frame set
    pub ticks: u64,
    /// Ticks lost to a failed pull
    pub pull_failures: u64,
}

struct Shared<W: GridWriter> {
    processor: Mutex<FrameProcessor<W>>,
    latest: Mutex<Option<Arc<CapturedFrames>>>,
    mailbox: Arc<FrameMailbox>,
    ticks: AtomicU64,
    pull_failures: AtomicU64,
}

/// State owned by the capture thread; stops the camera when the loop ends.
struct CaptureState<C: CameraHandle> {
    camera: C,
    frames: CapturedFrames,
}

impl<C: CameraHandle> Drop for CaptureState<C> {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop() {
            warn!(serial = %self.camera.serial(), "Failed to stop camera: {}", e);
        }
    }
}

/// A running camera: the capture thread plus the processor it shares with
/// manual batches.
pub struct CaptureSession<W: GridWriter + Send + 'static = CsvGridWriter> {
    shared: Arc<Shared<W>>,
    controller: Option<LoopController>,
    config: CaptureConfig,
}

impl<W: GridWriter + Send + 'static> CaptureSession<W> {
    /// Starts the camera on a new `capture` thread.
    ///
    /// A camera that fails to start ends the thread after logging; the
    /// session then simply never receives frames.
    pub fn start<C: CameraHandle + 'static>(
        camera: C,
        processor: FrameProcessor<W>,
        mailbox: Arc<FrameMailbox>,
        config: CaptureConfig,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            processor: Mutex::new(processor),
            latest: Mutex::new(None),
            mailbox,
            ticks: AtomicU64::new(0),
            pull_failures: AtomicU64::new(0),
        });

        let loop_shared = Arc::clone(&shared);
        let loop_config = config.clone();
        let controller = LoopController::start_with_init(
            "capture",
            move || {
                let mut camera = camera;
                camera.start()?;
                info!(serial = %camera.serial(), "Camera streaming");
                Ok(CaptureState { camera, frames: CapturedFrames::blank() })
            },
            move |state| {
                capture_tick(&loop_shared, state, &loop_config);
                LoopAction::Continue
            },
        )?;

        Ok(Self {
            shared,
            controller: Some(controller),
            config,
        })
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            ticks: self.shared.ticks.load(Ordering::SeqCst),
            pull_failures: self.shared.pull_failures.load(Ordering::SeqCst),
        }
    }

    /// The most recent full frame set, if any was captured
    pub fn latest_frames(&self) -> Option<Arc<CapturedFrames>> {
        lock(&self.shared.latest).clone()
    }

    /// Runs `f` with exclusive access to the processor.
    pub fn with_processor<R>(&self, f: impl FnOnce(&FrameProcessor<W>) -> R) -> R {
        f(&lock(&self.shared.processor))
    }

    pub fn is_capturing(&self) -> bool {
        self.controller.as_ref().map(|c| c.is_running()).unwrap_or(false)
    }

    /// Runs the configured number of batch cycles.
    pub fn run_batch(&self) -> Result<BatchReport> {
        self.run_batch_with(self.config.batch_iterations)
    }

    /// Processes the latest captured frames `iterations` times in a row,
    /// pausing `batch_delay` between cycles, after an initial `batch_settle`.
    ///
    /// Every cycle persists through the shared slot ring and publishes its
    /// pin image for display. Cycles with no captured frame yet are skipped.
    /// Frame geometry errors end the batch early.
    pub fn run_batch_with(&self, iterations: usize) -> Result<BatchReport> {
        let _span = info_span!("batch", iterations).entered();
        info!("Starting batch of {} cycles", iterations);

        thread::sleep(self.config.batch_settle);

        let mut report = BatchReport::default();
        for cycle in 0..iterations {
            if cycle > 0 && !self.config.batch_delay.is_zero() {
                thread::sleep(self.config.batch_delay);
            }

            let Some(frames) = self.latest_frames() else {
                debug!(cycle, "No frame captured yet, skipping cycle");
                report.skipped += 1;
                continue;
            };

            let pins = {
                let mut processor = lock(&self.shared.processor);
                let tick = processor.process(&frames.color, &frames.depth_raw)?;
                report.files_written += tick.written.len();
                report.persist_failures += tick.failures.len();
                report.timings.absorb(&tick.timings);
                processor.pin_image().clone()
            };
            report.cycles += 1;

            self.shared
                .mailbox
                .publish(DisplayFrames::new(frames, Some(pins)));
        }

        info!(
            cycles = report.cycles,
            skipped = report.skipped,
            written = report.files_written,
            failed = report.persist_failures,
            "Batch complete"
        );
        if report.skipped > 0 {
            warn!("{} batch cycles had no frame to process", report.skipped);
        }
        report.timings.log_summary();
        Ok(report)
    }

    /// Stops the capture thread, waiting at most `stop_timeout`, and closes
    /// the display mailbox. Returns `false` if the thread had to be detached.
    pub fn shutdown(mut self) -> bool {
        self.stop()
    }

    fn stop(&mut self) -> bool {
        let joined = match self.controller.take() {
            Some(mut controller) => controller.stop_with_timeout(self.config.stop_timeout),
            None => true,
        };
        self.shared.mailbox.close();
        let stats = self.stats();
        info!(ticks = stats.ticks, pull_failures = stats.pull_failures, joined, "Capture stopped");
        joined
    }
}

impl<W: GridWriter + Send + 'static> Drop for CaptureSession<W> {
    fn drop(&mut self) {
        if self.controller.is_some() {
            self.stop();
        }
    }
}

fn capture_tick<W: GridWriter, C: CameraHandle>(
    shared: &Shared<W>,
    state: &mut CaptureState<C>,
    config: &CaptureConfig,
) {
    let CaptureState { camera, frames } = state;
    let pulled = camera
        .color_frame(&mut frames.color, config.frame_timeout)
        .and_then(|_| camera.depth_frame_rgb32(&mut frames.depth_rgb, Duration::ZERO))
        .and_then(|_| camera.depth_frame_raw(&mut frames.depth_raw, Duration::ZERO));

    if let Err(e) = pulled {
        warn!("{}", e);
        shared.pull_failures.fetch_add(1, Ordering::SeqCst);
        thread::sleep(PULL_RETRY_DELAY);
        return;
    }
    let pins = if config.process_live {
        let mut processor = lock(&shared.processor);
        match processor.process(&frames.color, &frames.depth_raw) {
            Ok(_) => Some(processor.pin_image().clone()),
            Err(e) => {
                error!("Frame processing failed: {}", e);
                None
            }
        }
    } else {
        None
    };

    let captured = Arc::new(frames.clone());
    *lock(&shared.latest) = Some(Arc::clone(&captured));
    shared.mailbox.publish(DisplayFrames::new(captured, pins));
    // counted only once the frames are visible to readers
    shared.ticks.fetch_add(1, Ordering::SeqCst);
}
