//! Thread lifecycle for capture and display loops
//!
//! A named thread runs one closure per iteration until the closure asks to
//! stop or the owner raises the stop flag. Shutdown is cooperative and
//! bounded: the owner waits a fixed time for the thread to notice the flag
//! and otherwise leaves it to finish on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::frame_pipeline::common::error::{PipelineError, Result};

/// Wait used when a controller is dropped without an explicit stop
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(100);

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Action returned by the loop callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a loop running in its own named thread.
///
/// ```ignore
/// let mut controller = LoopController::start("capture", move || {
///     match pull_frames() {
///         Ok(frames) => publish(frames),
///         Err(e) => warn!("Frame pull failed: {}", e),
///     }
///     LoopAction::Continue
/// })?;
///
/// controller.stop_with_timeout(Duration::from_millis(100));
/// ```
pub struct LoopController {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<()>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    /// Name for logging and the thread itself
    name: String,
}

impl LoopController {
    /// Start a new loop in a separate thread
    ///
    /// The closure is called repeatedly until it returns `LoopAction::Stop`
    /// or the stop signal is raised.
    pub fn start<F>(name: &str, mut loop_fn: F) -> Result<Self>
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        Self::start_with_init(name, || Ok(()), move |_: &mut ()| loop_fn())
    }

    /// Start a loop with initialization
    ///
    /// `init_fn` runs once on the new thread to set up resources. If it
    /// fails, the thread logs the error and exits without running the loop.
    /// The state is dropped on the loop thread when the loop ends.
    pub fn start_with_init<S, I, F>(name: &str, init_fn: I, mut loop_fn: F) -> Result<Self>
    where
        S: 'static,
        I: FnOnce() -> Result<S> + Send + 'static,
        F: FnMut(&mut S) -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting loop thread");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "Loop thread started, initializing...");

                let mut state = match init_fn() {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(name = %name_clone, error = %e, "Initialization failed");
                        return;
                    }
                };

                loop {
                    if stop_signal_clone.load(Ordering::SeqCst) {
                        debug!(name = %name_clone, "Stop signal received");
                        break;
                    }

                    if loop_fn(&mut state) == LoopAction::Stop {
                        debug!(name = %name_clone, "Loop requested stop");
                        break;
                    }
                }

                info!(name = %name_clone, "Loop thread exiting");
            })
            .map_err(PipelineError::Io)?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        })
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop (non-blocking)
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Raise the stop signal and wait up to `timeout` for the thread to exit.
    ///
    /// Returns `true` when the thread was joined. On timeout the thread is
    /// detached and `false` is returned; the caller never blocks longer than
    /// `timeout` plus one poll interval.
    pub fn stop_with_timeout(&mut self, timeout: Duration) -> bool {
        self.request_stop();

        let Some(handle) = self.thread_handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(name = %self.name, ?timeout, "Loop thread did not exit in time, detaching");
                return false;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        Self::join_handle(&self.name, handle);
        true
    }

    /// Wait for the thread to finish without sending stop signal
    ///
    /// Useful if the loop stops itself via `LoopAction::Stop`.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for loop thread to finish");
            Self::join_handle(&self.name, handle);
        }
    }

    fn join_handle(name: &str, handle: JoinHandle<()>) {
        if let Err(e) = handle.join() {
            warn!(name = %name, "Loop thread panicked: {:?}", e);
        } else {
            debug!(name = %name, "Loop thread finished");
        }
    }
}

impl Drop for LoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "LoopController dropped, stopping loop");
            self.stop_with_timeout(DEFAULT_STOP_TIMEOUT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_basic_loop() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = LoopController::start("test-loop", move || {
            let count = counter_clone.fetch_add(1, Ordering::SeqCst);
            if count >= 10 {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        })
        .unwrap();

        controller.join();

        assert_eq!(counter.load(Ordering::SeqCst), 11); // 0-10 inclusive
    }

    #[test]
    fn test_stop_signal() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = LoopController::start("test-loop", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            LoopAction::Continue
        })
        .unwrap();

        thread::sleep(Duration::from_millis(50));

        assert!(controller.stop_with_timeout(Duration::from_secs(2)));
        assert!(counter.load(Ordering::SeqCst) > 0);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_stop_gives_up_after_timeout() {
        let mut controller = LoopController::start("test-stuck", || {
            thread::sleep(Duration::from_millis(500));
            LoopAction::Continue
        })
        .unwrap();

        // give the thread time to enter its first long iteration
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        let joined = controller.stop_with_timeout(Duration::from_millis(50));

        assert!(!joined);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_with_init() {
        let result = Arc::new(AtomicU32::new(0));
        let result_clone = Arc::clone(&result);

        let mut controller = LoopController::start_with_init(
            "test-init-loop",
            || Ok(42u32),
            move |state| {
                result_clone.store(*state, Ordering::SeqCst);
                LoopAction::Stop
            },
        )
        .unwrap();

        controller.join();
        assert_eq!(result.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_init_failure() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        let mut controller = LoopController::start_with_init(
            "test-fail-init",
            || Err::<(), _>(PipelineError::DeviceUnavailable),
            move |_: &mut ()| {
                ran_clone.store(true, Ordering::SeqCst);
                LoopAction::Stop
            },
        )
        .unwrap();

        controller.join();
        assert!(!ran.load(Ordering::SeqCst));
    }
}
