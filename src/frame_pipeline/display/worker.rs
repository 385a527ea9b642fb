use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::frame_pipeline::capture::{LoopAction, LoopController};
use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::display::{
    mailbox::{FrameMailbox, Received},
    sink::DisplaySink,
};

/// How long the display thread waits before re-checking its stop flag
const WAIT_INTERVAL: Duration = Duration::from_millis(50);

/// Thread that repaints a sink from the mailbox.
pub struct DisplayWorker {
    controller: LoopController,
    mailbox: Arc<FrameMailbox>,
}

impl DisplayWorker {
    pub fn spawn<S: DisplaySink + 'static>(mailbox: Arc<FrameMailbox>, mut sink: S) -> Result<Self> {
        let source = Arc::clone(&mailbox);
        let controller = LoopController::start("display", move || {
            match source.wait_take(WAIT_INTERVAL) {
                Received::Frames(frames) => {
                    if let Err(e) = sink.present(&frames) {
                        warn!("Display refresh failed: {}", e);
                    }
                    LoopAction::Continue
                }
                Received::Timeout => LoopAction::Continue,
                Received::Closed => LoopAction::Stop,
            }
        })?;

        Ok(Self { controller, mailbox })
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Closes the mailbox and waits up to `timeout` for the thread.
    pub fn stop(mut self, timeout: Duration) -> bool {
        self.mailbox.close();
        self.controller.stop_with_timeout(timeout)
    }
}
