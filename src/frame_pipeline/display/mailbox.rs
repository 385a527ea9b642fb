use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

use crate::frame_pipeline::capture::CapturedFrames;
use crate::frame_pipeline::frame::{ColorFrame, DepthFrame};

/// Buffers handed to the display surface.
///
/// The captured frames are shared with the session's latest-frame store,
/// not copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrames {
    captured: Arc<CapturedFrames>,
    /// Pin preview, present when this frame set was processed
    pub pins: Option<ColorFrame>,
}

impl DisplayFrames {
    pub fn new(captured: Arc<CapturedFrames>, pins: Option<ColorFrame>) -> Self {
        Self { captured, pins }
    }

    /// Colour frame, bytes as delivered by the driver
    pub fn color(&self) -> &ColorFrame {
        &self.captured.color
    }

    /// Driver-rendered depth image
    pub fn depth_rgb(&self) -> &ColorFrame {
        &self.captured.depth_rgb
    }

    /// Greyscale depth where each value is the raw sensor code
    pub fn depth_gray(&self) -> &DepthFrame {
        &self.captured.depth_raw
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MailboxStats {
    pub published: u64,
    /// Publishes that replaced a frame set nobody had taken yet
    pub coalesced: u64,
    pub taken: u64,
}

/// Result of waiting on the mailbox
#[derive(Debug)]
pub enum Received {
    Frames(Box<DisplayFrames>),
    Timeout,
    Closed,
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<DisplayFrames>,
    closed: bool,
    stats: MailboxStats,
}

/// Single-slot "latest frame" mailbox with a wake signal.
///
/// At most one frame set is ever pending: publishing over an untaken set
/// replaces it, so a slow consumer never builds up a backlog. Publishing
/// never waits for the consumer.
#[derive(Debug, Default)]
pub struct FrameMailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `frames` as the pending set. Returns `true` if an untaken set
    /// was replaced. Publishing into a closed mailbox drops the frames.
    pub fn publish(&self, frames: DisplayFrames) -> bool {
        let mut slot = self.lock();
        if slot.closed {
            return false;
        }
        let replaced = slot.pending.replace(frames).is_some();
        slot.stats.published += 1;
        if replaced {
            slot.stats.coalesced += 1;
            trace!("Display frame coalesced");
        }
        drop(slot);
        self.ready.notify_one();
        replaced
    }

    /// Takes the pending set without waiting.
    pub fn try_take(&self) -> Option<DisplayFrames> {
        let mut slot = self.lock();
        let frames = slot.pending.take();
        if frames.is_some() {
            slot.stats.taken += 1;
        }
        frames
    }

    /// Waits up to `timeout` for a frame set.
    pub fn wait_take(&self, timeout: Duration) -> Received {
        let slot = self.lock();
        let (mut slot, _) = self
            .ready
            .wait_timeout_while(slot, timeout, |s| s.pending.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);

        match slot.pending.take() {
            Some(frames) => {
                slot.stats.taken += 1;
                Received::Frames(Box::new(frames))
            }
            None if slot.closed => Received::Closed,
            None => Received::Timeout,
        }
    }

    /// Wakes any waiter; later publishes are dropped. A pending set can
    /// still be taken.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn stats(&self) -> MailboxStats {
        self.lock().stats
    }
}
