//! Display hand-off module
//!
//! The capture side publishes ready-to-show buffers into a single-slot
//! mailbox without waiting; a display worker thread drains the mailbox into
//! a [`DisplaySink`].

mod mailbox;
mod sink;
mod tiff_preview_sink;
mod worker;

pub use mailbox::{DisplayFrames, FrameMailbox, MailboxStats, Received};
pub use sink::{DisplaySink, NullSink};
pub use tiff_preview_sink::{PreviewCompression, TiffPreviewSink};
pub use worker::DisplayWorker;
