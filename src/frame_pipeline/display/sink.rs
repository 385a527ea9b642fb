use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::display::mailbox::DisplayFrames;

/// A surface that repaints from the latest published buffers.
pub trait DisplaySink: Send {
    fn present(&mut self, frames: &DisplayFrames) -> Result<()>;
}

/// Discards frames, counting how many were presented.
#[derive(Debug, Default)]
pub struct NullSink {
    pub presented: u64,
}

impl DisplaySink for NullSink {
    fn present(&mut self, _frames: &DisplayFrames) -> Result<()> {
        self.presented += 1;
        Ok(())
    }
}
