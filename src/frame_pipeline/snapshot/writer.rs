use std::io::Write;
use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::snapshot::types::GridRef;

pub trait GridWriter {
    fn write_grid(&self, grid: GridRef<'_>, output: &mut dyn Write) -> Result<()>;
}
