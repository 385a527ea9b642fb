use std::fmt::Display;
use std::io::Write;
use tracing::debug;
use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::downsample::CoarseGrid;
use crate::frame_pipeline::snapshot::types::GridRef;
use crate::frame_pipeline::snapshot::writer::GridWriter;

/// One text line per grid row, every cell followed by a comma.
///
/// Cells use their natural `Display` form: shortest round-trip decimal for
/// meters, signed decimal for packed colours.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvGridWriter;

impl CsvGridWriter {
    fn write_rows<T: Copy + Default + Display>(grid: &CoarseGrid<T>, output: &mut dyn Write) -> Result<()> {
        for row in grid.rows() {
            for cell in row {
                write!(output, "{},", cell)?;
            }
            writeln!(output)?;
        }
        Ok(())
    }
}

impl GridWriter for CsvGridWriter {
    fn write_grid(&self, grid: GridRef<'_>, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding {:?} grid as CSV", grid.kind());

        match grid {
            GridRef::Depth(depth) => Self::write_rows(depth, output),
            GridRef::Color(color) => Self::write_rows(color, output),
        }
    }
}
