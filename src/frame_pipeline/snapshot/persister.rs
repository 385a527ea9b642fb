use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::snapshot::{
    csv_grid_writer::CsvGridWriter,
    types::{GridRef, SlotCounter},
    writer::GridWriter,
};

/// Writes grids as `{kind}{slot}.csv` into a fixed directory.
///
/// The directory must already exist; it is never created here.
pub struct SnapshotPersister<W: GridWriter = CsvGridWriter> {
    writer: W,
    directory: PathBuf,
}

impl SnapshotPersister<CsvGridWriter> {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            writer: CsvGridWriter,
            directory: directory.into(),
        }
    }
}

impl<W: GridWriter> SnapshotPersister<W> {
    pub fn with_writer<P: Into<PathBuf>>(writer: W, directory: P) -> Self {
        Self {
            writer,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `grid` into the next slot and returns the file path.
    ///
    /// The slot counter moves forward even when the write fails, so one bad
    /// path never pins the ring.
    #[instrument(skip(self, grid, slots), fields(kind = ?grid.kind()))]
    pub fn persist(&self, grid: GridRef<'_>, slots: &mut SlotCounter) -> Result<PathBuf> {
        let slot = slots.advance();
        let path = self.directory.join(grid.kind().file_name(slot));

        let file = File::create(&path).map_err(|source| PipelineError::Persistence {
            path: path.clone(),
            source,
        })?;
        let mut output = BufWriter::new(file);

        let written = self
            .writer
            .write_grid(grid, &mut output)
            .and_then(|_| output.flush().map_err(PipelineError::from));
        if let Err(err) = written {
            return Err(match err {
                PipelineError::Io(source) => PipelineError::Persistence { path, source },
                other => other,
            });
        }

        debug!(slot, path = %path.display(), "Snapshot written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;
    use std::str::FromStr;

    use crate::frame_pipeline::downsample::{ColorGrid, DepthGrid};
    use crate::frame_pipeline::frame::{GRID_COLS, GRID_ROWS};

    struct FailingWriter;

    impl GridWriter for FailingWriter {
        fn write_grid(&self, _grid: GridRef<'_>, _output: &mut dyn Write) -> Result<()> {
            Err(PipelineError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_persist_writes_named_slot_file() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let mut slots = SlotCounter::default();

        let grid = DepthGrid::filled(0.5);
        let path = persister.persist(GridRef::Depth(&grid), &mut slots).unwrap();

        assert_eq!(path, dir.path().join("depthmap0.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 48);
        assert_eq!(text.lines().next().unwrap(), "0.5,".repeat(64));
    }

    fn read_cells<T: FromStr>(path: &Path) -> Vec<Vec<T>>
    where
        T::Err: Debug,
    {
        let text = std::fs::read_to_string(path).unwrap();
        text.lines()
            .map(|line| {
                let fields: Vec<&str> = line.split(',').collect();
                assert_eq!(fields.last(), Some(&""), "row must end with a comma");
                fields[..fields.len() - 1].iter().map(|f| f.parse().unwrap()).collect()
            })
            .collect()
    }

    #[test]
    fn test_persisted_grids_read_back_cell_for_cell() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let mut slots = SlotCounter::default();

        let mut depth = DepthGrid::new();
        let mut color = ColorGrid::new();
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                depth.set(col, row, col as f32 * 0.25 + row as f32 / 7.0);
                color.set(col, row, (col * 100 + row) as i32 - 2000);
            }
        }

        let depth_path = persister.persist(GridRef::Depth(&depth), &mut slots).unwrap();
        let color_path = persister.persist(GridRef::Color(&color), &mut slots).unwrap();
        assert_eq!(depth_path, persister.directory().join("depthmap0.csv"));
        assert_eq!(color_path, persister.directory().join("colormap1.csv"));

        let depth_cells: Vec<Vec<f32>> = read_cells(&depth_path);
        let color_cells: Vec<Vec<i32>> = read_cells(&color_path);
        assert_eq!(depth_cells.len(), GRID_ROWS);
        assert_eq!(color_cells.len(), GRID_ROWS);
        for row in 0..GRID_ROWS {
            assert_eq!(depth_cells[row].len(), GRID_COLS);
            assert_eq!(color_cells[row].len(), GRID_COLS);
            for col in 0..GRID_COLS {
                assert_eq!(depth_cells[row][col].to_bits(), depth[(col, row)].to_bits(), "depth ({}, {})", col, row);
                assert_eq!(color_cells[row][col], color[(col, row)], "color ({}, {})", col, row);
            }
        }
    }

    #[test]
    fn test_kinds_share_one_ring() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let mut slots = SlotCounter::default();

        let depth = DepthGrid::new();
        let color = ColorGrid::new();
        persister.persist(GridRef::Depth(&depth), &mut slots).unwrap();
        persister.persist(GridRef::Color(&color), &mut slots).unwrap();
        persister.persist(GridRef::Depth(&depth), &mut slots).unwrap();

        assert!(dir.path().join("depthmap0.csv").exists());
        assert!(dir.path().join("colormap1.csv").exists());
        assert!(dir.path().join("depthmap2.csv").exists());
        assert!(!dir.path().join("colormap0.csv").exists());
        assert_eq!(slots.peek(), 3);
    }

    #[test]
    fn test_241st_call_overwrites_slot_zero() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let mut slots = SlotCounter::default();

        let first = DepthGrid::filled(1.0);
        persister.persist(GridRef::Depth(&first), &mut slots).unwrap();
        let filler = DepthGrid::filled(2.0);
        for _ in 1..240 {
            persister.persist(GridRef::Depth(&filler), &mut slots).unwrap();
        }
        let last = DepthGrid::filled(3.0);
        let path = persister.persist(GridRef::Depth(&last), &mut slots).unwrap();

        assert_eq!(path.file_name().unwrap(), "depthmap0.csv");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 240);
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("3,"));
    }

    #[test]
    fn test_missing_directory_reports_and_still_advances() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path().join("Depth"));
        let mut slots = SlotCounter::default();

        let grid = DepthGrid::new();
        let result = persister.persist(GridRef::Depth(&grid), &mut slots);

        match result {
            Err(PipelineError::Persistence { path, .. }) => {
                assert_eq!(path, dir.path().join("Depth").join("depthmap0.csv"));
            }
            other => panic!("expected persistence error, got {:?}", other),
        }
        assert_eq!(slots.peek(), 1);
        assert!(!dir.path().join("Depth").exists());
    }

    #[test]
    fn test_writer_io_failure_becomes_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::with_writer(FailingWriter, dir.path());
        let mut slots = SlotCounter::new(4);

        let grid = ColorGrid::new();
        let result = persister.persist(GridRef::Color(&grid), &mut slots);

        assert!(matches!(result, Err(PipelineError::Persistence { .. })));
        assert_eq!(slots.peek(), 1);
    }
}
