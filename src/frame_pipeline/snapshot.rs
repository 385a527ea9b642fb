//! Snapshot persistence module
//!
//! Writes coarse grids to delimited text files, rotating through a bounded
//! ring of slot numbers shared by every grid kind.

mod writer;
mod csv_grid_writer;
mod persister;
pub mod types;

pub use writer::GridWriter;
pub use csv_grid_writer::CsvGridWriter;
pub use persister::SnapshotPersister;
pub use types::{GridRef, SlotCounter, SnapshotKind, DEFAULT_SLOT_COUNT};
