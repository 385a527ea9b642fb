//! Snapshot types

use crate::frame_pipeline::downsample::{ColorGrid, DepthGrid};

/// Number of slots in the snapshot ring
pub const DEFAULT_SLOT_COUNT: usize = 240;

/// Which grid a snapshot file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    /// Depth grid in meters (`depthmap{slot}.csv`)
    DepthMap,
    /// Packed colour grid (`colormap{slot}.csv`)
    ColorMap,
}

impl SnapshotKind {
    pub fn file_stem(self) -> &'static str {
        match self {
            SnapshotKind::DepthMap => "depthmap",
            SnapshotKind::ColorMap => "colormap",
        }
    }

    pub fn file_name(self, slot: usize) -> String {
        format!("{}{}.csv", self.file_stem(), slot)
    }
}

/// Borrowed view of either grid kind, handed to a [`GridWriter`](super::GridWriter).
#[derive(Debug, Clone, Copy)]
pub enum GridRef<'a> {
    Depth(&'a DepthGrid),
    Color(&'a ColorGrid),
}

impl GridRef<'_> {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            GridRef::Depth(_) => SnapshotKind::DepthMap,
            GridRef::Color(_) => SnapshotKind::ColorMap,
        }
    }
}

/// Rotating slot index shared by all snapshot kinds.
///
/// Advances once per persist call, whatever the kind, and wraps from
/// `capacity - 1` back to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCounter {
    next: usize,
    capacity: usize,
}

impl SlotCounter {
    /// A zero capacity is treated as a single slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            next: 0,
            capacity: capacity.max(1),
        }
    }

    /// Slot the next persist call will write
    pub fn peek(&self) -> usize {
        self.next
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the slot to write now and moves the ring forward.
    pub fn advance(&mut self) -> usize {
        let slot = self.next;
        self.next = (self.next + 1) % self.capacity;
        slot
    }
}

impl Default for SlotCounter {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(SnapshotKind::DepthMap.file_name(0), "depthmap0.csv");
        assert_eq!(SnapshotKind::ColorMap.file_name(239), "colormap239.csv");
    }

    #[test]
    fn test_slot_ring_wraps_at_capacity() {
        let mut slots = SlotCounter::default();
        let written: Vec<usize> = (0..241).map(|_| slots.advance()).collect();
        assert_eq!(written[0], 0);
        assert_eq!(written[239], 239);
        assert_eq!(written[240], 0);
        assert_eq!(slots.peek(), 1);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut slots = SlotCounter::new(0);
        assert_eq!(slots.capacity(), 1);
        assert_eq!(slots.advance(), 0);
        assert_eq!(slots.advance(), 0);
    }
}
