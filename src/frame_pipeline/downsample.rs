//! Frame downsampling module
//!
//! Point-samples full-resolution frames onto the fixed 64x48 coarse grid and
//! builds the block-replicated pin preview.

pub mod grid;
mod sampler;

pub use grid::{CoarseGrid, ColorGrid, DepthGrid};
pub use sampler::BlockSampler;
