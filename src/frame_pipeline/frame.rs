//! Frame buffer module
//!
//! Owned, length-checked frame buffers at the sensor's fixed resolution and
//! the layout constants every other stage derives its geometry from.

pub mod types;

pub use types::{
    ColorFrame, DepthFrame, BLOCK_SIZE, COLOR_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH, GRID_COLS,
    GRID_ROWS,
};
