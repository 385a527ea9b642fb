use tracing::trace;

use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::depth::meters_from_raw;
use crate::frame_pipeline::downsample::grid::{ColorGrid, DepthGrid};
use crate::frame_pipeline::frame::{
    ColorFrame, DepthFrame, BLOCK_SIZE, COLOR_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH, GRID_COLS,
    GRID_ROWS,
};

/// Alpha written into every pin image pixel
const PIN_ALPHA: u8 = 255;

/// Nearest-sample downscaler from 640x480 frames to the 64x48 grid.
///
/// Grid cell `(col, row)` always reads the top-left pixel of its source
/// block, `(x, y) = (col * BLOCK_SIZE, row * BLOCK_SIZE)`, for both depth and
/// colour. No averaging and no interpolation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockSampler;

impl BlockSampler {
    pub fn new() -> Self {
        Self
    }

    fn check_dimensions(what: &'static str, width: usize, height: usize) -> Result<()> {
        if width != FRAME_WIDTH || height != FRAME_HEIGHT {
            return Err(PipelineError::dimensions(
                what,
                (FRAME_WIDTH, FRAME_HEIGHT),
                (width, height),
            ));
        }
        Ok(())
    }

    /// Decodes one raw sample per block into meters.
    pub fn sample_depth(&self, frame: &DepthFrame, grid: &mut DepthGrid) -> Result<()> {
        Self::check_dimensions("depth frame", frame.width(), frame.height())?;
        trace!("Sampling depth frame onto {}x{} grid", GRID_COLS, GRID_ROWS);

        let samples = frame.samples();
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let raw = samples[row * BLOCK_SIZE * FRAME_WIDTH + col * BLOCK_SIZE];
                grid.set(col, row, meters_from_raw(raw));
            }
        }
        Ok(())
    }

    /// Samples one pixel per block into `grid` and magnifies it back into
    /// `pins`, filling each 10x10 block with that pixel at full alpha.
    pub fn sample_color(
        &self,
        frame: &ColorFrame,
        grid: &mut ColorGrid,
        pins: &mut ColorFrame,
    ) -> Result<()> {
        Self::check_dimensions("color frame", frame.width(), frame.height())?;
        Self::check_dimensions("pin image", pins.width(), pins.height())?;
        trace!("Sampling color frame onto {}x{} grid", GRID_COLS, GRID_ROWS);

        let stride = frame.stride();
        let block_row_bytes = BLOCK_SIZE * COLOR_CHANNELS;
        let source = frame.as_bytes();
        let dest = pins.as_bytes_mut();

        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let offset = row * stride * BLOCK_SIZE + col * block_row_bytes;
                let sample = [
                    source[offset],
                    source[offset + 1],
                    source[offset + 2],
                    source[offset + 3],
                ];
                grid.set(col, row, i32::from_le_bytes(sample));

                let pin = [sample[0], sample[1], sample[2], PIN_ALPHA];
                for yoff in 0..BLOCK_SIZE {
                    let start = (row * BLOCK_SIZE + yoff) * stride + col * block_row_bytes;
                    dest[start..start + block_row_bytes]
                        .chunks_exact_mut(COLOR_CHANNELS)
                        .for_each(|pixel| pixel.copy_from_slice(&pin));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_pattern() -> ColorFrame {
        let mut frame = ColorFrame::blank();
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                frame.set_pixel(col * BLOCK_SIZE, row * BLOCK_SIZE, [col as u8, row as u8, 7, 0]);
                // off-sample pixels never leak into the grid
                frame.set_pixel(col * BLOCK_SIZE + 1, row * BLOCK_SIZE + 1, [9, 9, 9, 9]);
            }
        }
        frame
    }

    #[test]
    fn test_constant_depth_frame_gives_uniform_grid() {
        let sampler = BlockSampler::new();
        for raw in [0u16, 512, 1000, 2047] {
            let mut grid = DepthGrid::new();
            sampler.sample_depth(&DepthFrame::filled(raw), &mut grid).unwrap();
            let expected = meters_from_raw(raw);
            assert!(grid.cells().iter().all(|&m| m == expected));
        }
    }

    #[test]
    fn test_zero_depth_bytes_give_0_3002_meters() {
        let frame = DepthFrame::from_le_bytes(640, 480, &vec![0u8; 640 * 480 * 2]).unwrap();
        let mut grid = DepthGrid::filled(-1.0);
        BlockSampler::new().sample_depth(&frame, &mut grid).unwrap();
        assert!(grid.cells().iter().all(|&m| (m - 0.3002).abs() < 1e-4));
    }

    #[test]
    fn test_depth_reads_block_top_left() {
        let mut frame = DepthFrame::filled(2047);
        let (col, row) = (13, 40);
        frame.samples_mut()[row * BLOCK_SIZE * FRAME_WIDTH + col * BLOCK_SIZE] = 700;
        let mut grid = DepthGrid::new();
        BlockSampler::new().sample_depth(&frame, &mut grid).unwrap();
        assert_eq!(grid[(col, row)], meters_from_raw(700));
        assert_eq!(grid[(col + 1, row)], 0.0);
        assert_eq!(grid[(col, row - 1)], 0.0);
    }

    #[test]
    fn test_color_grid_holds_packed_sample() {
        let frame = block_pattern();
        let mut grid = ColorGrid::new();
        let mut pins = ColorFrame::blank();
        BlockSampler::new().sample_color(&frame, &mut grid, &mut pins).unwrap();

        assert_eq!(grid[(0, 0)], i32::from_le_bytes([0, 0, 7, 0]));
        assert_eq!(grid[(63, 47)], i32::from_le_bytes([63, 47, 7, 0]));
        assert_eq!(grid[(5, 2)], i32::from_le_bytes([5, 2, 7, 0]));
    }

    #[test]
    fn test_pin_block_replicates_sample_with_full_alpha() {
        let frame = block_pattern();
        let mut grid = ColorGrid::new();
        let mut pins = ColorFrame::blank();
        BlockSampler::new().sample_color(&frame, &mut grid, &mut pins).unwrap();

        let (col, row) = (21, 17);
        for y in row * BLOCK_SIZE..(row + 1) * BLOCK_SIZE {
            for x in col * BLOCK_SIZE..(col + 1) * BLOCK_SIZE {
                assert_eq!(pins.pixel(x, y), Some([col as u8, row as u8, 7, 255]));
            }
        }
    }

    #[test]
    fn test_alpha_in_grid_is_kept_from_source() {
        let mut frame = ColorFrame::blank();
        frame.set_pixel(0, 0, [1, 2, 3, 0x80]);
        let mut grid = ColorGrid::new();
        let mut pins = ColorFrame::blank();
        BlockSampler::new().sample_color(&frame, &mut grid, &mut pins).unwrap();
        assert_eq!(grid[(0, 0)], i32::from_le_bytes([1, 2, 3, 0x80]));
        assert_eq!(pins.pixel(9, 9), Some([1, 2, 3, 255]));
    }

    #[test]
    fn test_wrong_resolution_is_configuration_mismatch() {
        let frame = DepthFrame::new(320, 240, vec![0; 320 * 240]).unwrap();
        let mut grid = DepthGrid::new();
        let result = BlockSampler::new().sample_depth(&frame, &mut grid);
        assert!(matches!(
            result,
            Err(PipelineError::ConfigurationMismatch { what: "depth frame", .. })
        ));

        let color = ColorFrame::blank();
        let mut small_pins = ColorFrame::new(64, 48, vec![0; 64 * 48 * 4]).unwrap();
        let result = BlockSampler::new().sample_color(&color, &mut ColorGrid::new(), &mut small_pins);
        assert!(matches!(
            result,
            Err(PipelineError::ConfigurationMismatch { what: "pin image", .. })
        ));
    }

    #[test]
    fn test_tiny_color_frame_is_rejected_before_indexing() {
        let tiny = ColorFrame::new(1, 1, vec![0; COLOR_CHANNELS]).unwrap();
        let mut grid = ColorGrid::filled(7);
        let mut pins = ColorFrame::blank();
        let result = BlockSampler::new().sample_color(&tiny, &mut grid, &mut pins);

        match result {
            Err(PipelineError::ConfigurationMismatch { what, actual, .. }) => {
                assert_eq!(what, "color frame");
                assert_eq!(actual, "1x1");
            }
            other => panic!("expected configuration mismatch, got {:?}", other),
        }
        assert_eq!(grid, ColorGrid::filled(7));
    }
}
