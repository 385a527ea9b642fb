//! Frame buffer types

use crate::frame_pipeline::common::error::{PipelineError, Result};

/// Sensor frame width in pixels
pub const FRAME_WIDTH: usize = 640;
/// Sensor frame height in pixels
pub const FRAME_HEIGHT: usize = 480;
/// Bytes per colour pixel (three channels plus one unused/alpha byte)
pub const COLOR_CHANNELS: usize = 4;
/// Edge length of the square source block behind one coarse grid cell
pub const BLOCK_SIZE: usize = 10;
/// Coarse grid columns (`FRAME_WIDTH / BLOCK_SIZE`)
pub const GRID_COLS: usize = FRAME_WIDTH / BLOCK_SIZE;
/// Coarse grid rows (`FRAME_HEIGHT / BLOCK_SIZE`)
pub const GRID_ROWS: usize = FRAME_HEIGHT / BLOCK_SIZE;

/// Row-major 32-bit colour frame.
///
/// The byte order inside a pixel is whatever the driver delivered
/// (typically B, G, R, unused) and is never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ColorFrame {
    /// Wraps `data`, checking it holds exactly `width * height` pixels.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected_len = width * height * COLOR_CHANNELS;
        if data.len() != expected_len {
            return Err(PipelineError::InvalidBuffer {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Zero-filled frame at the sensor resolution.
    pub fn blank() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            data: vec![0u8; FRAME_WIDTH * FRAME_HEIGHT * COLOR_CHANNELS],
        }
    }

    /// Width in pixels; fixed for the life of the frame
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width * COLOR_CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the 4 bytes of pixel (x, y), or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; COLOR_CHANNELS]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y * self.stride() + x * COLOR_CHANNELS;
        let bytes = self.data.get(offset..offset + COLOR_CHANNELS)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: [u8; COLOR_CHANNELS]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y * self.stride() + x * COLOR_CHANNELS;
        self.data[offset..offset + COLOR_CHANNELS].copy_from_slice(&value);
    }
}

/// Row-major frame of raw 11-bit depth codes, one `u16` per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFrame {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(PipelineError::InvalidBuffer {
                expected_len: expected * 2,
                actual_len: data.len() * 2,
            });
        }
        Ok(Self { width, height, data })
    }

    /// Decodes the driver's 2-byte little-endian sample stream.
    pub fn from_le_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let expected_len = width * height * 2;
        if bytes.len() != expected_len {
            return Err(PipelineError::InvalidBuffer {
                expected_len,
                actual_len: bytes.len(),
            });
        }
        let data = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { width, height, data })
    }

    pub fn blank() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            data: vec![0u16; FRAME_WIDTH * FRAME_HEIGHT],
        }
    }

    /// Constant-code frame at the sensor resolution.
    pub fn filled(raw_code: u16) -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            data: vec![raw_code; FRAME_WIDTH * FRAME_HEIGHT],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u16] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    pub fn sample(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}
