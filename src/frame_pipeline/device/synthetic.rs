use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::depth::NO_RETURN_CODE;
use crate::frame_pipeline::device::driver::{CameraDriver, CameraHandle};
use crate::frame_pipeline::frame::{ColorFrame, DepthFrame, FRAME_HEIGHT, FRAME_WIDTH};

/// Rows at the bottom of the synthetic depth frame that report no return
const NO_RETURN_ROWS: usize = 40;
/// Lowest raw code in the synthetic depth ramp
const RAMP_BASE_CODE: u16 = 400;

/// Driver exposing `devices` synthetic cameras.
#[derive(Debug, Clone)]
pub struct SyntheticDriver {
    devices: usize,
    frame_interval: Duration,
}

impl SyntheticDriver {
    pub fn new(devices: usize, frame_interval: Duration) -> Self {
        Self { devices, frame_interval }
    }
}

impl Default for SyntheticDriver {
    /// One camera at roughly 30 frames per second
    fn default() -> Self {
        Self::new(1, Duration::from_millis(33))
    }
}

impl CameraDriver for SyntheticDriver {
    type Camera = SyntheticCamera;

    fn device_count(&self) -> usize {
        self.devices
    }

    fn device_serial(&self, index: usize) -> Option<String> {
        (index < self.devices).then(|| format!("SYNTH{:04}", index))
    }

    fn open_camera(&self, serial: &str) -> Result<SyntheticCamera> {
        let known = (0..self.devices).any(|i| self.device_serial(i).as_deref() == Some(serial));
        if !known {
            return Err(PipelineError::DeviceUnavailable);
        }
        Ok(SyntheticCamera {
            serial: serial.to_string(),
            frame_interval: self.frame_interval,
            started: false,
            frame_number: 0,
            last_frame: None,
        })
    }
}

/// Moving colour gradient and a horizontal depth ramp, advanced once per
/// colour frame.
#[derive(Debug)]
pub struct SyntheticCamera {
    serial: String,
    frame_interval: Duration,
    started: bool,
    frame_number: u64,
    last_frame: Option<Instant>,
}

impl SyntheticCamera {
    fn ensure_streaming(&self) -> Result<()> {
        if !self.started {
            return Err(PipelineError::DeviceIo(format!("camera {} not started", self.serial)));
        }
        Ok(())
    }

    fn check_dest(what: &'static str, width: usize, height: usize) -> Result<()> {
        if width != FRAME_WIDTH || height != FRAME_HEIGHT {
            return Err(PipelineError::dimensions(what, (FRAME_WIDTH, FRAME_HEIGHT), (width, height)));
        }
        Ok(())
    }

    /// Waits out the rest of the frame interval, but never past `timeout`.
    fn pace(&mut self, timeout: Duration) {
        if let Some(last) = self.last_frame {
            let remaining = self.frame_interval.saturating_sub(last.elapsed());
            thread::sleep(remaining.min(timeout));
        }
        self.last_frame = Some(Instant::now());
    }

    fn raw_code(&self, x: usize, y: usize) -> u16 {
        if y >= FRAME_HEIGHT - NO_RETURN_ROWS {
            return NO_RETURN_CODE;
        }
        let shift = (self.frame_number % FRAME_WIDTH as u64) as usize;
        RAMP_BASE_CODE + ((x + shift) % FRAME_WIDTH) as u16
    }
}

impl CameraHandle for SyntheticCamera {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn start(&mut self) -> Result<()> {
        debug!(serial = %self.serial, "Starting synthetic camera");
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        debug!(serial = %self.serial, "Stopping synthetic camera");
        self.started = false;
        Ok(())
    }

    fn color_frame(&mut self, dest: &mut ColorFrame, timeout: Duration) -> Result<()> {
        self.ensure_streaming()?;
        Self::check_dest("color frame", dest.width(), dest.height())?;
        self.pace(timeout);
        self.frame_number += 1;

        let shift = self.frame_number as usize;
        for (i, pixel) in dest.as_bytes_mut().chunks_exact_mut(4).enumerate() {
            let (x, y) = (i % FRAME_WIDTH, i / FRAME_WIDTH);
            pixel.copy_from_slice(&[(x + shift) as u8, y as u8, (x ^ y) as u8, 0]);
        }
        Ok(())
    }

    fn depth_frame_rgb32(&mut self, dest: &mut ColorFrame, _timeout: Duration) -> Result<()> {
        self.ensure_streaming()?;
        Self::check_dest("depth image", dest.width(), dest.height())?;

        for (i, pixel) in dest.as_bytes_mut().chunks_exact_mut(4).enumerate() {
            let code = self.raw_code(i % FRAME_WIDTH, i / FRAME_WIDTH);
            let level = if code >= NO_RETURN_CODE { 0 } else { (code >> 3) as u8 };
            pixel.copy_from_slice(&[level, level, level, 0]);
        }
        Ok(())
    }

    fn depth_frame_raw(&mut self, dest: &mut DepthFrame, _timeout: Duration) -> Result<()> {
        self.ensure_streaming()?;
        Self::check_dest("depth frame", dest.width(), dest.height())?;

        for (i, sample) in dest.samples_mut().iter_mut().enumerate() {
            *sample = self.raw_code(i % FRAME_WIDTH, i / FRAME_WIDTH);
        }
        Ok(())
    }
}
