use std::time::Duration;

use tracing::info;

use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::frame::{ColorFrame, DepthFrame};

/// Enumerates and opens cameras.
pub trait CameraDriver {
    type Camera: CameraHandle + 'static;

    fn device_count(&self) -> usize;
    fn device_serial(&self, index: usize) -> Option<String>;
    fn open_camera(&self, serial: &str) -> Result<Self::Camera>;
}

/// An opened camera. Frame pulls fill caller-owned buffers at the sensor
/// resolution, blocking at most `timeout` (zero means "latest frame, no wait").
pub trait CameraHandle: Send {
    fn serial(&self) -> &str;
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn color_frame(&mut self, dest: &mut ColorFrame, timeout: Duration) -> Result<()>;
    /// Depth rendered by the driver as a 32-bit image
    fn depth_frame_rgb32(&mut self, dest: &mut ColorFrame, timeout: Duration) -> Result<()>;
    /// Raw 11-bit depth codes
    fn depth_frame_raw(&mut self, dest: &mut DepthFrame, timeout: Duration) -> Result<()>;
}

/// Opens device 0, or fails with [`PipelineError::DeviceUnavailable`] when
/// nothing is plugged in.
pub fn open_first_camera<D: CameraDriver>(driver: &D) -> Result<D::Camera> {
    let count = driver.device_count();
    if count < 1 {
        return Err(PipelineError::DeviceUnavailable);
    }
    let serial = driver
        .device_serial(0)
        .ok_or(PipelineError::DeviceUnavailable)?;
    info!(devices = count, serial = %serial, "Opening camera");
    driver.open_camera(&serial)
}
