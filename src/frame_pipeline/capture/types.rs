//! Capture configuration and report types

use std::path::PathBuf;
use std::time::Duration;

use crate::frame_pipeline::capture::timing::TickTimings;
use crate::frame_pipeline::common::error::PipelineError;
use crate::frame_pipeline::frame::{ColorFrame, DepthFrame};
use crate::frame_pipeline::snapshot::DEFAULT_SLOT_COUNT;

/// Folder under the desktop that receives snapshot files
pub const SNAPSHOT_FOLDER: &str = "Depth";

/// `<desktop>/Depth`, falling back to the home directory, then the working directory.
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SNAPSHOT_FOLDER)
}

/// Configuration for capture, processing and snapshot persistence
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Directory snapshots are written into; must already exist
    pub output_dir: PathBuf,
    /// Size of the snapshot slot ring
    pub slot_count: usize,
    /// Cycles run by one manual batch
    pub batch_iterations: usize,
    /// Pause between batch cycles
    pub batch_delay: Duration,
    /// Pause before the first batch cycle
    pub batch_settle: Duration,
    /// Timeout for the colour frame pull; depth pulls take the latest frame
    pub frame_timeout: Duration,
    /// Bounded wait for the capture thread on shutdown
    pub stop_timeout: Duration,
    /// Whether the live loop also processes and persists every tick
    pub process_live: bool,
    /// Whether snapshots are written at all
    pub persist: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            slot_count: DEFAULT_SLOT_COUNT,
            batch_iterations: 240,
            batch_delay: Duration::from_millis(66),
            batch_settle: Duration::from_millis(250),
            frame_timeout: Duration::from_millis(500),
            stop_timeout: Duration::from_millis(100),
            process_live: false,
            persist: true,
        }
    }
}

impl CaptureConfig {
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }
}

/// Builder for CaptureConfig
#[derive(Default)]
pub struct CaptureConfigBuilder {
    output_dir: Option<PathBuf>,
    slot_count: Option<usize>,
    batch_iterations: Option<usize>,
    batch_delay: Option<Duration>,
    batch_settle: Option<Duration>,
    frame_timeout: Option<Duration>,
    stop_timeout: Option<Duration>,
    process_live: Option<bool>,
    persist: Option<bool>,
}

impl CaptureConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn slot_count(mut self, slots: usize) -> Self {
        self.slot_count = Some(slots);
        self
    }

    pub fn batch_iterations(mut self, iterations: usize) -> Self {
        self.batch_iterations = Some(iterations);
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn batch_settle(mut self, settle: Duration) -> Self {
        self.batch_settle = Some(settle);
        self
    }

    pub fn frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = Some(timeout);
        self
    }

    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = Some(timeout);
        self
    }

    pub fn process_live(mut self, enable: bool) -> Self {
        self.process_live = Some(enable);
        self
    }

    pub fn persist(mut self, enable: bool) -> Self {
        self.persist = Some(enable);
        self
    }

    pub fn build(self) -> CaptureConfig {
        let default = CaptureConfig::default();
        CaptureConfig {
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            slot_count: self.slot_count.unwrap_or(default.slot_count),
            batch_iterations: self.batch_iterations.unwrap_or(default.batch_iterations),
            batch_delay: self.batch_delay.unwrap_or(default.batch_delay),
            batch_settle: self.batch_settle.unwrap_or(default.batch_settle),
            frame_timeout: self.frame_timeout.unwrap_or(default.frame_timeout),
            stop_timeout: self.stop_timeout.unwrap_or(default.stop_timeout),
            process_live: self.process_live.unwrap_or(default.process_live),
            persist: self.persist.unwrap_or(default.persist),
        }
    }
}

/// One full set of frames pulled from the camera in a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrames {
    pub color: ColorFrame,
    /// Depth as rendered by the driver
    pub depth_rgb: ColorFrame,
    pub depth_raw: DepthFrame,
}

impl CapturedFrames {
    pub fn blank() -> Self {
        Self {
            color: ColorFrame::blank(),
            depth_rgb: ColorFrame::blank(),
            depth_raw: DepthFrame::blank(),
        }
    }
}

/// Outcome of one processing tick
#[derive(Debug, Default)]
pub struct TickReport {
    /// Snapshot files written, depth first
    pub written: Vec<PathBuf>,
    /// Persistence failures; they never abort the tick
    pub failures: Vec<PipelineError>,
    pub timings: TickTimings,
}

/// Outcome of a manual batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Cycles that processed a frame set
    pub cycles: usize,
    /// Cycles skipped because no frame had been captured yet
    pub skipped: usize,
    pub files_written: usize,
    pub persist_failures: usize,
    pub timings: TickTimings,
}
