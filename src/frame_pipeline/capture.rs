//! Capture module
//!
//! Drives frame acquisition on its own thread and runs the decode,
//! downsample and persist stages either every tick or in manual batches.

mod frame_loop;
mod processor;
mod session;
mod timing;
pub mod types;


pub use frame_loop::{LoopAction, LoopController, DEFAULT_STOP_TIMEOUT};
pub use processor::FrameProcessor;
pub use session::{CaptureSession, SessionStats};
pub use timing::{StepTiming, TickTimings, Timer};
pub use types::{
    default_output_dir, BatchReport, CaptureConfig, CaptureConfigBuilder, CapturedFrames,
    TickReport, SNAPSHOT_FOLDER,
};
