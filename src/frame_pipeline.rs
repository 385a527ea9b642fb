//! Frame processing pipeline module
//!
//! Turns 640x480 colour and raw depth frames from a Kinect-style camera into
//! 64x48 coarse grids, a block-replicated pin preview, and rotating CSV
//! snapshots, with the capture thread and display hand-off around them.

pub mod frame;
pub mod depth;
pub mod downsample;
pub mod snapshot;
pub mod device;
pub mod display;
pub mod capture;
pub mod common;

pub use common::{
    PipelineError,
    Result,
};

pub use frame::{
    ColorFrame,
    DepthFrame,
};

pub use depth::meters_from_raw;

pub use downsample::{
    BlockSampler,
    CoarseGrid,
    ColorGrid,
    DepthGrid,
};

pub use snapshot::{
    CsvGridWriter,
    GridRef,
    GridWriter,
    SlotCounter,
    SnapshotKind,
    SnapshotPersister,
};

pub use device::{
    open_first_camera,
    CameraDriver,
    CameraHandle,
    SyntheticDriver,
};

pub use display::{
    DisplayFrames,
    DisplaySink,
    DisplayWorker,
    FrameMailbox,
    NullSink,
    PreviewCompression,
    TiffPreviewSink,
};

pub use capture::{
    BatchReport,
    CaptureConfig,
    CaptureSession,
    FrameProcessor,
};
