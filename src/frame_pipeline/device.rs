//! Camera device module
//!
//! The driver interface the pipeline consumes, plus a synthetic camera that
//! produces a deterministic test pattern when no hardware is attached.

mod driver;
mod synthetic;

pub use driver::{open_first_camera, CameraDriver, CameraHandle};
pub use synthetic::{SyntheticCamera, SyntheticDriver};
