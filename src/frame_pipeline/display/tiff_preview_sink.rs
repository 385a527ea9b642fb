use std::path::{Path, PathBuf};
use tracing::debug;
use crate::frame_pipeline::common::error::{Result, PipelineError};
use crate::frame_pipeline::display::{mailbox::DisplayFrames, sink::DisplaySink};
use crate::frame_pipeline::frame::{ColorFrame, DepthFrame};

/// TIFF compression for preview files
#[derive(Debug, Clone, Copy, Default)]
pub enum PreviewCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    Deflate,
}

/// Writes the latest display buffers as TIFF files into a directory,
/// overwriting them on every presentation.
///
/// `color.tiff` and `pins.tiff` hold the 4-byte pixels exactly as delivered,
/// stored as RGBA8; `depth.tiff` is Gray16 with raw sensor codes.
pub struct TiffPreviewSink {
    directory: PathBuf,
    compression: PreviewCompression,
}

impl TiffPreviewSink {
    /// Creates `directory` if it does not exist yet.
    pub fn new<P: Into<PathBuf>>(directory: P, compression: PreviewCompression) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory, compression })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn compression(&self) -> tiff::encoder::Compression {
        match self.compression {
            PreviewCompression::None => tiff::encoder::Compression::Uncompressed,
            PreviewCompression::Lzw => tiff::encoder::Compression::Lzw,
            PreviewCompression::Deflate => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
        }
    }

    fn encoder<'a>(&self, buffer: &'a mut Vec<u8>) -> Result<tiff::encoder::TiffEncoder<std::io::Cursor<&'a mut Vec<u8>>>> {
        Ok(tiff::encoder::TiffEncoder::new(std::io::Cursor::new(buffer))
            .map_err(|e| PipelineError::Preview(e.to_string()))?
            .with_compression(self.compression()))
    }

    fn write_color(&self, name: &str, frame: &ColorFrame) -> Result<()> {
        let mut buffer = Vec::new();
        self.encoder(&mut buffer)?
            .write_image::<tiff::encoder::colortype::RGBA8>(
                frame.width() as u32,
                frame.height() as u32,
                frame.as_bytes(),
            )
            .map_err(|e| PipelineError::Preview(e.to_string()))?;
        std::fs::write(self.directory.join(name), &buffer)?;
        Ok(())
    }

    fn write_depth(&self, name: &str, frame: &DepthFrame) -> Result<()> {
        let mut buffer = Vec::new();
        self.encoder(&mut buffer)?
            .write_image::<tiff::encoder::colortype::Gray16>(
                frame.width() as u32,
                frame.height() as u32,
                frame.samples(),
            )
            .map_err(|e| PipelineError::Preview(e.to_string()))?;
        std::fs::write(self.directory.join(name), &buffer)?;
        Ok(())
    }
}

impl DisplaySink for TiffPreviewSink {
    fn present(&mut self, frames: &DisplayFrames) -> Result<()> {
        debug!("Writing preview TIFFs to {}", self.directory.display());

        self.write_color("color.tiff", frames.color())?;
        self.write_color("depth_rgb.tiff", frames.depth_rgb())?;
        self.write_depth("depth.tiff", frames.depth_gray())?;
        if let Some(pins) = &frames.pins {
            self.write_color("pins.tiff", pins)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::frame_pipeline::capture::CapturedFrames;

    fn frames(pins: Option<ColorFrame>) -> DisplayFrames {
        let captured = CapturedFrames {
            color: ColorFrame::blank(),
            depth_rgb: ColorFrame::blank(),
            depth_raw: DepthFrame::filled(700),
        };
        DisplayFrames::new(Arc::new(captured), pins)
    }

    #[test]
    fn test_present_writes_tiff_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TiffPreviewSink::new(dir.path().join("preview"), PreviewCompression::Lzw).unwrap();

        sink.present(&frames(None)).unwrap();

        for name in ["color.tiff", "depth_rgb.tiff", "depth.tiff"] {
            let bytes = std::fs::read(sink.directory().join(name)).unwrap();
            // little-endian TIFF magic
            assert_eq!(&bytes[..4], &[0x49, 0x49, 0x2a, 0x00]);
        }
        assert!(!sink.directory().join("pins.tiff").exists());

        sink.present(&frames(Some(ColorFrame::blank()))).unwrap();
        assert!(sink.directory().join("pins.tiff").exists());
    }
}
