//! Pixel buffers handed in by the capture collaborator.
//!
//! A [`Frame`] is owned by the caller. Neither the analyzer nor the pipeline
//! keeps a frame (or anything derived from it) past the call that used it.

use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

use crate::error::PipelineError;
use crate::types::ImageSize;

/// A single camera frame or captured still.
#[derive(Debug, Clone)]
pub struct Frame {
    image: DynamicImage,
}

impl Frame {
    /// Wrap an already-decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Build a frame from tightly packed RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(|buffer| Self::from_dynamic(DynamicImage::ImageRgba8(buffer)))
            .ok_or_else(|| {
                PipelineError::invalid_input(format!(
                    "RGBA buffer for {width}x{height} needs {expected} bytes, got {actual}"
                ))
            })
    }

    /// Build a frame from single-channel bytes.
    pub fn from_luma(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize;
        let actual = data.len();
        GrayImage::from_raw(width, height, data)
            .map(|buffer| Self::from_dynamic(DynamicImage::ImageLuma8(buffer)))
            .ok_or_else(|| {
                PipelineError::invalid_input(format!(
                    "luma buffer for {width}x{height} needs {expected} bytes, got {actual}"
                ))
            })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Frame dimensions.
    pub fn size(&self) -> ImageSize {
        self.image.dimensions().into()
    }

    /// True when the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// True for luma (and luma+alpha) sources.
    pub fn is_single_channel(&self) -> bool {
        !self.image.color().has_color()
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the frame and return the underlying image.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        Self::from_dynamic(image)
    }
}

/// Supplier of frames for the live sharpness monitor.
///
/// Implemented by whatever owns the camera. The monitor only ever asks for
/// the current dimensions and the latest frame; device lifecycle,
/// permissions, and format negotiation stay with the implementor.
pub trait FrameSource: Send + Sync {
    /// Current frame dimensions. `(0, 0)` while the stream is still starting.
    fn dimensions(&self) -> (u32, u32);

    /// Grab the most recent frame.
    fn capture(&self) -> Result<Frame, PipelineError>;
}

/// A captured still doubles as a source that always returns itself.
impl FrameSource for Frame {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn capture(&self) -> Result<Frame, PipelineError> {
        Ok(self.clone())
    }
}
