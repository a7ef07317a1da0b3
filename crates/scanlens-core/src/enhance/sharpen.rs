//! Edge-enhancing convolution.

use image::GrayImage;
use imageproc::filter::sharpen3x3;

use crate::error::PipelineError;

use super::Stage;

/// 3x3 sharpening, `[0,-1,0; -1,5,-1; 0,-1,0]`, with edge-replicated borders
/// and saturating output.
#[derive(Debug, Clone, Default)]
pub struct SharpenStage;

impl Stage for SharpenStage {
    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn describe(&self, _width: u32, _height: u32) -> String {
        "sharpen: 3x3 kernel [0,-1,0; -1,5,-1; 0,-1,0]".to_string()
    }

    fn apply(&self, image: GrayImage) -> Result<GrayImage, PipelineError> {
        Ok(sharpen3x3(&image))
    }
}
