//! Resampling stage.

use image::imageops::resize;
use image::GrayImage;

use crate::config::Interpolation;
use crate::error::PipelineError;

use super::Stage;

/// Resize by a uniform factor.
#[derive(Debug, Clone)]
pub struct ScaleStage {
    factor: f32,
    interpolation: Interpolation,
    max_dimension: u32,
}

impl ScaleStage {
    pub fn new(factor: f32, interpolation: Interpolation, max_dimension: u32) -> Self {
        Self {
            factor,
            interpolation,
            max_dimension,
        }
    }

    /// Output dimensions for an input of `width` x `height`.
    ///
    /// Each axis is rounded to the nearest pixel and never drops below 1.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        (scaled(width, self.factor), scaled(height, self.factor))
    }
}

fn scaled(dimension: u32, factor: f32) -> u32 {
    let value = (dimension as f64 * factor as f64).round();
    if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        (value as u32).max(1)
    }
}

impl Stage for ScaleStage {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn describe(&self, width: u32, height: u32) -> String {
        let (w, h) = self.target_size(width, height);
        format!(
            "scale: {}x {} {}x{} -> {}x{}",
            self.factor, self.interpolation, width, height, w, h
        )
    }

    fn apply(&self, image: GrayImage) -> Result<GrayImage, PipelineError> {
        let (width, height) = self.target_size(image.width(), image.height());
        if width > self.max_dimension || height > self.max_dimension {
            return Err(PipelineError::ImageTooLarge {
                width,
                height,
                max_dim: self.max_dimension,
            });
        }

        Ok(resize(
            &image,
            width,
            height,
            self.interpolation.filter_type(),
        ))
    }
}
