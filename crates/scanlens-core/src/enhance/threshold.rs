//! Gaussian-weighted adaptive thresholding.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

use crate::error::PipelineError;

use super::Stage;

/// Binarize against a Gaussian-weighted local mean.
///
/// A pixel becomes 255 when it is brighter than `local_mean - offset`, and 0
/// otherwise. The neighbourhood is `block_size` pixels square.
#[derive(Debug, Clone)]
pub struct ThresholdStage {
    block_size: u32,
    offset: f32,
}

impl ThresholdStage {
    pub fn new(block_size: u32, offset: f32) -> Self {
        Self { block_size, offset }
    }

    /// Gaussian sigma implied by the block size.
    pub fn sigma(&self) -> f64 {
        0.3 * ((self.block_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Stage for ThresholdStage {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn describe(&self, _width: u32, _height: u32) -> String {
        format!(
            "threshold: adaptive gaussian block={} C={}",
            self.block_size, self.offset
        )
    }

    fn apply(&self, image: GrayImage) -> Result<GrayImage, PipelineError> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(PipelineError::unsupported_config(format!(
                "threshold block size must be odd and >= 3 (got {})",
                self.block_size
            )));
        }

        let kernel = gaussian_kernel(self.block_size as usize, self.sigma() as f32);
        let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
                Luma([image.get_pixel(x, y)[0] as f32])
            });
        let mean = separable_filter_equal(&levels, &kernel);
        drop(levels);

        Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let local = mean.get_pixel(x, y)[0];
            if image.get_pixel(x, y)[0] as f32 > local - self.offset {
                Luma([255])
            } else {
                Luma([0])
            }
        }))
    }
}

/// Normalized 1-D Gaussian kernel spanning the whole block.
fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let half = (size / 2) as f32;
    let coeff = -0.5 / (sigma * sigma);
    let raw: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (d * d * coeff).exp()
        })
        .collect();
    let total: f32 = raw.iter().sum();
    raw.into_iter().map(|v| v / total).collect()
}
