//! Noise reduction: an edge-preserving bilateral filter or a plain Gaussian blur.

use image::GrayImage;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};

use crate::error::PipelineError;

use super::Stage;

/// Denoising strategy and its parameters.
#[derive(Debug, Clone)]
pub enum DenoiseStage {
    /// Bilateral filter over a `diameter` x `diameter` window
    Bilateral {
        diameter: u32,
        sigma_color: f32,
        sigma_space: f32,
    },
    /// Isotropic Gaussian blur
    Gaussian { sigma: f32 },
}

impl Stage for DenoiseStage {
    fn name(&self) -> &'static str {
        "denoise"
    }

    fn describe(&self, _width: u32, _height: u32) -> String {
        match self {
            DenoiseStage::Bilateral {
                diameter,
                sigma_color,
                sigma_space,
            } => format!(
                "denoise: bilateral d={diameter} sigma_color={sigma_color} sigma_space={sigma_space}"
            ),
            DenoiseStage::Gaussian { sigma } => format!("denoise: gaussian sigma={sigma}"),
        }
    }

    fn apply(&self, image: GrayImage) -> Result<GrayImage, PipelineError> {
        match *self {
            DenoiseStage::Bilateral {
                diameter,
                sigma_color,
                sigma_space,
            } => {
                if diameter == 0 || !(sigma_color > 0.0) || !(sigma_space > 0.0) {
                    return Err(PipelineError::unsupported_config(
                        "bilateral filter needs a diameter and positive sigmas",
                    ));
                }
                Ok(bilateral(&image, diameter, sigma_color, sigma_space))
            }
            DenoiseStage::Gaussian { sigma } => {
                if !(sigma > 0.0) {
                    return Err(PipelineError::unsupported_config(
                        "gaussian blur sigma must be > 0",
                    ));
                }
                Ok(gaussian_blur_f32(&image, sigma))
            }
        }
    }
}

/// Bilateral filter with edge-replicated borders.
fn bilateral(image: &GrayImage, diameter: u32, sigma_color: f32, sigma_space: f32) -> GrayImage {
    // Color weights are scaled by the brightest pixel, which must be non-zero.
    if image.iter().all(|&v| v == 0) {
        return image.clone();
    }
    bilateral_filter(image, diameter, sigma_color, sigma_space)
}
