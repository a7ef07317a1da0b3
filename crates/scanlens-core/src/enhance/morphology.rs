//! Opening then closing to clean up speckle and close stroke gaps.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

use crate::error::PipelineError;

use super::Stage;

/// Opening followed by closing with a square structuring element.
#[derive(Debug, Clone)]
pub struct MorphologyStage {
    radius: u8,
}

impl MorphologyStage {
    /// `radius` 1 gives a 3x3 element.
    pub fn new(radius: u8) -> Self {
        Self { radius }
    }

    fn kernel_side(&self) -> u32 {
        2 * self.radius as u32 + 1
    }
}

impl Stage for MorphologyStage {
    fn name(&self) -> &'static str {
        "morphology"
    }

    fn describe(&self, _width: u32, _height: u32) -> String {
        let side = self.kernel_side();
        format!("morphology: open+close {side}x{side}")
    }

    fn apply(&self, image: GrayImage) -> Result<GrayImage, PipelineError> {
        if self.radius == 0 {
            return Err(PipelineError::unsupported_config(
                "morphology radius must be > 0",
            ));
        }
        // LInf distance makes the structuring element a square.
        let opened = open(&image, Norm::LInf, self.radius);
        drop(image);
        Ok(close(&opened, Norm::LInf, self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_removes_isolated_speck() {
        let mut img = GrayImage::from_pixel(11, 11, Luma([0]));
        img.put_pixel(5, 5, Luma([255]));
        let out = MorphologyStage::new(1).apply(img).unwrap();
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_fills_single_pixel_hole() {
        let mut img = GrayImage::from_pixel(11, 11, Luma([255]));
        img.put_pixel(5, 5, Luma([0]));
        let out = MorphologyStage::new(1).apply(img).unwrap();
        assert_eq!(out.get_pixel(5, 5)[0], 255);
    }

    #[test]
    fn test_keeps_dimensions() {
        let out = MorphologyStage::new(1)
            .apply(GrayImage::new(13, 7))
            .unwrap();
        assert_eq!(out.dimensions(), (13, 7));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            MorphologyStage::new(1).describe(1, 1),
            "morphology: open+close 3x3"
        );
    }
}
