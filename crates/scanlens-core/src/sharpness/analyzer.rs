//! Laplacian-based focus measurement on a centered crop.

use image::DynamicImage;

use crate::config::SharpnessConfig;
use crate::error::PipelineError;
use crate::frame::{Frame, FrameSource};
use crate::types::{Quality, SharpnessResult};

/// Scores how well a frame is focused.
///
/// Cost depends only on `sample_size`, never on the frame's native
/// resolution, so a 12 MP preview costs the same as a 1 MP one.
#[derive(Debug, Clone, Default)]
pub struct SharpnessAnalyzer {
    config: SharpnessConfig,
}

impl SharpnessAnalyzer {
    /// Create an analyzer with the given calibration.
    pub fn new(config: SharpnessConfig) -> Self {
        Self { config }
    }

    /// The calibration in use.
    pub fn config(&self) -> &SharpnessConfig {
        &self.config
    }

    /// Score a frame using the configured sample size.
    pub fn compute(&self, frame: &Frame) -> Result<SharpnessResult, PipelineError> {
        self.compute_with_sample(frame, self.config.sample_size)
    }

    /// Score a frame using an explicit crop size.
    ///
    /// Fails with `UnavailableFrame` when the frame has zero area.
    pub fn compute_with_sample(
        &self,
        frame: &Frame,
        sample_size: u32,
    ) -> Result<SharpnessResult, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::UnavailableFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }

        let (luma, width, height) = center_crop_luminance(frame.as_dynamic(), sample_size);
        let raw_measure = laplacian_std_dev(&luma, width, height);
        Ok(self.classify(raw_measure))
    }

    /// Sample a live source, degrading instead of failing.
    ///
    /// A source without usable dimensions, or one whose capture fails, yields
    /// [`SharpnessResult::unusable`].
    pub fn sample(&self, source: &dyn FrameSource) -> SharpnessResult {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            tracing::trace!("Frame source not ready ({}x{}), skipping tick", width, height);
            return SharpnessResult::unusable();
        }

        match source.capture().and_then(|frame| self.compute(&frame)) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("Sharpness tick degraded: {e}");
                SharpnessResult::unusable()
            }
        }
    }

    /// Turn a raw measure into a score, band, and focus decision.
    pub fn classify(&self, raw_measure: f64) -> SharpnessResult {
        let c = &self.config;
        let score = (raw_measure / c.normalization_divisor * 100.0).min(100.0);

        let quality = if raw_measure >= c.excellent_threshold {
            Quality::Excellent
        } else if raw_measure >= c.good_threshold {
            Quality::Good
        } else if raw_measure >= c.fair_threshold {
            Quality::Fair
        } else {
            Quality::Poor
        };

        SharpnessResult {
            score,
            raw_measure,
            quality,
            is_focused: raw_measure > c.capture_threshold,
        }
    }
}

/// Score a frame with the reference calibration.
pub fn compute_sharpness(frame: &Frame, sample_size: u32) -> Result<SharpnessResult, PipelineError> {
    SharpnessAnalyzer::default().compute_with_sample(frame, sample_size)
}

/// Cut a centered square of at most `sample_size` pixels per side and convert
/// it to perceptual luminance.
fn center_crop_luminance(image: &DynamicImage, sample_size: u32) -> (Vec<f64>, u32, u32) {
    let side = sample_size.min(image.width()).min(image.height());
    let x = (image.width() - side) / 2;
    let y = (image.height() - side) / 2;

    let crop = image.crop_imm(x, y, side, side).to_rgba8();
    let luma = crop
        .pixels()
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .collect();

    (luma, side, side)
}

/// Standard deviation of the 4-neighbour Laplacian over interior pixels.
///
/// Kernel: `[0,1,0; 1,-4,1; 0,1,0]`. The one-pixel border is skipped, so
/// crops smaller than 3x3 have no response and measure 0.
fn laplacian_std_dev(luma: &[f64], width: u32, height: u32) -> f64 {
    if width < 3 || height < 3 {
        return 0.0;
    }
    let w = width as usize;
    let h = height as usize;

    let mut response = Vec::with_capacity((w - 2) * (h - 2));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = luma[y * w + x];
            let top = luma[(y - 1) * w + x];
            let bottom = luma[(y + 1) * w + x];
            let left = luma[y * w + x - 1];
            let right = luma[y * w + x + 1];
            // Pairwise sum keeps a flat field at exactly zero.
            response.push((top + bottom) + (left + right) - 4.0 * center);
        }
    }

    let n = response.len() as f64;
    let mean = response.iter().sum::<f64>() / n;
    let variance = response.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn flat_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([value, value, value, 255]),
        )))
    }

    fn checkerboard(width: u32, height: u32) -> Frame {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });
        Frame::from_dynamic(DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn test_flat_field_scores_zero() {
        let result = compute_sharpness(&flat_frame(640, 480, 128), 200).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.raw_measure, 0.0);
        assert_eq!(result.quality, Quality::Poor);
        assert!(!result.is_focused);
    }

    #[test]
    fn test_checkerboard_saturates() {
        let result = compute_sharpness(&checkerboard(400, 300), 200).unwrap();
        assert!(result.score > 99.9, "score = {}", result.score);
        assert_eq!(result.quality, Quality::Excellent);
        assert!(result.is_focused);
        // Every interior response is +/-1020 for a 0/255 checkerboard.
        assert!((result.raw_measure - 1020.0).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let mut img = RgbaImage::new(320, 240);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8, 255]);
        }
        let frame = Frame::from_dynamic(DynamicImage::ImageRgba8(img));

        let a = compute_sharpness(&frame, 128).unwrap();
        let b = compute_sharpness(&frame, 128).unwrap();
        assert_eq!(a.raw_measure.to_bits(), b.raw_measure.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_only_center_is_sampled() {
        // Sharp checkerboard border around a flat 100x100 center.
        let img = GrayImage::from_fn(300, 300, |x, y| {
            let inside = (100..200).contains(&x) && (100..200).contains(&y);
            if inside || (x + y) % 2 == 0 {
                Luma([128u8])
            } else {
                Luma([0u8])
            }
        });
        let frame = Frame::from_dynamic(DynamicImage::ImageLuma8(img));
        let result = compute_sharpness(&frame, 100).unwrap();
        assert_eq!(result.raw_measure, 0.0);
    }

    #[test]
    fn test_sample_larger_than_frame_is_clamped() {
        let result = compute_sharpness(&checkerboard(50, 40), 500).unwrap();
        assert_eq!(result.quality, Quality::Excellent);
    }

    #[test]
    fn test_tiny_frame_has_no_interior() {
        let result = compute_sharpness(&checkerboard(2, 2), 200).unwrap();
        assert_eq!(result.raw_measure, 0.0);
    }

    #[test]
    fn test_empty_frame_is_unavailable() {
        let frame = Frame::from_dynamic(DynamicImage::new_rgba8(0, 0));
        let err = compute_sharpness(&frame, 200).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnavailableFrame {
                width: 0,
                height: 0
            }
        ));
    }

    #[test]
    fn test_sample_degrades_on_zero_dimensions() {
        let analyzer = SharpnessAnalyzer::default();
        let frame = Frame::from_dynamic(DynamicImage::new_rgba8(0, 0));
        assert_eq!(analyzer.sample(&frame), SharpnessResult::unusable());
    }

    #[test]
    fn test_classify_bands() {
        let analyzer = SharpnessAnalyzer::default();
        assert_eq!(analyzer.classify(199.9).quality, Quality::Poor);
        assert_eq!(analyzer.classify(200.0).quality, Quality::Fair);
        assert_eq!(analyzer.classify(399.9).quality, Quality::Fair);
        assert_eq!(analyzer.classify(400.0).quality, Quality::Good);
        assert_eq!(analyzer.classify(800.0).quality, Quality::Excellent);

        assert!(!analyzer.classify(300.0).is_focused);
        assert!(analyzer.classify(300.1).is_focused);

        assert_eq!(analyzer.classify(25.0).score, 50.0);
        assert_eq!(analyzer.classify(5000.0).score, 100.0);
    }

    #[test]
    fn test_custom_calibration() {
        let analyzer = SharpnessAnalyzer::new(SharpnessConfig {
            normalization_divisor: 100.0,
            capture_threshold: 10.0,
            ..SharpnessConfig::default()
        });
        let result = analyzer.classify(50.0);
        assert_eq!(result.score, 50.0);
        assert!(result.is_focused);
    }
}
