//! Core data types produced by the analyzer and the enhancement pipeline.
//!
//! Every value here is created fresh per call or per monitor tick and is
//! immutable once returned.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ImageEncoding;

/// Focus quality band derived from the raw Laplacian measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Poor => write!(f, "poor"),
            Quality::Fair => write!(f, "fair"),
            Quality::Good => write!(f, "good"),
            Quality::Excellent => write!(f, "excellent"),
        }
    }
}

/// Focus estimate for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpnessResult {
    /// Normalized score from 0 to 100
    pub score: f64,

    /// Standard deviation of the Laplacian response (unbounded, >= 0)
    pub raw_measure: f64,

    /// Quality band
    pub quality: Quality,

    /// Whether the frame is sharp enough to capture
    pub is_focused: bool,
}

impl SharpnessResult {
    /// The degraded result delivered when no usable frame exists.
    pub fn unusable() -> Self {
        Self {
            score: 0.0,
            raw_measure: 0.0,
            quality: Quality::Poor,
            is_focused: false,
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for ImageSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Output of one enhancement call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Encoded processed bitmap (base64 in JSON reports)
    #[serde(with = "base64_bytes")]
    pub processed_image: Vec<u8>,

    /// Encoding of `processed_image`
    pub image_format: ImageEncoding,

    /// Dimensions of the input frame
    pub original_size: ImageSize,

    /// Dimensions of the processed image
    pub processed_size: ImageSize,

    /// One entry per executed stage, in execution order
    pub step_log: Vec<String>,

    /// Wall-clock time spent in the call
    pub total_processing_time_ms: f64,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> PipelineResult {
        PipelineResult {
            processed_image: vec![0x89, b'P', b'N', b'G'],
            image_format: ImageEncoding::Png,
            original_size: ImageSize::new(2000, 1500),
            processed_size: ImageSize::new(6000, 4500),
            step_log: vec!["channel: extract blue".to_string()],
            total_processing_time_ms: 12.5,
        }
    }

    #[test]
    fn test_unusable_result() {
        let result = SharpnessResult::unusable();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.quality, Quality::Poor);
        assert!(!result.is_focused);
    }

    #[test]
    fn test_quality_ordering() {
        assert!(Quality::Poor < Quality::Fair);
        assert!(Quality::Good < Quality::Excellent);
    }

    #[test]
    fn test_sharpness_result_json() {
        let json = serde_json::to_string(&SharpnessResult::unusable()).unwrap();
        assert!(json.contains("\"quality\":\"poor\""));
        assert!(json.contains("\"is_focused\":false"));
    }

    #[test]
    fn test_pipeline_result_image_is_base64_in_json() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        assert!(json.contains("\"processed_image\":\"iVBORw==\""));
        assert!(json.contains("\"processed_size\":{\"width\":6000,\"height\":4500}"));

        let parsed: PipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.processed_image, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_image_size_display() {
        assert_eq!(ImageSize::new(640, 480).to_string(), "640x480");
        assert_eq!(ImageSize::from((3, 2)).area(), 6);
    }
}
