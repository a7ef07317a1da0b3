//! Sub-configuration structs with the calibrated reference defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Focus measurement calibration.
///
/// The divisor and band thresholds were tuned against phone sensors under
/// indoor lighting. Expect to recalibrate them per camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpnessConfig {
    /// Side of the centered square crop, in pixels
    pub sample_size: u32,

    /// Raw measure that maps to a score of 100
    pub normalization_divisor: f64,

    /// Raw measure at which quality becomes "fair"
    pub fair_threshold: f64,

    /// Raw measure at which quality becomes "good"
    pub good_threshold: f64,

    /// Raw measure at which quality becomes "excellent"
    pub excellent_threshold: f64,

    /// Raw measure above which a frame counts as in focus
    pub capture_threshold: f64,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self {
            sample_size: 200,
            normalization_divisor: 50.0,
            fair_threshold: 200.0,
            good_threshold: 400.0,
            excellent_threshold: 800.0,
            capture_threshold: 300.0,
        }
    }
}

/// Live monitor cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Delay between sampling ticks in milliseconds
    pub interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}

/// Named speed/quality bundle of pipeline toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Low-latency preview: 1.5x upscale and adaptive threshold only
    Quick,
    /// Submission quality: every stage on, 3x upscale
    #[default]
    Full,
}

impl Profile {
    /// Expand the profile into its full set of toggles.
    pub fn config(self) -> PipelineConfig {
        match self {
            Profile::Quick => PipelineConfig {
                scale_factor: 1.5,
                denoise: false,
                use_edge_preserving_denoise: false,
                adaptive_threshold: true,
                morphology: false,
                sharpen: false,
                debug: false,
            },
            Profile::Full => PipelineConfig {
                scale_factor: 3.0,
                denoise: true,
                use_edge_preserving_denoise: true,
                adaptive_threshold: true,
                morphology: true,
                sharpen: true,
                debug: false,
            },
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Quick => write!(f, "quick"),
            Profile::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Profile {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(Profile::Quick),
            "full" => Ok(Profile::Full),
            other => Err(PipelineError::unsupported_config(format!(
                "unknown profile '{other}' (expected 'quick' or 'full')"
            ))),
        }
    }
}

/// Per-call enhancement toggles.
///
/// Channel extraction is not listed because it always runs. Scaling counts as
/// enabled whenever `scale_factor` differs from 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Resize factor applied after channel extraction (must be > 0)
    pub scale_factor: f32,

    /// Run the denoise stage
    pub denoise: bool,

    /// Use the bilateral filter instead of a Gaussian blur when denoising
    pub use_edge_preserving_denoise: bool,

    /// Run Gaussian adaptive thresholding
    pub adaptive_threshold: bool,

    /// Run opening + closing cleanup
    pub morphology: bool,

    /// Run the sharpening convolution
    pub sharpen: bool,

    /// Add per-stage timings to the step log and log each stage at info
    pub debug: bool,
}

impl PipelineConfig {
    /// The low-latency preview profile.
    pub fn quick() -> Self {
        Profile::Quick.config()
    }

    /// The maximum-quality submission profile.
    pub fn full() -> Self {
        Profile::Full.config()
    }

    /// Every optional stage off; only channel extraction runs.
    pub fn channel_only() -> Self {
        Self {
            scale_factor: 1.0,
            denoise: false,
            use_edge_preserving_denoise: false,
            adaptive_threshold: false,
            morphology: false,
            sharpen: false,
            debug: false,
        }
    }

    /// Whether the scale stage runs for this configuration.
    pub fn scaling_enabled(&self) -> bool {
        self.scale_factor != 1.0
    }

    /// Reject values outside their domain before any pixel work starts.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(PipelineError::unsupported_config(format!(
                "scale_factor must be a finite value > 0 (got {})",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Profile::default().config()
    }
}

impl From<Profile> for PipelineConfig {
    fn from(profile: Profile) -> Self {
        profile.config()
    }
}

/// Source channel used as the working single-channel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    /// Best ink/background separation on most coloured label stock
    #[default]
    Blue,
    /// Perceptual luminance, for sources where no single channel works
    Luma,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Red => write!(f, "red"),
            Channel::Green => write!(f, "green"),
            Channel::Blue => write!(f, "blue"),
            Channel::Luma => write!(f, "luma"),
        }
    }
}

/// Resampling filter for the scale stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    /// Bicubic (Catmull-Rom spline)
    #[default]
    CatmullRom,
    /// Lanczos with window 3, sharper but slower
    Lanczos3,
}

impl Interpolation {
    /// Map to the `image` crate's filter type.
    pub fn filter_type(self) -> image::imageops::FilterType {
        match self {
            Interpolation::CatmullRom => image::imageops::FilterType::CatmullRom,
            Interpolation::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::CatmullRom => write!(f, "catmull-rom"),
            Interpolation::Lanczos3 => write!(f, "lanczos3"),
        }
    }
}

/// Stage parameters shared by every enhancement call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Profile used when the caller does not pass explicit toggles
    pub profile: Profile,

    /// Channel extracted in the first stage
    pub channel: Channel,

    /// Resampling filter for the scale stage
    pub interpolation: Interpolation,

    /// Bilateral neighbourhood diameter in pixels (odd)
    pub bilateral_diameter: u32,

    /// Bilateral intensity-similarity sigma
    pub bilateral_sigma_color: f32,

    /// Bilateral spatial sigma
    pub bilateral_sigma_space: f32,

    /// Gaussian sigma for the simple denoise path
    pub blur_sigma: f32,

    /// Adaptive threshold neighbourhood size in pixels (odd, >= 3)
    pub threshold_block_size: u32,

    /// Constant subtracted from the local mean
    pub threshold_offset: f32,

    /// Structuring element radius for opening/closing (1 = 3x3)
    pub morphology_radius: u8,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Full,
            channel: Channel::Blue,
            interpolation: Interpolation::CatmullRom,
            bilateral_diameter: 5,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            blur_sigma: 1.0,
            threshold_block_size: 31,
            threshold_offset: 2.0,
            morphology_radius: 1,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input dimension (width or height)
    pub max_image_dimension: u32,

    /// Maximum dimension the scale stage may produce
    pub max_output_dimension: u32,

    /// How long `ScanLens::new` callers wait for the backend warm-up
    pub ready_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 10000,
            max_output_dimension: 20000,
            ready_timeout_ms: 5000,
        }
    }
}

/// Encoding of the processed bitmap handed to the submission collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    #[default]
    Png,
    Bmp,
}

impl ImageEncoding {
    /// Map to the `image` crate's format.
    pub fn format(self) -> image::ImageFormat {
        match self {
            ImageEncoding::Png => image::ImageFormat::Png,
            ImageEncoding::Bmp => image::ImageFormat::Bmp,
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageEncoding::Png => "png",
            ImageEncoding::Bmp => "bmp",
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Encoding of the processed image
    pub image_format: ImageEncoding,

    /// Default report format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_format: ImageEncoding::Png,
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_profile_toggles() {
        let quick = PipelineConfig::quick();
        assert_eq!(quick.scale_factor, 1.5);
        assert!(!quick.denoise);
        assert!(quick.adaptive_threshold);
        assert!(!quick.morphology);
        assert!(!quick.sharpen);
    }

    #[test]
    fn test_full_profile_toggles() {
        let full = PipelineConfig::full();
        assert_eq!(full.scale_factor, 3.0);
        assert!(full.denoise && full.use_edge_preserving_denoise);
        assert!(full.adaptive_threshold && full.morphology && full.sharpen);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("Quick".parse::<Profile>().unwrap(), Profile::Quick);
        assert_eq!("full".parse::<Profile>().unwrap(), Profile::Full);
        assert!("medium".parse::<Profile>().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_scale() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = PipelineConfig {
                scale_factor: bad,
                ..PipelineConfig::quick()
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(err, PipelineError::UnsupportedConfig { .. }));
        }
    }

    #[test]
    fn test_scaling_enabled() {
        assert!(PipelineConfig::full().scaling_enabled());
        assert!(!PipelineConfig::channel_only().scaling_enabled());
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(serde_json::to_string(&Channel::Blue).unwrap(), "\"blue\"");
        assert_eq!(
            serde_json::to_string(&Interpolation::CatmullRom).unwrap(),
            "\"catmull-rom\""
        );
        assert_eq!(serde_json::to_string(&Profile::Quick).unwrap(), "\"quick\"");
    }
}
