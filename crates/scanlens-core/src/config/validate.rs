//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, EnhanceConfig};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sharpness = &self.sharpness;
        if sharpness.sample_size < 3 {
            return Err(ConfigError::ValidationError(
                "sharpness.sample_size must be >= 3".into(),
            ));
        }
        if !(sharpness.normalization_divisor > 0.0) {
            return Err(ConfigError::ValidationError(
                "sharpness.normalization_divisor must be > 0".into(),
            ));
        }
        if !(sharpness.fair_threshold <= sharpness.good_threshold
            && sharpness.good_threshold <= sharpness.excellent_threshold)
        {
            return Err(ConfigError::ValidationError(
                "sharpness thresholds must satisfy fair <= good <= excellent".into(),
            ));
        }
        if sharpness.capture_threshold < 0.0 {
            return Err(ConfigError::ValidationError(
                "sharpness.capture_threshold must be >= 0".into(),
            ));
        }
        if self.monitor.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "monitor.interval_ms must be > 0".into(),
            ));
        }

        self.enhance.validate()?;

        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.max_output_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_output_dimension must be > 0".into(),
            ));
        }
        if self.limits.ready_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.ready_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl EnhanceConfig {
    /// Validate the stage parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bilateral_diameter == 0 || self.bilateral_diameter % 2 == 0 {
            return Err(ConfigError::ValidationError(
                "enhance.bilateral_diameter must be odd and > 0".into(),
            ));
        }
        if !(self.bilateral_sigma_color > 0.0) || !(self.bilateral_sigma_space > 0.0) {
            return Err(ConfigError::ValidationError(
                "enhance.bilateral sigmas must be > 0".into(),
            ));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(ConfigError::ValidationError(
                "enhance.blur_sigma must be > 0".into(),
            ));
        }
        if self.threshold_block_size < 3 || self.threshold_block_size % 2 == 0 {
            return Err(ConfigError::ValidationError(
                "enhance.threshold_block_size must be odd and >= 3".into(),
            ));
        }
        if !self.threshold_offset.is_finite() {
            return Err(ConfigError::ValidationError(
                "enhance.threshold_offset must be finite".into(),
            ));
        }
        if self.morphology_radius == 0 {
            return Err(ConfigError::ValidationError(
                "enhance.morphology_radius must be > 0".into(),
            ));
        }
        Ok(())
    }
}
