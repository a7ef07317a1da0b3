//! Error types for the scanlens focus analyzer and enhancement pipeline.
//!
//! Errors are organized by concern so callers can tell a bad input apart from
//! a bad configuration or a stage that broke halfway through a run.

use thiserror::Error;

/// Top-level error type for scanlens operations.
#[derive(Error, Debug)]
pub enum ScanLensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline and analyzer errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by the sharpness analyzer and the enhancement pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The supplied frame is empty, malformed, or undecodable
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A pipeline option is outside its valid domain
    #[error("Unsupported configuration: {message}")]
    UnsupportedConfig { message: String },

    /// A stage failed internally; `step_log` holds the stages that completed
    #[error("Stage '{stage}' failed after {} completed step(s): {message}", .step_log.len())]
    StageExecution {
        stage: String,
        message: String,
        step_log: Vec<String>,
    },

    /// The frame source has no usable dimensions yet
    #[error("Frame unavailable ({width}x{height})")]
    UnavailableFrame { width: u32, height: u32 },

    /// Input dimensions exceed the configured limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Operation timed out
    #[error("Timeout in {stage} after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },
}

impl PipelineError {
    /// Build an `InvalidInput` error from any displayable message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Build an `UnsupportedConfig` error from any displayable message.
    pub fn unsupported_config(message: impl Into<String>) -> Self {
        Self::UnsupportedConfig {
            message: message.into(),
        }
    }

    /// Whether the user should simply be asked to capture again.
    ///
    /// Stage failures and timeouts are transient from the user's point of
    /// view. Bad configuration or an unreadable file will fail the same way
    /// on every retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StageExecution { .. } | Self::Timeout { .. } | Self::UnavailableFrame { .. }
        )
    }

    /// The partial step log carried by a stage failure, if any.
    pub fn step_log(&self) -> Option<&[String]> {
        match self {
            Self::StageExecution { step_log, .. } => Some(step_log),
            _ => None,
        }
    }
}

/// Convenience type alias for scanlens results.
pub type Result<T> = std::result::Result<T, ScanLensError>;
