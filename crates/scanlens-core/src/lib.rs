//! ScanLens Core - focus analysis and OCR-oriented image enhancement.
//!
//! Two independent tools for getting a readable document photo:
//!
//! - a sharpness analyzer that scores live preview frames so the user can be
//!   guided to a steady, focused shot, and
//! - an enhancement pipeline that turns the captured frame into a clean,
//!   binarized, upscaled image for text recognition.
//!
//! # Architecture
//!
//! ```text
//! Preview → Sharpness (center crop → Laplacian σ) → score / quality / focused
//! Capture → Channel → Scale → Denoise → Threshold → Morphology → Sharpen → PNG
//! ```
//!
//! Nothing is cached between calls. Camera access, text recognition and
//! transport are left to the embedding application.
//!
//! # Usage
//!
//! ```rust,ignore
//! use scanlens_core::{Config, ImageDecoder, PipelineConfig, ScanLens};
//!
//! #[tokio::main]
//! async fn main() -> scanlens_core::Result<()> {
//!     let config = Config::load()?;
//!     let lens = ScanLens::new(config).await?;
//!
//!     let bytes = std::fs::read("./label.jpg")?;
//!     let frame = ImageDecoder::new(lens.config().limits.clone()).decode(&bytes)?;
//!     let focus = lens.analyzer().compute(&frame)?;
//!     println!("focus: {} ({})", focus.score, focus.quality);
//!
//!     let result = lens.enhance(frame, PipelineConfig::full()).await?;
//!     std::fs::write("./label.png", &result.processed_image)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod enhance;
pub mod error;
pub mod frame;
pub mod output;
pub mod readiness;
pub mod sharpness;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

// Re-exports for convenient access
pub use config::{Channel, Config, ImageEncoding, Interpolation, PipelineConfig, Profile};
pub use enhance::{EnhancementPipeline, ImageDecoder};
pub use error::{ConfigError, PipelineError, Result, ScanLensError};
pub use frame::{Frame, FrameSource};
pub use output::{EnhanceReport, OutputFormat, OutputWriter, SharpnessReport};
pub use readiness::Readiness;
pub use sharpness::{
    compute_sharpness, MonitorCanceller, MonitorHandle, SharpnessAnalyzer, SharpnessMonitor,
};
pub use types::{ImageSize, PipelineResult, Quality, SharpnessResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Side of the synthetic frame used to warm up the pipeline.
const WARM_UP_SIZE: u32 = 16;

/// ScanLens - the main entry point bundling analyzer, monitor and pipeline.
pub struct ScanLens {
    config: Config,
    analyzer: SharpnessAnalyzer,
    pipeline: EnhancementPipeline,
    readiness: Readiness,
}

impl ScanLens {
    /// Create a new ScanLens instance with the given configuration.
    ///
    /// Runs one tiny enhancement on the blocking pool so the first real
    /// capture does not pay for lazy initialization, then opens the
    /// readiness gate.
    pub async fn new(config: Config) -> Result<Self> {
        let lens = Self::open(config)?;
        lens.warm_up().await?;
        Ok(lens)
    }

    /// Create an instance without warming up.
    ///
    /// The readiness gate stays closed until [`warm_up`](Self::warm_up)
    /// completes, so [`enhance`](Self::enhance) calls made in the meantime
    /// wait for it.
    pub fn open(config: Config) -> Result<Self> {
        tracing::debug!("Initializing ScanLens v{}", VERSION);
        config.validate()?;

        Ok(Self {
            analyzer: SharpnessAnalyzer::new(config.sharpness.clone()),
            pipeline: EnhancementPipeline::new(&config),
            readiness: Readiness::new(),
            config,
        })
    }

    /// Run the warm-up enhancement and open the readiness gate.
    pub async fn warm_up(&self) -> Result<()> {
        let warm_up = Frame::from_dynamic(image::DynamicImage::new_rgb8(WARM_UP_SIZE, WARM_UP_SIZE));
        self.pipeline
            .process_in_background(warm_up, PipelineConfig::full())
            .await?;
        self.readiness.mark_ready();
        tracing::debug!("Enhancement backend ready");
        Ok(())
    }

    /// Create a new ScanLens instance from the default config file.
    pub async fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Self::new(config).await
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configured focus analyzer.
    pub fn analyzer(&self) -> &SharpnessAnalyzer {
        &self.analyzer
    }

    /// The configured enhancement pipeline.
    pub fn pipeline(&self) -> &EnhancementPipeline {
        &self.pipeline
    }

    /// The backend readiness gate.
    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Wait for the backend, bounded by `limits.ready_timeout_ms`.
    pub async fn wait_until_ready(&self) -> std::result::Result<(), PipelineError> {
        let timeout = Duration::from_millis(self.config.limits.ready_timeout_ms);
        self.readiness.wait_until_ready(timeout).await
    }

    /// Enhance a captured frame off the async thread.
    pub async fn enhance(&self, frame: Frame, options: PipelineConfig) -> Result<PipelineResult> {
        self.wait_until_ready().await?;
        Ok(self.pipeline.process_in_background(frame, options).await?)
    }

    /// Start sampling `source` with the configured calibration and cadence.
    pub fn start_monitoring<F>(
        &self,
        source: Arc<dyn FrameSource>,
        callback: F,
    ) -> std::result::Result<MonitorHandle, PipelineError>
    where
        F: FnMut(SharpnessResult) + Send + 'static,
    {
        Ok(SharpnessMonitor::from_config(&self.config)?.start(source, callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};
    use tokio::sync::mpsc;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_new_marks_ready() {
        let lens = ScanLens::new(Config::default()).await.unwrap();
        assert!(lens.readiness().is_ready());
        lens.wait_until_ready().await.unwrap();
        assert_eq!(lens.config().sharpness.sample_size, 200);
    }

    #[tokio::test]
    async fn test_enhance_through_facade() {
        let lens = ScanLens::new(Config::default()).await.unwrap();
        let frame = Frame::from_dynamic(DynamicImage::new_rgb8(20, 10));
        let result = lens.enhance(frame, PipelineConfig::quick()).await.unwrap();
        assert_eq!(result.processed_size, ImageSize::new(30, 15));
    }

    #[tokio::test]
    async fn test_start_monitoring_uses_config() {
        let mut config = Config::default();
        config.monitor.interval_ms = 10;
        let lens = ScanLens::new(config).await.unwrap();

        let flat: Arc<dyn FrameSource> = Arc::new(Frame::from_dynamic(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([90]))),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = lens
            .start_monitoring(flat, move |result| {
                let _ = tx.send(result);
            })
            .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.quality, Quality::Poor);
        assert!(!result.is_focused);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_enhance_waits_for_warm_up() {
        let lens = Arc::new(ScanLens::open(Config::default()).unwrap());
        assert!(!lens.readiness().is_ready());

        let warming = Arc::clone(&lens);
        let enhancing = Arc::clone(&lens);
        let enhance = tokio::spawn(async move {
            let frame = Frame::from_dynamic(DynamicImage::new_rgb8(20, 10));
            enhancing.enhance(frame, PipelineConfig::quick()).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!enhance.is_finished());

        warming.warm_up().await.unwrap();
        let result = enhance.await.unwrap().unwrap();
        assert_eq!(result.processed_size, ImageSize::new(30, 15));
    }

    #[tokio::test]
    async fn test_wait_times_out_without_warm_up() {
        let mut config = Config::default();
        config.limits.ready_timeout_ms = 20;
        let lens = ScanLens::open(config).unwrap();
        let err = lens.wait_until_ready().await.unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { .. }));
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut config = Config::default();
        config.monitor.interval_ms = 0;
        assert!(matches!(
            ScanLens::open(config),
            Err(ScanLensError::Config(_))
        ));
    }
}
