//! Pipeline orchestration - wires together all enhancement stages.

use std::time::Instant;

use crate::config::{Config, EnhanceConfig, ImageEncoding, PipelineConfig};
use crate::error::PipelineError;
use crate::frame::Frame;
use crate::types::{ImageSize, PipelineResult};

use super::channel;
use super::decode::ImageDecoder;
use super::denoise::DenoiseStage;
use super::encode::encode;
use super::morphology::MorphologyStage;
use super::scale::ScaleStage;
use super::sharpen::SharpenStage;
use super::threshold::ThresholdStage;
use super::Stage;

/// The enhancement pipeline. Holds only parameters, never image data, so one
/// instance can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct EnhancementPipeline {
    enhance: EnhanceConfig,
    max_output_dimension: u32,
    encoding: ImageEncoding,
    decoder: ImageDecoder,
}

impl EnhancementPipeline {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            enhance: config.enhance.clone(),
            max_output_dimension: config.limits.max_output_dimension,
            encoding: config.output.image_format,
            decoder: ImageDecoder::new(config.limits.clone()),
        }
    }

    fn check_parameters(&self, options: &PipelineConfig) -> Result<(), PipelineError> {
        options.validate()?;
        self.enhance
            .validate()
            .map_err(|e| PipelineError::unsupported_config(e.to_string()))
    }

    /// The stages that run after channel extraction, in execution order.
    fn stages(&self, options: &PipelineConfig) -> Vec<Box<dyn Stage>> {
        let e = &self.enhance;
        let mut stages: Vec<Box<dyn Stage>> = Vec::with_capacity(5);

        if options.scaling_enabled() {
            stages.push(Box::new(ScaleStage::new(
                options.scale_factor,
                e.interpolation,
                self.max_output_dimension,
            )));
        }
        if options.denoise {
            stages.push(Box::new(if options.use_edge_preserving_denoise {
                DenoiseStage::Bilateral {
                    diameter: e.bilateral_diameter,
                    sigma_color: e.bilateral_sigma_color,
                    sigma_space: e.bilateral_sigma_space,
                }
            } else {
                DenoiseStage::Gaussian {
                    sigma: e.blur_sigma,
                }
            }));
        }
        if options.adaptive_threshold {
            stages.push(Box::new(ThresholdStage::new(
                e.threshold_block_size,
                e.threshold_offset,
            )));
        }
        if options.morphology {
            stages.push(Box::new(MorphologyStage::new(e.morphology_radius)));
        }
        if options.sharpen {
            stages.push(Box::new(SharpenStage));
        }
        stages
    }

    /// Run a frame through the enabled stages.
    ///
    /// Fails with `UnsupportedConfig` before any pixel work when the options
    /// or stage parameters are out of range, with `InvalidInput`/`ImageTooLarge`
    /// when the frame is unusable, and with `StageExecution` when a stage
    /// breaks midway.
    pub fn process(
        &self,
        frame: &Frame,
        options: &PipelineConfig,
    ) -> Result<PipelineResult, PipelineError> {
        self.check_parameters(options)?;
        self.decoder.check_limits(frame)?;

        let start = Instant::now();
        let original_size = frame.size();
        let mut step_log = Vec::new();

        let stage_start = Instant::now();
        let entry = channel::describe(frame.as_dynamic(), self.enhance.channel);
        let mut working = channel::extract_channel(frame.as_dynamic(), self.enhance.channel);
        record(&mut step_log, entry, stage_start, options.debug);

        for stage in self.stages(options) {
            let stage_start = Instant::now();
            let entry = stage.describe(working.width(), working.height());
            working = match stage.apply(working) {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!("Stage '{}' failed: {e}", stage.name());
                    return Err(PipelineError::StageExecution {
                        stage: stage.name().to_string(),
                        message: e.to_string(),
                        step_log,
                    });
                }
            };
            record(&mut step_log, entry, stage_start, options.debug);
        }

        let processed_size = ImageSize::from(working.dimensions());
        let processed_image = encode(working, self.encoding).map_err(|e| {
            PipelineError::StageExecution {
                stage: "encode".to_string(),
                message: e.to_string(),
                step_log: step_log.clone(),
            }
        })?;

        let total_processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "Enhanced {} -> {} in {:.1}ms ({} step(s))",
            original_size,
            processed_size,
            total_processing_time_ms,
            step_log.len()
        );

        Ok(PipelineResult {
            processed_image,
            image_format: self.encoding,
            original_size,
            processed_size,
            step_log,
            total_processing_time_ms,
        })
    }

    /// Decode an encoded capture and run it through the pipeline.
    pub fn process_bytes(
        &self,
        bytes: &[u8],
        options: &PipelineConfig,
    ) -> Result<PipelineResult, PipelineError> {
        self.check_parameters(options)?;
        let frame = self.decoder.decode(bytes)?;
        self.process(&frame, options)
    }

    /// Run [`process`](Self::process) on the blocking pool.
    ///
    /// Keeps the calling task (and whatever UI it drives) responsive while a
    /// full-resolution capture is enhanced.
    pub async fn process_in_background(
        &self,
        frame: Frame,
        options: PipelineConfig,
    ) -> Result<PipelineResult, PipelineError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.process(&frame, &options))
            .await
            .map_err(|e| PipelineError::StageExecution {
                stage: "background".to_string(),
                message: format!("Task join error: {e}"),
                step_log: Vec::new(),
            })?
    }
}

/// Append a step-log entry, with its timing when debugging.
fn record(step_log: &mut Vec<String>, entry: String, started: Instant, debug: bool) {
    if debug {
        let ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!("  {entry}: {ms:.2}ms");
        step_log.push(format!("{entry} ({ms:.2} ms)"));
    } else {
        tracing::debug!("  {entry}");
        step_log.push(entry);
    }
}
