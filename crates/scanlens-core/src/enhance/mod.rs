//! OCR-oriented enhancement pipeline.
//!
//! A captured frame flows through a fixed chain of stages:
//!
//! ```text
//! Frame → Channel → Scale → Denoise → Threshold → Morphology → Sharpen → Encode
//! ```
//!
//! Channel extraction always runs. The other stages are toggled per call by
//! [`PipelineConfig`](crate::config::PipelineConfig). Every stage consumes the
//! previous stage's buffer and returns a new one, so an intermediate is
//! dropped as soon as its successor exists.

pub mod channel;
pub mod decode;
pub mod denoise;
pub mod encode;
pub mod morphology;
pub mod processor;
pub mod scale;
pub mod sharpen;
pub mod threshold;

use image::GrayImage;

use crate::error::PipelineError;

pub use decode::ImageDecoder;
pub use processor::EnhancementPipeline;

/// One single-channel transformation in the enhancement chain.
pub trait Stage: Send + Sync {
    /// Short stage name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Step-log entry for running this stage on an image of the given size.
    fn describe(&self, width: u32, height: u32) -> String;

    /// Transform the working image.
    fn apply(&self, image: GrayImage) -> Result<GrayImage, PipelineError>;
}
