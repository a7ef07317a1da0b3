//! Focus measurement for live preview frames.
//!
//! [`SharpnessAnalyzer`] scores a single frame. [`SharpnessMonitor`] samples a
//! [`FrameSource`](crate::frame::FrameSource) on a fixed cadence and reports
//! each score to a callback until cancelled.

pub mod analyzer;
pub mod monitor;

pub use analyzer::{compute_sharpness, SharpnessAnalyzer};
pub use monitor::{MonitorCanceller, MonitorHandle, SharpnessMonitor};
