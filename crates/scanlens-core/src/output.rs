//! Report formatting for JSON and JSONL output.
//!
//! One-shot commands print a single JSON document; the live monitor streams
//! one JSON line per tick.

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::config::ImageEncoding;
use crate::error::ConfigError;
use crate::types::{ImageSize, PipelineResult, SharpnessResult};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Single JSON object
    #[default]
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    /// Parse format from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Ok(Self::JsonLines),
            other => Err(ConfigError::ValidationError(format!(
                "unknown output format '{other}' (expected 'json' or 'jsonl')"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
        }
    }
}

/// Serializes reports to JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects [`OutputFormat::Json`]; JSONL is always one
    /// object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Summary of one enhancement run.
///
/// The processed bitmap is only embedded (base64) when it was not written to
/// a file, so reports stay small in the common case.
#[derive(Debug, Clone, Serialize)]
pub struct EnhanceReport {
    /// Input file the frame came from
    pub source: String,

    /// Where the processed image was written, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    pub profile: String,
    pub image_format: ImageEncoding,
    pub original_size: ImageSize,
    pub processed_size: ImageSize,
    pub step_log: Vec<String>,
    pub total_processing_time_ms: f64,

    /// Base64 of the processed image when no output file was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_image: Option<String>,
}

impl EnhanceReport {
    /// Build a report from a pipeline result.
    pub fn new(
        source: impl Into<String>,
        profile: impl Into<String>,
        output: Option<String>,
        result: &PipelineResult,
    ) -> Self {
        let processed_image = match output {
            Some(_) => None,
            None => Some(BASE64.encode(&result.processed_image)),
        };
        Self {
            source: source.into(),
            output,
            profile: profile.into(),
            image_format: result.image_format,
            original_size: result.original_size,
            processed_size: result.processed_size,
            step_log: result.step_log.clone(),
            total_processing_time_ms: result.total_processing_time_ms,
            processed_image,
        }
    }
}

/// One sharpness measurement, optionally tagged with its monitor tick.
#[derive(Debug, Clone, Serialize)]
pub struct SharpnessReport {
    pub source: String,

    /// Monitor tick number, starting at 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,

    #[serde(flatten)]
    pub result: SharpnessResult,
}

impl SharpnessReport {
    pub fn new(source: impl Into<String>, tick: Option<u64>, result: SharpnessResult) -> Self {
        Self {
            source: source.into(),
            tick,
            result,
        }
    }
}

/// Convenience function to serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quality;

    fn pipeline_result() -> PipelineResult {
        PipelineResult {
            processed_image: vec![1, 2, 3],
            image_format: ImageEncoding::Png,
            original_size: ImageSize::new(10, 10),
            processed_size: ImageSize::new(30, 30),
            step_log: vec!["channel: extract blue (10x10)".to_string()],
            total_processing_time_ms: 4.2,
        }
    }

    fn focused() -> SharpnessResult {
        SharpnessResult {
            score: 100.0,
            raw_measure: 950.0,
            quality: Quality::Excellent,
            is_focused: true,
        }
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write(&SharpnessReport::new("frame.png", None, focused()))
            .unwrap();
        assert_eq!(writer.items_written(), 1);

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"source\":\"frame.png\""));
        assert!(output.contains("\"quality\":\"excellent\""));
        assert!(!output.contains("tick"));
    }

    #[test]
    fn test_write_jsonl_ignores_pretty() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        for tick in 1..=3 {
            writer
                .write(&SharpnessReport::new("live.png", Some(tick), focused()))
                .unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("\"tick\":3"));
    }

    #[test]
    fn test_enhance_report_embeds_image_without_output_file() {
        let report = EnhanceReport::new("in.jpg", "full", None, &pipeline_result());
        let json = to_json(&report, false).unwrap();
        assert!(json.contains("\"processed_image\":\"AQID\""));
        assert!(!json.contains("\"output\""));

        let report = EnhanceReport::new("in.jpg", "full", Some("out.png".into()), &pipeline_result());
        let json = to_json(&report, false).unwrap();
        assert!(json.contains("\"output\":\"out.png\""));
        assert!(!json.contains("processed_image"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("JSONL".parse::<OutputFormat>().unwrap(), OutputFormat::JsonLines);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::JsonLines.to_string(), "jsonl");
    }
}
