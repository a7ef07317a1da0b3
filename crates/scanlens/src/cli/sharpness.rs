//! The `scanlens sharpness` command for scoring still images.

use clap::Args;
use scanlens_core::{Config, ImageDecoder, OutputWriter, SharpnessAnalyzer, SharpnessReport};
use std::path::{Path, PathBuf};

use super::types::OutputFormat;

/// Arguments for the `sharpness` command.
#[derive(Args, Debug)]
pub struct SharpnessArgs {
    /// Image files to score
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Side of the centered crop (defaults to `sharpness.sample_size`)
    #[arg(long)]
    pub sample_size: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the sharpness command.
///
/// Unreadable files are logged and skipped; the command fails only when no
/// file could be scored.
pub async fn execute(args: SharpnessArgs, config: Config) -> anyhow::Result<()> {
    let analyzer = SharpnessAnalyzer::new(config.sharpness.clone());
    let decoder = ImageDecoder::new(config.limits.clone());
    let sample_size = args.sample_size.unwrap_or(config.sharpness.sample_size);

    let mut writer = OutputWriter::new(
        std::io::stdout(),
        args.format.into(),
        args.pretty || config.output.pretty,
    );

    for path in &args.inputs {
        match score(&analyzer, &decoder, path, sample_size).await {
            Ok(report) => writer.write(&report)?,
            Err(e) => tracing::warn!("Skipping {}: {e}", path.display()),
        }
    }
    writer.flush()?;

    if writer.items_written() == 0 {
        anyhow::bail!("No image could be scored");
    }
    tracing::debug!("Scored {} of {} image(s)", writer.items_written(), args.inputs.len());
    Ok(())
}

async fn score(
    analyzer: &SharpnessAnalyzer,
    decoder: &ImageDecoder,
    path: &Path,
    sample_size: u32,
) -> anyhow::Result<SharpnessReport> {
    let bytes = tokio::fs::read(path).await?;
    let frame = decoder.decode(&bytes)?;
    let result = analyzer.compute_with_sample(&frame, sample_size)?;
    Ok(SharpnessReport::new(path.display().to_string(), None, result))
}
