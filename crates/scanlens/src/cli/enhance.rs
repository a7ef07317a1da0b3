//! The `scanlens enhance` command for preparing a capture for OCR.

use clap::Args;
use scanlens_core::{
    Config, EnhanceReport, EnhancementPipeline, OutputFormat as CoreOutputFormat, OutputWriter,
    PipelineConfig, Profile,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use super::types::{ChannelArg, ProfileArg};

/// Arguments for the `enhance` command.
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Captured image to enhance
    #[arg(required = true)]
    pub input: PathBuf,

    /// Write the processed image here (report then omits the image bytes)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Stage profile (defaults to `enhance.profile` from the config)
    #[arg(short, long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Override the profile's scale factor
    #[arg(long)]
    pub scale: Option<f32>,

    /// Source channel (defaults to `enhance.channel` from the config)
    #[arg(long, value_enum)]
    pub channel: Option<ChannelArg>,

    /// Skip the denoise stage
    #[arg(long)]
    pub no_denoise: bool,

    /// Denoise with a Gaussian blur instead of the bilateral filter
    #[arg(long)]
    pub simple_denoise: bool,

    /// Skip adaptive thresholding
    #[arg(long)]
    pub no_threshold: bool,

    /// Skip opening/closing cleanup
    #[arg(long)]
    pub no_morphology: bool,

    /// Skip sharpening
    #[arg(long)]
    pub no_sharpen: bool,

    /// Record per-stage timings in the step log
    #[arg(long)]
    pub debug: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl EnhanceArgs {
    /// The profile in effect for this run.
    pub fn profile(&self, config: &Config) -> Profile {
        self.profile
            .map(Profile::from)
            .unwrap_or(config.enhance.profile)
    }

    /// Expand the profile and apply the per-stage overrides.
    pub fn pipeline_config(&self, config: &Config) -> PipelineConfig {
        let mut options = self.profile(config).config();
        if let Some(scale) = self.scale {
            options.scale_factor = scale;
        }
        if self.no_denoise {
            options.denoise = false;
        }
        if self.simple_denoise {
            options.use_edge_preserving_denoise = false;
        }
        if self.no_threshold {
            options.adaptive_threshold = false;
        }
        if self.no_morphology {
            options.morphology = false;
        }
        if self.no_sharpen {
            options.sharpen = false;
        }
        options.debug = self.debug;
        options
    }
}

/// Execute the enhance command.
pub async fn execute(args: EnhanceArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(channel) = args.channel {
        config.enhance.channel = channel.into();
    }
    let options = args.pipeline_config(&config);
    let profile = args.profile(&config);

    let bytes = tokio::fs::read(&args.input)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", args.input.display()))?;
    tracing::info!(
        "Enhancing {} with the {} profile",
        args.input.display(),
        profile
    );

    let pipeline = EnhancementPipeline::new(&config);
    let result =
        tokio::task::spawn_blocking(move || pipeline.process_bytes(&bytes, &options)).await??;

    if let Some(path) = &args.output {
        tokio::fs::write(path, &result.processed_image).await?;
        tracing::info!(
            "Wrote {} ({}) to {}",
            result.processed_size,
            result.image_format.extension(),
            path.display()
        );
    }

    let report = EnhanceReport::new(
        args.input.display().to_string(),
        profile.to_string(),
        args.output.as_ref().map(|p| p.display().to_string()),
        &result,
    );
    let pretty = args.pretty || config.output.pretty;

    match &args.report {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = OutputWriter::new(BufWriter::new(file), CoreOutputFormat::Json, pretty);
            writer.write(&report)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), CoreOutputFormat::Json, pretty);
            writer.write(&report)?;
            writer.flush()?;
        }
    }

    Ok(())
}
