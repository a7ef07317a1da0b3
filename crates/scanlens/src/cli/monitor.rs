//! The `scanlens monitor` command for live focus guidance.
//!
//! Watches a snapshot file that a capture process keeps overwriting (for
//! example `ffmpeg -update 1 preview.jpg`) and emits one JSON line per tick.

use clap::Args;
use scanlens_core::{
    Config, Frame, FrameSource, ImageDecoder, OutputFormat as CoreOutputFormat, OutputWriter,
    PipelineError, SharpnessMonitor, SharpnessReport,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Arguments for the `monitor` command.
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Snapshot file to sample on every tick
    #[arg(required = true)]
    pub input: PathBuf,

    /// Milliseconds between ticks (defaults to `monitor.interval_ms`)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many ticks
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Stop at the first in-focus frame
    #[arg(long)]
    pub until_focused: bool,
}

/// A frame source backed by a file on disk.
///
/// A missing or half-written snapshot reports zero dimensions, which the
/// monitor turns into a degraded tick instead of an error.
pub struct SnapshotSource {
    path: PathBuf,
    decoder: ImageDecoder,
}

impl SnapshotSource {
    pub fn new(path: PathBuf, decoder: ImageDecoder) -> Self {
        Self { path, decoder }
    }
}

impl FrameSource for SnapshotSource {
    fn dimensions(&self) -> (u32, u32) {
        image::image_dimensions(&self.path).unwrap_or((0, 0))
    }

    fn capture(&self) -> Result<Frame, PipelineError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            PipelineError::invalid_input(format!("Cannot read {}: {e}", self.path.display()))
        })?;
        self.decoder.decode(&bytes)
    }
}

/// Execute the monitor command.
pub async fn execute(args: MonitorArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(interval_ms) = args.interval_ms {
        config.monitor.interval_ms = interval_ms;
    }
    let monitor = SharpnessMonitor::from_config(&config)?;

    let source: Arc<dyn FrameSource> = Arc::new(SnapshotSource::new(
        args.input.clone(),
        ImageDecoder::new(config.limits.clone()),
    ));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = monitor.start(source, move |result| {
        // The receiver only goes away while we are shutting down.
        let _ = tx.send(result);
    });
    tracing::info!(
        "Monitoring {} every {:?} (Ctrl-C to stop)",
        args.input.display(),
        monitor.interval()
    );

    let source_name = args.input.display().to_string();
    let mut writer = OutputWriter::new(std::io::stdout(), CoreOutputFormat::JsonLines, false);
    let mut tick = 0u64;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
            received = rx.recv() => {
                let Some(result) = received else { break };
                tick += 1;
                writer.write(&SharpnessReport::new(source_name.clone(), Some(tick), result))?;
                writer.flush()?;

                if args.until_focused && result.is_focused {
                    tracing::info!("In focus after {tick} tick(s)");
                    break;
                }
                if args.ticks.is_some_and(|limit| tick >= limit) {
                    break;
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use scanlens_core::config::LimitsConfig;
    use std::time::Duration;

    fn source(path: PathBuf) -> SnapshotSource {
        SnapshotSource::new(path, ImageDecoder::new(LimitsConfig::default()))
    }

    #[test]
    fn test_missing_snapshot_has_no_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = source(dir.path().join("preview.png"));
        assert_eq!(snapshot.dimensions(), (0, 0));
        assert!(snapshot.capture().is_err());
    }

    #[test]
    fn test_reads_current_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        GrayImage::from_pixel(12, 8, Luma([100])).save(&path).unwrap();

        let snapshot = source(path.clone());
        assert_eq!(snapshot.dimensions(), (12, 8));

        GrayImage::from_pixel(20, 10, Luma([100])).save(&path).unwrap();
        let frame = snapshot.capture().unwrap();
        assert_eq!((frame.width(), frame.height()), (20, 10));
    }

    #[tokio::test]
    async fn test_execute_stops_after_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        GrayImage::from_pixel(16, 16, Luma([80])).save(&path).unwrap();

        let args = MonitorArgs {
            input: path,
            interval_ms: Some(5),
            ticks: Some(3),
            until_focused: false,
        };
        tokio::time::timeout(Duration::from_secs(10), execute(args, Config::default()))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_execute_rejects_zero_interval() {
        let args = MonitorArgs {
            input: PathBuf::from("preview.png"),
            interval_ms: Some(0),
            ticks: Some(1),
            until_focused: false,
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("interval"));
    }
}
