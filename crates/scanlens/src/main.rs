//! ScanLens CLI - focus guidance and OCR pre-processing for document photos.
//!
//! Scores how sharp a document photo is and turns a captured frame into a
//! clean, binarized, upscaled image ready for text recognition.
//!
//! # Usage
//!
//! ```bash
//! # Enhance a capture for OCR
//! scanlens enhance label.jpg -o label.png
//!
//! # Fast preview-quality enhancement
//! scanlens enhance label.jpg --profile quick -o preview.png
//!
//! # Score focus of still images
//! scanlens sharpness shot1.jpg shot2.jpg
//!
//! # Follow a live preview snapshot until it is in focus
//! scanlens monitor /tmp/preview.jpg --until-focused
//!
//! # View configuration
//! scanlens config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// ScanLens - focus guidance and OCR pre-processing for document photos.
#[derive(Parser, Debug)]
#[command(name = "scanlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Enhance a captured image for text recognition
    Enhance(cli::enhance::EnhanceArgs),

    /// Score the focus of still images
    Sharpness(cli::sharpness::SharpnessArgs),

    /// Sample a live snapshot file and report focus on every tick
    Monitor(cli::monitor::MonitorArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match scanlens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `scanlens config path`."
            );
            scanlens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("ScanLens v{}", scanlens_core::VERSION);

    match cli.command {
        Commands::Enhance(args) => cli::enhance::execute(args, config).await,
        Commands::Sharpness(args) => cli::sharpness::execute(args, config).await,
        Commands::Monitor(args) => cli::monitor::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scanlens", "sharpness", "a.png", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Sharpness(_)));
    }

    #[test]
    fn test_monitor_flags() {
        let cli = Cli::try_parse_from([
            "scanlens",
            "monitor",
            "preview.jpg",
            "--interval-ms",
            "250",
            "--ticks",
            "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Monitor(args) => {
                assert_eq!(args.interval_ms, Some(250));
                assert_eq!(args.ticks, Some(4));
                assert!(!args.until_focused);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
