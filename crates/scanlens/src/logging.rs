//! Logging initialization.
//!
//! Logs always go to stderr: stdout carries JSON reports and JSONL monitor
//! ticks that other programs parse.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `level` is the default filter directive (`info`, `debug`, ...). The
/// `RUST_LOG` environment variable overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section, with CLI overrides.
pub fn init_from_config(
    config: &scanlens_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let (level, json_format) = resolve(config, verbose_override, json_logs_override);
    init(level, json_format);
}

/// Effective level and format. `--verbose` never lowers a `trace` config.
fn resolve(config: &scanlens_core::Config, verbose: bool, json_logs: bool) -> (&str, bool) {
    let level = match config.logging.level.as_str() {
        "trace" => "trace",
        _ if verbose => "debug",
        configured => configured,
    };
    (level, json_logs || config.logging.format == "json")
}
