//! Subcommand implementations.

pub mod config;
pub mod enhance;
pub mod monitor;
pub mod sharpness;
pub mod types;
