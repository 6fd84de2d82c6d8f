//! DataMirror CLI - search, list, inspect, and download datasets from a remote repository.

pub mod commands;
pub mod config;

pub use commands::App;
pub use config::{resolve_output_dir, CliConfig};
