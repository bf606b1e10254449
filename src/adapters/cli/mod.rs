//! CLI Adapter
//!
//! Command-line interface for the zquote engine.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, CheckCmd, PresetsCmd, ReplayCmd, DEFAULT_CONFIG, execute, load_expanded};

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
