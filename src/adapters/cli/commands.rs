//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the zquote engine.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::replay::{self, TickReader};
use crate::application::Dispatcher;
use crate::config::{load_config, render_instrument, Config, InstrumentConfig};
use crate::strategy::Preset;

/// Default config path when neither --config nor ZQUOTE_CONFIG is given
pub const DEFAULT_CONFIG: &str = "config/zquote.toml";

/// zquote - Z-Score Signal and Quoting Engine
#[derive(Parser, Debug)]
#[command(
    name = "zquote",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Z-score mean reversion signal and quoting engine",
    long_about = "zquote turns order-book snapshots and positions into orders, choosing \
                  between stop-loss, mean-reversion entry/exit and skewed market making \
                  per instrument."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a configuration file
    Check(CheckCmd),

    /// Feed a JSON-lines tick file through the engine
    Replay(ReplayCmd),

    /// List the built-in tuned presets, or print one as TOML
    Presets(PresetsCmd),
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "ZQUOTE_CONFIG", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Replay recorded ticks
#[derive(Parser, Debug)]
pub struct ReplayCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "ZQUOTE_CONFIG", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// JSON-lines tick file
    #[arg(short, long, value_name = "FILE")]
    pub ticks: PathBuf,

    /// Evaluate instruments on parallel threads
    #[arg(long)]
    pub parallel: bool,
}

/// Show presets
#[derive(Parser, Debug)]
pub struct PresetsCmd {
    /// Print this preset as an editable `[instruments.<NAME>]` table
    #[arg(value_enum, value_name = "PRESET")]
    pub name: Option<Preset>,
}

/// Execute the parsed command
pub fn execute(app: CliApp) -> Result<()> {
    match app.command {
        Command::Check(cmd) => {
            let config = load_expanded(&cmd.config)?;
            init_logging(app.verbose, app.debug, Some(&config))?;
            check_command(cmd, config)
        }
        Command::Replay(cmd) => {
            let config = load_expanded(&cmd.config)?;
            init_logging(app.verbose, app.debug, Some(&config))?;
            replay_command(cmd, config)
        }
        Command::Presets(cmd) => {
            init_logging(app.verbose, app.debug, None)?;
            presets_command(cmd)
        }
    }
}

/// Flags win over the config's `[logging] level` (itself overridable by
/// ZQUOTE_LOG_LEVEL). Logs go to stderr; stdout carries replay output.
fn init_logging(verbose: bool, debug: bool, config: Option<&Config>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else if let Some(config) = config {
        EnvFilter::try_new(config.logging.get_level())
            .context("Invalid logging level")?
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).with_writer(io::stderr).init();
    Ok(())
}

/// Expand `~` and env vars, then load the config
pub fn load_expanded(path: &Path) -> Result<Config> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand config path {}", raw))?;
    load_config(&*expanded)
        .with_context(|| format!("Failed to load configuration from {}", expanded))
}

fn check_command(cmd: CheckCmd, config: Config) -> Result<()> {
    // building catches anything validate() cannot see
    let dispatcher = Dispatcher::from_config(&config).context("Failed to build strategies")?;

    println!("Config OK: {}", cmd.config.display());
    println!("  Log level: {}", config.logging.level);
    for (name, instrument) in &config.instruments {
        println!(
            "  {:<12} kind={:<16} max_position={}",
            name,
            instrument.kind(),
            instrument.position_limit()
        );
    }
    if let Some(limit) = dispatcher.position_limit() {
        println!("  Position limit: {}", limit);
    }
    Ok(())
}

fn replay_command(cmd: ReplayCmd, config: Config) -> Result<()> {
    let mut dispatcher = Dispatcher::from_config(&config).context("Failed to build strategies")?;

    let ticks_path = shellexpand::tilde(&cmd.ticks.to_string_lossy()).to_string();
    let ticks = TickReader::open(&ticks_path)
        .with_context(|| format!("Failed to open tick file {}", ticks_path))?;

    tracing::info!(
        "Replaying {} through {} instrument(s)",
        ticks_path,
        dispatcher.len()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = replay::replay(&mut dispatcher, ticks, &mut out, cmd.parallel)
        .context("Replay failed")?;

    eprintln!("{} ticks, {} orders", summary.ticks, summary.orders);
    Ok(())
}

fn presets_command(cmd: PresetsCmd) -> Result<()> {
    if let Some(preset) = cmd.name {
        let name = preset.to_string().to_uppercase();
        let body = render_instrument(&name, &InstrumentConfig::Zscore(preset.config()))
            .with_context(|| format!("Failed to render preset {}", preset))?;
        print!("{}", body);
        return Ok(());
    }

    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "PRESET", "Z_WIN", "VOL_WIN", "ENTRY", "EXIT", "MAX_POS"
    );
    for preset in Preset::ALL {
        let config = preset.config();
        let vol_window = config
            .vol_window
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>8} {:>8} {:>8.2} {:>8.2} {:>8}",
            preset.to_string(),
            config.z_window,
            vol_window,
            config.entry_z,
            config.exit_z,
            config.max_position
        );
    }
    Ok(())
}
