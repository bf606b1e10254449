//! zquote - Z-Score Signal and Quoting Engine
//!
//! Validates configurations and replays recorded ticks through the engine.

use anyhow::Result;

use zquote::adapters::cli;

fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app)
}
