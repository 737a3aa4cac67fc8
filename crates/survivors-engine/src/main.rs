//! # Survivors
//!
//! Headless runner for the survivors simulation. Loads the game and spawn
//! configuration, then plays a bounded number of frames with the autopilot
//! and prints a JSON summary.
//!
//! ```text
//! survivors [CONFIG] [TICKS]
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod autopilot;
mod runner;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use survivors_gameplay::config::{GameConfig, CONFIG_FILE};
use survivors_gameplay::spawn::{SpawnTable, SPAWN_TABLE_FILE};

use crate::autopilot::AutopilotConfig;
use crate::runner::DEFAULT_TICKS;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("survivors=info".parse()?))
        .init();

    info!("Survivors {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| CONFIG_FILE.to_string());
    let ticks = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid tick count: {raw}"))?,
        None => DEFAULT_TICKS,
    };

    let config = GameConfig::load_from(&config_path);
    let spawn_table = SpawnTable::load_or_default(SPAWN_TABLE_FILE);

    let summary = runner::run(config, spawn_table, ticks, AutopilotConfig::default());
    let json = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
    println!("{json}");

    Ok(())
}
