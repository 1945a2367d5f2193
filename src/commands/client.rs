//! Client commands - register and remove broker connections

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::bridge::CommandBridge;
use crate::command::BrokerOptions;
use crate::commands::load_config;

/// Register a broker connection with the primary daemon.
pub fn add(
    config_path: Option<PathBuf>,
    id: String,
    hostname: String,
    options: BrokerOptions,
) -> Result<()> {
    let config = load_config(config_path)?;
    let bridge = CommandBridge::new(config);

    bridge.new_client(&id, &hostname, &options)?;

    println!(
        "{} Registered broker connection {} ({})",
        "✓".green().bold(),
        id.bold(),
        hostname.dimmed()
    );
    Ok(())
}

/// Tear down a broker connection.
pub fn remove(config_path: Option<PathBuf>, id: String) -> Result<()> {
    let config = load_config(config_path)?;
    let bridge = CommandBridge::new(config);

    bridge.remove_client(&id)?;

    println!(
        "{} Removed broker connection {}",
        "✓".green().bold(),
        id.bold()
    );
    Ok(())
}
