//! Restart command - stop followed by start

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::commands::load_config;
use crate::supervisor::Supervisor;

/// Execute the restart command. Start already replaces a running
/// pair, so this is a labelled alias for it.
pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let supervisor = Supervisor::new(config);

    println!(
        "{} Restarting daemon pair for instance {}...",
        "→".cyan().bold(),
        supervisor.config().instance.bold()
    );
    supervisor.restart()?;

    println!("{} Daemon pair is up", "✓".green().bold());
    Ok(())
}
