//! Start command - brings up the daemon pair

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::commands::load_config;
use crate::config::DaemonRole;
use crate::supervisor::Supervisor;

/// Execute the start command.
///
/// Any previously running pair is replaced; the call blocks until
/// both daemons report healthy or the start ceiling is hit.
pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let supervisor = Supervisor::new(config);

    println!(
        "{} Starting daemon pair for instance {}...",
        "→".cyan().bold(),
        supervisor.config().instance.bold()
    );
    supervisor.start()?;

    let status = supervisor.status();
    println!("{} Daemon pair is up", "✓".green().bold());
    for role in DaemonRole::BOTH {
        if let Some(pid) = status.pid_for(role) {
            println!("  {} pid {}", format!("{:8}", role.to_string()).bold(), pid);
        }
    }

    Ok(())
}
