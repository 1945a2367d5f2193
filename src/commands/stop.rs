//! Stop command - gracefully shuts down the daemon pair

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::commands::load_config;
use crate::config::DaemonRole;
use crate::health::DaemonStatus;
use crate::supervisor::Supervisor;

/// Execute the stop command.
///
/// Succeeds whether or not anything was running; a daemon that
/// ignores the termination signal is reported but not force-killed.
pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let supervisor = Supervisor::new(config);

    if surviving_roles(&supervisor.status()).is_empty() {
        println!("{} Daemon pair is not running", "─".dimmed());
        supervisor.stop();
        return Ok(());
    }

    println!("{} Stopping daemon pair...", "→".cyan().bold());
    supervisor.stop();

    let survivors = surviving_roles(&supervisor.status());
    if survivors.is_empty() {
        println!("{} Daemon pair stopped", "✓".green().bold());
    } else {
        for (role, pid) in survivors {
            println!(
                "{} The {} daemon (pid {}) did not exit in time; see the log",
                "✗".red().bold(),
                role,
                pid
            );
        }
    }

    Ok(())
}

/// Roles still holding a live pid. A clean stop leaves none; checking
/// per role catches the case where only one daemon ignored the signal.
fn surviving_roles(status: &DaemonStatus) -> Vec<(DaemonRole, u32)> {
    DaemonRole::BOTH
        .iter()
        .filter_map(|&role| status.pid_for(role).map(|pid| (role, pid)))
        .collect()
}
