//! Status command - dashboard for the daemon pair

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::load_config;
use crate::config::{DaemonRole, InstanceConfig};
use crate::health::DaemonStatus;
use crate::supervisor::Supervisor;

/// Show the current state of the daemon pair.
pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let supervisor = Supervisor::new(config.clone());
    let status = supervisor.status();

    println!("{}", "tether Status".bold().blue());
    println!("{}", "=".repeat(50));

    println!("\n{}", "Instance".bold());
    println!("  Name:     {}", config.instance);
    println!(
        "  Ports:    command {} / event {}",
        config.command_port, config.event_port
    );
    println!("  Runtime:  {}", config.runtime_dir().display());

    println!("\n{}", "Daemons".bold());
    for role in DaemonRole::BOTH {
        display_role(&config, &status, role);
    }

    println!("\n{}", "Health".bold());
    display_verdict("State", status.is_running());
    display_verdict("Launchable", status.is_launchable());

    display_start_failure(&config.alert_path());

    println!();
    Ok(())
}

fn display_role(config: &InstanceConfig, status: &DaemonStatus, role: DaemonRole) {
    match status.pid_for(role) {
        Some(pid) => {
            let since = pid_file_time(&config.pid_path(role))
                .map(|t| format!("  since {}", t.format("%Y-%m-%d %H:%M:%S")))
                .unwrap_or_default();
            println!(
                "  {} {:8} pid {}{}",
                "✓".green().bold(),
                role.to_string(),
                pid,
                since.dimmed()
            );
        }
        None => {
            println!("  {} {:8} not running", "✗".red().bold(), role.to_string());
        }
    }
}

fn display_verdict(label: &str, ok: bool) {
    let verdict = if ok {
        "ok".green().bold()
    } else {
        "nok".red().bold()
    };
    println!("  {:11} {}", format!("{label}:"), verdict);
}

fn display_start_failure(alert_path: &Path) {
    let Ok(note) = fs::read_to_string(alert_path) else {
        return;
    };
    println!("\n{}", "Last start".bold());
    println!("  {} {}", "⚠".yellow().bold(), note.trim().yellow());
}

/// Modification time of a PID file, as local time. The daemon writes
/// the file right after launch, so this doubles as its start time.
fn pid_file_time(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::from(modified))
}
