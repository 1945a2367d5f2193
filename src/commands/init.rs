//! Init command - writes a starter configuration file

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

const STARTER_CONFIG: &str = r#"# tether instance configuration.
#
# `tether start` launches the two daemon programs below, waits for
# each to write its PID file, and supervises the pair from then on.

# Name for this daemon pair. Runtime files (PID files, the transition
# lock, the start-failure marker) live under a tether-<instance>
# directory inside the runtime dir.
instance = "main"

# Shared secret injected into every command sent to the primary
# daemon. Change this before starting anything.
api_key = "change-me"

# Loopback port the primary daemon listens on for commands.
#command_port = 1025

# Loopback port the bridge daemon serves events on. Must differ from
# command_port or the pair refuses to start.
#event_port = 1026

# Log level handed to both daemons.
#log_level = "info"

# Override the directory holding PID files and the transition lock.
#runtime_dir = "/run/tether"

# Override the directory both daemons write their logs to.
#log_dir = "/var/log/tether"

[primary]
program = "/usr/local/bin/tether-primary"
#args = []

[bridge]
program = "/usr/local/bin/tether-bridge"
#args = []
"#;

/// Write a commented starter configuration.
///
/// Refuses to touch an existing file unless `force` is set.
pub fn execute(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(&path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Wrote starter configuration {}",
        "✓".green().bold(),
        path.display().to_string().dimmed()
    );
    println!(
        "{} Edit the daemon programs and api_key, then run {}",
        "→".cyan().bold(),
        "tether start".bold()
    );

    Ok(())
}
