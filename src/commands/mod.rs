//! CLI command implementations
//!
//! Each submodule maps to one `tether` subcommand. Commands resolve
//! the instance configuration, drive the library types and print
//! human-readable results; all daemon logic lives in the library
//! modules.

pub mod client;
pub mod init;
pub mod restart;
pub mod start;
pub mod status;
pub mod stop;
pub mod topic;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{InstanceConfig, CONFIG_FILE_NAME};

/// Resolve the configuration file path for a command invocation.
///
/// An explicit `--config` path always wins. Otherwise `tether.toml`
/// in the current directory is preferred, then the per-user config
/// directory. When nothing exists the local name is returned so the
/// load error points at the place most users expect.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    if let Some(dir) = dirs::config_dir() {
        let global = dir.join("tether").join(CONFIG_FILE_NAME);
        if global.exists() {
            return global;
        }
    }

    local
}

/// Load the instance configuration a command should operate on.
pub fn load_config(explicit: Option<PathBuf>) -> Result<InstanceConfig> {
    let path = resolve_config_path(explicit);
    let config = InstanceConfig::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok(config)
}
