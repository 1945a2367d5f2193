//! Instance configuration for the supervised daemon pair

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default loopback port the primary daemon listens on for commands.
pub const DEFAULT_COMMAND_PORT: u16 = 1025;

/// Default loopback port the bridge daemon serves events on.
pub const DEFAULT_EVENT_PORT: u16 = 1026;

/// File name the CLI looks for when no config path is given.
pub const CONFIG_FILE_NAME: &str = "tether.toml";

/// Which half of the daemon pair a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonRole {
    Primary,
    Bridge,
}

impl DaemonRole {
    /// Both roles, in start order.
    pub const BOTH: [DaemonRole; 2] = [DaemonRole::Primary, DaemonRole::Bridge];

    pub fn pid_file_name(&self) -> &'static str {
        match self {
            DaemonRole::Primary => "primary.pid",
            DaemonRole::Bridge => "bridge.pid",
        }
    }

    pub fn log_file_name(&self) -> &'static str {
        match self {
            DaemonRole::Primary => "primary.log",
            DaemonRole::Bridge => "bridge.log",
        }
    }
}

impl fmt::Display for DaemonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonRole::Primary => write!(f, "primary"),
            DaemonRole::Bridge => write!(f, "bridge"),
        }
    }
}

/// How to launch one daemon.
///
/// The supervisor appends the standard argument tail (instance name,
/// log level, port, api key, pid file path) after `args`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonSpec {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl DaemonSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

/// Everything needed to supervise and talk to one daemon pair.
///
/// Loaded from a TOML file; port and directory defaults are resolved
/// here, once, so the rest of the crate never re-derives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Instance identifier; names the runtime directory and the
    /// event callback path handed to clients.
    pub instance: String,
    #[serde(default = "default_command_port")]
    pub command_port: u16,
    #[serde(default = "default_event_port")]
    pub event_port: u16,
    /// Token injected into every outbound command and handed to the
    /// spawned daemons.
    pub api_key: String,
    pub primary: DaemonSpec,
    pub bridge: DaemonSpec,
    /// Overrides the per-instance runtime directory (pid files,
    /// transition lock, start-failure marker).
    #[serde(default)]
    pub runtime_dir: Option<PathBuf>,
    /// Overrides where daemon stdout/stderr is captured.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_command_port() -> u16 {
    DEFAULT_COMMAND_PORT
}

fn default_event_port() -> u16 {
    DEFAULT_EVENT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl InstanceConfig {
    pub fn new(
        instance: impl Into<String>,
        api_key: impl Into<String>,
        primary: DaemonSpec,
        bridge: DaemonSpec,
    ) -> Self {
        Self {
            instance: instance.into(),
            command_port: DEFAULT_COMMAND_PORT,
            event_port: DEFAULT_EVENT_PORT,
            api_key: api_key.into(),
            primary,
            bridge,
            runtime_dir: None,
            log_dir: None,
            log_level: default_log_level(),
        }
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Both ports set and distinct. A pair that fails this cannot be
    /// started.
    pub fn ports_valid(&self) -> bool {
        self.command_port != 0 && self.event_port != 0 && self.command_port != self.event_port
    }

    pub fn port_for(&self, role: DaemonRole) -> u16 {
        match role {
            DaemonRole::Primary => self.command_port,
            DaemonRole::Bridge => self.event_port,
        }
    }

    pub fn spec_for(&self, role: DaemonRole) -> &DaemonSpec {
        match role {
            DaemonRole::Primary => &self.primary,
            DaemonRole::Bridge => &self.bridge,
        }
    }

    /// Directory holding pid files, the transition lock and the
    /// start-failure marker for this instance.
    pub fn runtime_dir(&self) -> PathBuf {
        self.runtime_dir.clone().unwrap_or_else(|| {
            dirs::runtime_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(format!("tether-{}", self.instance))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| self.runtime_dir())
    }

    pub fn pid_path(&self, role: DaemonRole) -> PathBuf {
        self.runtime_dir().join(role.pid_file_name())
    }

    pub fn log_path(&self, role: DaemonRole) -> PathBuf {
        self.log_dir().join(role.log_file_name())
    }

    /// Marker left behind when a start attempt times out.
    pub fn alert_path(&self) -> PathBuf {
        self.runtime_dir().join("start-failed")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.runtime_dir().join("supervisor.lock")
    }

    /// Websocket URL clients use to receive events from the bridge
    /// daemon.
    pub fn callback_url(&self) -> String {
        format!("ws://127.0.0.1:{}/{}", self.event_port, self.instance)
    }
}
