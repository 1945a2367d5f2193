use std::time::Duration;

use thiserror::Error;

use crate::config::DaemonRole;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid port configuration: command port {command_port}, event port {event_port} (ports must be non-zero and distinct)")]
    Configuration { command_port: u16, event_port: u16 },

    #[error("port {port} required by the {role} daemon is already in use{}", conflict_detail(.pid, .command))]
    PortConflict {
        role: DaemonRole,
        port: u16,
        pid: Option<u32>,
        command: Option<String>,
    },

    #[error("daemons did not become healthy within {:.1}s", .waited.as_secs_f64())]
    StartTimeout { waited: Duration },

    #[error("daemons are not running")]
    NotRunning,

    #[error("failed to deliver command to 127.0.0.1:{port}")]
    Send {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file {path}: {detail}")]
    Config { path: String, detail: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn conflict_detail(pid: &Option<u32>, command: &Option<String>) -> String {
    match (pid, command) {
        (Some(pid), Some(command)) => format!(" by pid {pid} ({command})"),
        (Some(pid), None) => format!(" by pid {pid}"),
        _ => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
