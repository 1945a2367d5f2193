//! PID file store: the durable record of what was started

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::DaemonRole;
use crate::process;

/// Reads, validates and removes the per-role PID files under one
/// instance's runtime directory.
///
/// The files themselves are written by the spawned daemons; this store
/// only consumes them. A file naming a dead process is stale and gets
/// deleted by [`reclaim`](PidStore::reclaim), so after a reclaim a
/// readable PID is a live PID.
pub struct PidStore {
    dir: PathBuf,
}

impl PidStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, role: DaemonRole) -> PathBuf {
        self.dir.join(role.pid_file_name())
    }

    /// Create the runtime directory so spawned daemons have somewhere
    /// to write their PID files.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Parse the recorded PID for a role. `None` when the file is
    /// absent or does not contain a decimal integer.
    pub fn read(&self, role: DaemonRole) -> Option<u32> {
        read_pid(&self.path(role))
    }

    /// Delete the role's PID file if it names a process that is no
    /// longer alive. Idempotent; a missing file is a no-op.
    pub fn reclaim(&self, role: DaemonRole) {
        if let Some(pid) = self.read(role) {
            if !process::is_alive(pid) {
                debug!("Reclaiming stale pid file for {} (pid {} is gone)", role, pid);
                remove_logged(&self.path(role));
            }
        }
    }

    /// Unconditional best-effort delete, used after a confirmed stop.
    pub fn remove(&self, role: DaemonRole) {
        remove_logged(&self.path(role));
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| content.trim().parse().ok())
}

// Cleanup must never abort a start/stop sequence.
fn remove_logged(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Could not remove pid file {}: {}", path.display(), e);
        }
    }
}
