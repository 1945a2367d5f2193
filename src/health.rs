//! Composite liveness status for the daemon pair

use std::fmt;

use crate::config::{DaemonRole, InstanceConfig};
use crate::pidfile::PidStore;

/// Health verdict for one aspect of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Ok,
    Nok,
}

impl HealthState {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthState::Ok)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Ok => write!(f, "ok"),
            HealthState::Nok => write!(f, "nok"),
        }
    }
}

/// Snapshot of the daemon pair at one instant.
///
/// Never cached; every query re-reads PID files and re-checks process
/// existence, since the daemons live and die outside this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonStatus {
    /// Both roles confirmed alive.
    pub state: HealthState,
    /// Configured ports are distinct and non-zero, so a start attempt
    /// is safe.
    pub launchable: HealthState,
    pub primary_pid: Option<u32>,
    pub bridge_pid: Option<u32>,
}

impl DaemonStatus {
    pub fn is_running(&self) -> bool {
        self.state.is_ok()
    }

    pub fn is_launchable(&self) -> bool {
        self.launchable.is_ok()
    }

    pub fn pid_for(&self, role: DaemonRole) -> Option<u32> {
        match role {
            DaemonRole::Primary => self.primary_pid,
            DaemonRole::Bridge => self.bridge_pid,
        }
    }
}

/// Derives [`DaemonStatus`] from the PID file store and the port
/// configuration.
pub struct HealthMonitor {
    config: InstanceConfig,
    store: PidStore,
}

impl HealthMonitor {
    pub fn new(config: &InstanceConfig) -> Self {
        Self {
            store: PidStore::new(config.runtime_dir()),
            config: config.clone(),
        }
    }

    /// Compute the current pair status.
    ///
    /// Stale PID files are reclaimed first, so a role counts as alive
    /// only when its recorded PID names a live process. Cheap enough
    /// to call from a polling loop; the reclaim self-heal is the only
    /// side effect.
    pub fn status(&self) -> DaemonStatus {
        let primary_pid = self.probe_role(DaemonRole::Primary);
        let bridge_pid = self.probe_role(DaemonRole::Bridge);

        let state = if primary_pid.is_some() && bridge_pid.is_some() {
            HealthState::Ok
        } else {
            HealthState::Nok
        };
        let launchable = if self.config.ports_valid() {
            HealthState::Ok
        } else {
            HealthState::Nok
        };

        DaemonStatus {
            state,
            launchable,
            primary_pid,
            bridge_pid,
        }
    }

    fn probe_role(&self, role: DaemonRole) -> Option<u32> {
        self.store.reclaim(role);
        self.store.read(role)
    }
}
