//! Start/stop orchestration for the daemon pair
//!
//! The supervisor never owns the daemons it launches: they detach,
//! write their own PID files and outlive this process. Everything here
//! works against that shared filesystem state, which is why start and
//! stop are bounded polling loops rather than waits on a child handle.

use std::fs::{self, File};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use fs2::FileExt;
use tracing::{debug, info, warn};

use crate::config::{DaemonRole, InstanceConfig};
use crate::error::{Error, Result};
use crate::health::{DaemonStatus, HealthMonitor};
use crate::pidfile::PidStore;
use crate::probe;
use crate::process;

/// Timing knobs for the supervisor's bounded waits.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Delay between liveness polls.
    pub poll_interval: Duration,
    /// Ceiling on waiting for the pair to come up.
    pub start_timeout: Duration,
    /// Ceiling on waiting for a signalled daemon to exit.
    pub stop_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            start_timeout: Duration::from_secs(10),
            stop_timeout: Duration::from_secs(10),
        }
    }
}

/// Launches, monitors and terminates the two daemon roles of one
/// instance.
pub struct Supervisor {
    config: InstanceConfig,
    timing: SupervisorConfig,
    monitor: HealthMonitor,
    store: PidStore,
}

impl Supervisor {
    /// Create a supervisor with the standard timing (250 ms polls,
    /// 10 s ceilings).
    pub fn new(config: InstanceConfig) -> Self {
        Self::with_config(config, SupervisorConfig::default())
    }

    pub fn with_config(config: InstanceConfig, timing: SupervisorConfig) -> Self {
        let monitor = HealthMonitor::new(&config);
        let store = PidStore::new(config.runtime_dir());
        Self {
            config,
            timing,
            monitor,
            store,
        }
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Current pair status, recomputed on every call.
    pub fn status(&self) -> DaemonStatus {
        self.monitor.status()
    }

    /// Bring both daemons up, replacing whatever ran before.
    ///
    /// Always begins with a stop, so it can be retried after any
    /// failure without manual cleanup. Fails before spawning anything
    /// when the port configuration is invalid or a foreign process
    /// already holds a required port; fails after a bounded wait when
    /// the spawned pair never reports healthy. The failure paths leave
    /// both roles stopped, never a half-running pair.
    pub fn start(&self) -> Result<()> {
        self.store.ensure_dir()?;
        let _lock = self.transition_lock();

        self.stop_both();

        let status = self.monitor.status();
        if !status.is_launchable() {
            return Err(Error::Configuration {
                command_port: self.config.command_port,
                event_port: self.config.event_port,
            });
        }

        for role in DaemonRole::BOTH {
            let port = self.config.port_for(role);
            if let Some(owner) = probe::find_owner(port) {
                return Err(Error::PortConflict {
                    role,
                    port,
                    pid: owner.pid,
                    command: owner.command,
                });
            }
        }

        for role in DaemonRole::BOTH {
            let program = &self.config.spec_for(role).program;
            if which::which(program).is_err() {
                warn!(
                    "{} daemon program {} does not resolve to an executable",
                    role,
                    program.display()
                );
            }
        }

        // A failed spawn is not fatal here; the missing role keeps the
        // health poll at nok and the timeout path reports it.
        for role in DaemonRole::BOTH {
            if let Err(e) = self.spawn_role(role) {
                warn!("Could not spawn {} daemon: {}", role, e);
            }
        }

        let deadline = Instant::now() + self.timing.start_timeout;
        loop {
            if self.monitor.status().is_running() {
                info!("Daemon pair is up for instance {}", self.config.instance);
                self.clear_start_failure();
                return Ok(());
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(self.timing.poll_interval);
        }

        // Tear down whichever role did come up so a retry starts clean.
        self.stop_both();
        self.record_start_failure();
        Err(Error::StartTimeout {
            waited: self.timing.start_timeout,
        })
    }

    /// Terminate both daemons gracefully.
    ///
    /// Never fails outward: a role without a PID file is already
    /// stopped, and a daemon that ignores SIGTERM is left behind with
    /// a warning. Its PID file stays, so the next start's port check
    /// reports it rather than silently spawning a duplicate.
    pub fn stop(&self) {
        let _lock = self.transition_lock();
        self.stop_both();
    }

    /// Stop followed by start, as one call.
    pub fn restart(&self) -> Result<()> {
        self.start()
    }

    fn stop_both(&self) {
        for role in DaemonRole::BOTH {
            self.stop_role(role);
        }
    }

    fn stop_role(&self, role: DaemonRole) {
        let Some(pid) = self.store.read(role) else {
            return;
        };

        if process::is_alive(pid) {
            debug!("Stopping {} daemon (pid {})", role, pid);
            process::terminate(pid);
        }

        let deadline = Instant::now() + self.timing.stop_timeout;
        loop {
            if !process::is_alive(pid) {
                self.store.remove(role);
                return;
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(self.timing.poll_interval);
        }

        warn!(
            "{} daemon (pid {}) did not exit within {:?}, giving up",
            role, pid, self.timing.stop_timeout
        );
    }

    fn spawn_role(&self, role: DaemonRole) -> std::io::Result<()> {
        let spec = self.config.spec_for(role);
        fs::create_dir_all(self.config.log_dir())?;
        let log = File::options()
            .create(true)
            .append(true)
            .open(self.config.log_path(role))?;
        let log_err = log.try_clone()?;

        let child = Command::new(&spec.program)
            .args(&spec.args)
            .arg("--instance")
            .arg(&self.config.instance)
            .arg("--loglevel")
            .arg(&self.config.log_level)
            .arg("--socketport")
            .arg(self.config.port_for(role).to_string())
            .arg("--apikey")
            .arg(&self.config.api_key)
            .arg("--pid")
            .arg(self.config.pid_path(role))
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .spawn()?;

        info!("Spawned {} daemon (pid {})", role, child.id());

        // Reap the child whenever it exits so it cannot linger as a
        // zombie while this process stays alive.
        thread::spawn(move || {
            let mut child = child;
            let _ = child.wait();
        });

        Ok(())
    }

    /// Advisory lock serializing start/stop transitions across
    /// processes. Best-effort: on failure the transition proceeds
    /// unlocked with a warning.
    fn transition_lock(&self) -> Option<File> {
        let path = self.config.lock_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let file = match File::options().write(true).create(true).open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Could not open transition lock {}: {}", path.display(), e);
                return None;
            }
        };

        match file.lock_exclusive() {
            Ok(()) => Some(file),
            Err(e) => {
                warn!("Could not lock transitions for {}: {}", self.config.instance, e);
                None
            }
        }
    }

    fn record_start_failure(&self) {
        let path = self.config.alert_path();
        let note = format!("daemon start failed at {}\n", Local::now().to_rfc3339());
        if let Err(e) = fs::write(&path, note) {
            warn!("Could not record start failure at {}: {}", path.display(), e);
        }
    }

    fn clear_start_failure(&self) {
        if let Err(e) = fs::remove_file(self.config.alert_path()) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not clear start-failure marker: {}", e);
            }
        }
    }
}
