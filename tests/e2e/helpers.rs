//! Test helper functions for E2E tests

use std::fs;
use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use tether::config::{DaemonSpec, InstanceConfig};
use tether::supervisor::SupervisorConfig;

/// A daemon stand-in: parses the standard argument tail, records its
/// own PID where it was told to, then idles like a real daemon.
const WELL_BEHAVED_DAEMON: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --pid) pid_file="$2"; shift 2 ;;
    *) shift ;;
  esac
done
echo $$ > "$pid_file"
exec sleep 60
"#;

/// A daemon that records its PID but ignores SIGTERM. `sleep` runs
/// as a child so the trap set on the shell stays in effect.
const STUBBORN_DAEMON: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --pid) pid_file="$2"; shift 2 ;;
    *) shift ;;
  esac
done
trap '' TERM
echo $$ > "$pid_file"
sleep 60
"#;

/// Write an executable daemon script into `dir`.
pub fn write_daemon_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("Failed to write daemon script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark script executable");
    path
}

/// Write the standard well-behaved daemon script.
pub fn well_behaved_daemon(dir: &Path, name: &str) -> PathBuf {
    write_daemon_script(dir, name, WELL_BEHAVED_DAEMON)
}

/// Write the SIGTERM-ignoring daemon script.
pub fn stubborn_daemon(dir: &Path, name: &str) -> PathBuf {
    write_daemon_script(dir, name, STUBBORN_DAEMON)
}

/// Instance config for a daemon pair rooted in `dir`, on two ports
/// that were free a moment ago.
pub fn pair_config(dir: &Path, primary: PathBuf, bridge: PathBuf) -> InstanceConfig {
    let (command_port, event_port) = two_free_ports();
    let mut config = InstanceConfig::new(
        "e2e",
        "e2e-key",
        DaemonSpec::new(primary),
        DaemonSpec::new(bridge),
    );
    config.command_port = command_port;
    config.event_port = event_port;
    config.runtime_dir = Some(dir.to_path_buf());
    config.log_dir = Some(dir.to_path_buf());
    config
}

/// Two distinct free ports.
pub fn two_free_ports() -> (u16, u16) {
    let a = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    let b = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    (
        a.local_addr().expect("No local addr").port(),
        b.local_addr().expect("No local addr").port(),
    )
}

/// Timings short enough for failure-path tests to finish quickly.
pub fn fast_timing() -> SupervisorConfig {
    SupervisorConfig {
        poll_interval: Duration::from_millis(25),
        start_timeout: Duration::from_millis(500),
        stop_timeout: Duration::from_millis(500),
    }
}

/// Timings for success paths: quick polls, generous ceilings so a
/// loaded CI machine cannot produce a spurious timeout.
pub fn patient_timing() -> SupervisorConfig {
    SupervisorConfig {
        poll_interval: Duration::from_millis(25),
        start_timeout: Duration::from_secs(10),
        stop_timeout: Duration::from_secs(10),
    }
}

/// Force-kill a process the supervisor deliberately left running.
pub fn force_kill(pid: u32) {
    let _ = Command::new("kill")
        .args(["-9", &pid.to_string()])
        .status();

    let deadline = Instant::now() + Duration::from_secs(5);
    while tether::process::is_alive(pid) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(25));
    }
}
