//! Full start/status/stop cycles against spawned script daemons

use std::fs;

use tempfile::TempDir;

use tether::config::DaemonRole;
use tether::error::Error;
use tether::process;
use tether::supervisor::Supervisor;

use super::helpers::*;

#[test]
fn test_pair_comes_up_and_stops_clean() {
    let temp = TempDir::new().unwrap();
    let primary = well_behaved_daemon(temp.path(), "primaryd.sh");
    let bridge = well_behaved_daemon(temp.path(), "bridged.sh");
    let config = pair_config(temp.path(), primary, bridge);
    let supervisor = Supervisor::with_config(config.clone(), patient_timing());

    supervisor.start().expect("pair should come up");

    let status = supervisor.status();
    assert!(status.is_running());
    for role in DaemonRole::BOTH {
        let pid = status.pid_for(role).expect("role should have a pid");
        assert!(process::is_alive(pid));

        let recorded = fs::read_to_string(config.pid_path(role)).unwrap();
        assert_eq!(recorded.trim().parse::<u32>().unwrap(), pid);
    }
    assert!(!config.alert_path().exists());

    supervisor.stop();

    assert!(!supervisor.status().is_running());
    for role in DaemonRole::BOTH {
        assert!(!config.pid_path(role).exists());
        assert!(!process::is_alive(status.pid_for(role).unwrap()));
    }
}

#[test]
fn test_restart_replaces_the_running_pair() {
    let temp = TempDir::new().unwrap();
    let primary = well_behaved_daemon(temp.path(), "primaryd.sh");
    let bridge = well_behaved_daemon(temp.path(), "bridged.sh");
    let config = pair_config(temp.path(), primary, bridge);
    let supervisor = Supervisor::with_config(config, patient_timing());

    supervisor.start().expect("first start should succeed");
    let before = supervisor.status();

    supervisor.restart().expect("restart should succeed");
    let after = supervisor.status();

    assert!(after.is_running());
    for role in DaemonRole::BOTH {
        let old = before.pid_for(role).unwrap();
        let new = after.pid_for(role).unwrap();
        assert_ne!(old, new, "{role} daemon should be a fresh process");
        assert!(!process::is_alive(old));
        assert!(process::is_alive(new));
    }

    supervisor.stop();
}

#[test]
fn test_one_broken_role_times_out_and_tears_the_pair_down() {
    let temp = TempDir::new().unwrap();
    let primary = well_behaved_daemon(temp.path(), "primaryd.sh");
    // The bridge role exits immediately without recording a PID, so
    // the pair can never report healthy.
    let config = pair_config(temp.path(), primary, "/bin/true".into());
    let supervisor = Supervisor::with_config(config.clone(), fast_timing());

    let err = supervisor.start().unwrap_err();
    assert!(matches!(err, Error::StartTimeout { .. }));

    // The healthy role was torn down again; nothing keeps running
    // behind a failed start.
    assert!(!supervisor.status().is_running());
    for role in DaemonRole::BOTH {
        assert!(!config.pid_path(role).exists());
    }
    assert!(config.alert_path().exists());
}

#[test]
fn test_stop_leaves_a_sigterm_ignoring_daemon_recorded() {
    let temp = TempDir::new().unwrap();
    let primary = stubborn_daemon(temp.path(), "primaryd.sh");
    let bridge = well_behaved_daemon(temp.path(), "bridged.sh");
    let config = pair_config(temp.path(), primary, bridge);
    let supervisor = Supervisor::with_config(config.clone(), fast_timing());

    supervisor.start().expect("pair should come up");
    let primary_pid = supervisor
        .status()
        .pid_for(DaemonRole::Primary)
        .expect("primary should have a pid");

    supervisor.stop();

    // The cooperative role is gone, file and all. The stubborn one
    // is still alive and its PID file stays behind as the record of
    // the failed termination; no forceful kill is attempted.
    assert!(!config.pid_path(DaemonRole::Bridge).exists());
    assert!(process::is_alive(primary_pid));
    assert!(config.pid_path(DaemonRole::Primary).exists());

    force_kill(primary_pid);
}
