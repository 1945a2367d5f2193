//! Liveness probing and graceful termination for supervised daemons

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Check whether a process with the given PID exists.
///
/// Sends the null signal, which delivers nothing but makes the kernel
/// report existence: `Ok` and `EPERM` both mean the process is there,
/// `ESRCH` means it is gone. PIDs above `i32::MAX` cannot name a real
/// process and count as dead.
pub fn is_alive(pid: u32) -> bool {
    let pid_i32 = match i32::try_from(pid) {
        Ok(v) => v,
        Err(_) => return false,
    };

    match kill(Pid::from_raw(pid_i32), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => false,
    }
}

/// Ask a process to exit with SIGTERM.
///
/// Returns false when the signal could not be delivered, typically
/// because the process already exited. Never escalates to SIGKILL;
/// callers poll [`is_alive`] to confirm the exit.
pub fn terminate(pid: u32) -> bool {
    let pid_i32 = match i32::try_from(pid) {
        Ok(v) => v,
        Err(_) => return false,
    };

    kill(Pid::from_raw(pid_i32), Signal::SIGTERM).is_ok()
}
