//! Pre-flight discovery of which process holds a TCP port
//!
//! Used before binding a daemon to a configured port so a conflict can
//! be reported with the offending process instead of a bare bind error.
//! The answer is a snapshot and can be stale by the time anything
//! binds; the later bind failure is the authoritative signal.

#[cfg(target_os = "linux")]
use std::fs;
#[cfg(target_os = "macos")]
use std::process::Command;

/// Whichever process currently holds a TCP listen port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOwner {
    pub port: u16,
    /// Absent when the socket exists but its owner could not be
    /// resolved (typically a permissions limit).
    pub pid: Option<u32>,
    /// Owner's command line, for diagnostics.
    pub command: Option<String>,
}

/// Find the process listening on a local TCP port.
///
/// `None` means the port is free as far as this process can tell; that
/// is the normal pre-flight result, not an error.
#[cfg(target_os = "linux")]
pub fn find_owner(port: u16) -> Option<PortOwner> {
    let inode = find_listen_inode(port)?;
    let (pid, command) = match find_socket_owner(inode) {
        Some(pid) => (Some(pid), read_command_line(pid)),
        None => (None, None),
    };
    Some(PortOwner { port, pid, command })
}

/// Scan the kernel TCP tables for a LISTEN socket bound to `port` and
/// return its socket inode.
#[cfg(target_os = "linux")]
fn find_listen_inode(port: u16) -> Option<u64> {
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        let content = match fs::read_to_string(table) {
            Ok(c) => c,
            Err(_) => continue,
        };

        for line in content.lines().skip(1) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 10 {
                continue;
            }

            // Connection state 0A is LISTEN
            if parts[3] != "0A" {
                continue;
            }

            // local_address is hex ip:port
            let local_port = parts[1]
                .rsplit(':')
                .next()
                .and_then(|hex| u16::from_str_radix(hex, 16).ok());
            if local_port != Some(port) {
                continue;
            }

            if let Ok(inode) = parts[9].parse() {
                return Some(inode);
            }
        }
    }

    None
}

/// Walk /proc/<pid>/fd looking for the process holding a socket inode.
#[cfg(target_os = "linux")]
fn find_socket_owner(inode: u64) -> Option<u32> {
    let target = format!("socket:[{inode}]");
    let entries = fs::read_dir("/proc").ok()?;

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let pid: u32 = match file_name.to_string_lossy().parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        let fds = match fs::read_dir(entry.path().join("fd")) {
            Ok(fds) => fds,
            Err(_) => continue,
        };

        for fd in fds.flatten() {
            if let Ok(link) = fs::read_link(fd.path()) {
                if link.to_string_lossy() == target {
                    return Some(pid);
                }
            }
        }
    }

    None
}

#[cfg(target_os = "linux")]
fn read_command_line(pid: u32) -> Option<String> {
    let cmdline = fs::read_to_string(format!("/proc/{pid}/cmdline")).ok()?;
    // cmdline uses null bytes as separators
    let command = cmdline.replace('\0', " ").trim().to_string();
    if command.is_empty() {
        None
    } else {
        Some(command)
    }
}

/// Find the process listening on a local TCP port (macOS).
#[cfg(target_os = "macos")]
pub fn find_owner(port: u16) -> Option<PortOwner> {
    let output = Command::new("lsof")
        .args(["-t", "-n", &format!("-iTCP:{port}"), "-sTCP:LISTEN"])
        .output()
        .ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let pid: u32 = stdout.lines().next()?.trim().parse().ok()?;

    Some(PortOwner {
        port,
        pid: Some(pid),
        command: read_command_line(pid),
    })
}

#[cfg(target_os = "macos")]
fn read_command_line(pid: u32) -> Option<String> {
    let output = Command::new("ps")
        .args(["-p", &pid.to_string(), "-o", "command="])
        .output()
        .ok()?;

    let command = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if command.is_empty() {
        None
    } else {
        Some(command)
    }
}
