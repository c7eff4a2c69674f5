//! Thin wrappers over `kill(2)` for a process id read back from disk.

#[cfg(unix)]
use nix::{
    errno::Errno,
    sys::signal::{kill, Signal},
    unistd::Pid,
};

/// Sends `SIGTERM`. Returns `false` when the signal could not be delivered,
/// which in practice means the process is already gone.
#[cfg(unix)]
pub fn terminate(pid: i32) -> bool {
    send(pid, Some(Signal::SIGTERM)).is_ok()
}

/// Checks for a process with signal 0.
#[cfg(unix)]
pub fn is_alive(pid: i32) -> bool {
    // EPERM: the process exists but belongs to someone else.
    matches!(send(pid, None), Ok(()) | Err(Errno::EPERM))
}

#[cfg(unix)]
fn send(pid: i32, signal: Option<Signal>) -> nix::Result<()> {
    // 0 and negative values address process groups.
    if pid <= 0 {
        return Err(Errno::ESRCH);
    }
    kill(Pid::from_raw(pid), signal)
}

#[cfg(not(unix))]
pub fn terminate(_pid: i32) -> bool {
    false
}

#[cfg(not(unix))]
pub fn is_alive(_pid: i32) -> bool {
    false
}
