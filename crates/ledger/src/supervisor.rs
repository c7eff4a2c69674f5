//! Runs the ledger daemon as a detached process tracked by a PID file.
//!
//! The CLI is a short-lived invocation per command, so the advancement loop
//! is hosted by a re-invocation of the CLI binary itself in its own process
//! group. Later invocations find it again through `<state-dir>/ledger-daemon.pid`.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::Duration,
};

use br_types::LedgerAdvancementConfig;
use log::{debug, warn};

use crate::errors::{Error, Result};
use crate::signal;

pub const STATE_DIR: &str = ".bedrock";
pub const PID_FILE_NAME: &str = "ledger-daemon.pid";
pub const LOG_FILE_NAME: &str = "ledger-daemon.log";

/// Hidden subcommand the daemon process is started with.
pub const DAEMON_SUBCOMMAND: &str = "_ledger-daemon";

/// Pause between SIGTERM and PID file removal.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DaemonSupervisor {
    state_dir: PathBuf,
    executable: Option<PathBuf>,
}

impl DaemonSupervisor {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            executable: None,
        }
    }

    /// Supervisor rooted at `.bedrock` under the given project directory.
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join(STATE_DIR))
    }

    /// Binary to re-invoke instead of the current executable.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn pid_file(&self) -> PathBuf {
        self.state_dir.join(PID_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join(LOG_FILE_NAME)
    }

    /// Spawns the daemon and records its PID. Returns the PID.
    ///
    /// Does not check for an already running daemon; callers that need
    /// exclusivity check [`DaemonSupervisor::is_running`] first.
    pub fn start(&self, config: &LedgerAdvancementConfig) -> Result<u32> {
        let executable = match &self.executable {
            Some(path) => path.clone(),
            None => std::env::current_exe().map_err(Error::CurrentExe)?,
        };

        fs::create_dir_all(&self.state_dir).map_err(|source| Error::StateDir {
            path: self.state_dir.clone(),
            source,
        })?;

        let log_path = self.log_file();
        let log_err = |source| Error::LogFile {
            path: log_path.clone(),
            source,
        };
        let stdout = File::create(&log_path).map_err(log_err)?;
        let stderr = stdout.try_clone().map_err(log_err)?;

        let mut command = Command::new(&executable);
        command
            .arg(DAEMON_SUBCOMMAND)
            .arg("--rpc-url")
            .arg(config.rpc_endpoint())
            .arg("--interval")
            .arg(config.interval_ms().to_string())
            .arg("--ready-timeout")
            .arg(config.ready_timeout().as_millis().to_string())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);

        // New process group so the daemon survives the end of the parent's session.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(Error::Spawn)?;
        let pid = child.id();

        let pid_path = self.pid_file();
        if let Err(source) = fs::write(&pid_path, pid.to_string()) {
            if let Err(e) = child.kill() {
                warn!("Failed to kill orphaned ledger daemon {pid}: {e}");
            }
            let _ = child.wait();
            return Err(Error::WritePidFile {
                path: pid_path,
                source,
            });
        }

        // Reap the child if it exits while this process is still alive.
        let reaper = thread::Builder::new()
            .name("ledger-daemon-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => debug!("Ledger daemon {pid} exited with {status}"),
                Err(e) => debug!("Failed to wait for ledger daemon {pid}: {e}"),
            });
        if let Err(e) = reaper {
            warn!("Failed to start reaper for ledger daemon {pid}: {e}");
        }

        debug!(
            "Spawned ledger daemon {pid} ({} {DAEMON_SUBCOMMAND})",
            executable.display()
        );
        Ok(pid)
    }

    /// Stops the daemon if one is recorded.
    ///
    /// A missing PID file or a process that is already gone both count as
    /// stopped. The PID file is removed in every case except a read error.
    pub async fn stop(&self) -> Result<()> {
        let pid = match self.read_pid() {
            Ok(Some(pid)) => pid,
            Ok(None) => return Ok(()),
            Err(Error::InvalidPid(raw)) => {
                self.remove_pid_file();
                return Err(Error::InvalidPid(raw));
            }
            Err(e) => return Err(e),
        };

        if !signal::terminate(pid) {
            debug!("Ledger daemon {pid} already gone");
            self.remove_pid_file();
            return Ok(());
        }

        tokio::time::sleep(STOP_GRACE_PERIOD).await;
        self.remove_pid_file();
        Ok(())
    }

    /// Whether the recorded daemon process still exists.
    pub fn is_running(&self) -> bool {
        match self.read_pid() {
            Ok(Some(pid)) => signal::is_alive(pid),
            _ => false,
        }
    }

    /// PID recorded in the PID file, `None` when there is no file.
    pub fn read_pid(&self) -> Result<Option<i32>> {
        let path = self.pid_file();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Error::ReadPidFile { path, source }),
        };

        match raw.trim().parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(Some(pid)),
            _ => Err(Error::InvalidPid(raw)),
        }
    }

    fn remove_pid_file(&self) {
        let path = self.pid_file();
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {e}", path.display());
            }
        }
    }
}
