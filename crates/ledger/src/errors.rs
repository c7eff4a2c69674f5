use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Timeout waiting for node to be ready after {0:?}")]
    ReadyTimeout(Duration),

    #[error("Admin RPC request failed: {0}")]
    Rpc(String),

    #[error("Ledger service is already running")]
    AlreadyRunning,

    #[error("Ledger service is shutting down")]
    ShuttingDown,

    #[error("Failed to prepare state directory {}: {source}", .path.display())]
    StateDir { path: PathBuf, source: io::Error },

    #[error("Failed to create log file {}: {source}", .path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("Failed to spawn ledger daemon: {0}")]
    Spawn(io::Error),

    #[error("Failed to write PID file {}: {source}", .path.display())]
    WritePidFile { path: PathBuf, source: io::Error },

    #[error("Failed to read PID file {}: {source}", .path.display())]
    ReadPidFile { path: PathBuf, source: io::Error },

    #[error("Invalid PID in file: {0:?}")]
    InvalidPid(String),

    #[error("Failed to resolve current executable: {0}")]
    CurrentExe(io::Error),
}
