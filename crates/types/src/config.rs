use std::time::Duration;

pub const DEFAULT_RPC_ENDPOINT: &str = "http://localhost:5005";
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 30_000;

/// Configuration of a single ledger advancement daemon.
///
/// Built once per daemon invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAdvancementConfig {
    rpc_endpoint: String,
    interval: Duration,
    ready_timeout: Duration,
}

impl LedgerAdvancementConfig {
    /// Creates a config from millisecond values as they arrive from flags or `bedrock.toml`.
    pub fn new(rpc_endpoint: &str, interval_ms: u64) -> anyhow::Result<Self> {
        if interval_ms == 0 {
            anyhow::bail!("Ledger interval must be greater than zero");
        }
        if rpc_endpoint.trim().is_empty() {
            anyhow::bail!("RPC endpoint must not be empty");
        }
        Ok(Self {
            rpc_endpoint: rpc_endpoint.to_string(),
            interval: Duration::from_millis(interval_ms),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
        })
    }

    pub fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    pub fn rpc_endpoint(&self) -> &str {
        &self.rpc_endpoint
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Interval in whole milliseconds, the unit used on the daemon command line.
    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }

    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }
}

impl Default for LedgerAdvancementConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: DEFAULT_RPC_ENDPOINT.to_string(),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
        }
    }
}
