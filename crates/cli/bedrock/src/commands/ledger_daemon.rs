use std::{path::Path, time::Duration};

use br_ledger::{cancel_on_shutdown_signal, run_daemon, HttpAdminRpc, LedgerAdvancer};
use br_types::{LedgerAdvancementConfig, DEFAULT_INTERVAL_MS, DEFAULT_READY_TIMEOUT_MS};
use br_utils_cli::{CliCommand, DEFAULT_LOCAL_RPC_URL};
use log::{error, info};
use tokio_util::sync::CancellationToken;

#[derive(clap::Parser, Debug, Clone)]
#[clap(about = "Advances ledgers on the local node until terminated")]
pub struct LedgerDaemonCmd {
    /// Admin RPC endpoint of the node
    #[arg(long, default_value = DEFAULT_LOCAL_RPC_URL)]
    pub rpc_url: String,

    /// Milliseconds between two ledger closes
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval: u64,

    /// Milliseconds to wait for the node before giving up
    #[arg(long, default_value_t = DEFAULT_READY_TIMEOUT_MS)]
    pub ready_timeout: u64,
}

#[async_trait::async_trait]
impl CliCommand for LedgerDaemonCmd {
    async fn call(&self, _project_dir: &Path) -> anyhow::Result<()> {
        let config = LedgerAdvancementConfig::new(&self.rpc_url, self.interval)?
            .with_ready_timeout(Duration::from_millis(self.ready_timeout));
        let rpc = HttpAdminRpc::new(config.rpc_endpoint())?;
        let advancer = LedgerAdvancer::new(rpc, config);

        let shutdown = CancellationToken::new();
        let signals = cancel_on_shutdown_signal(shutdown.clone());

        let result = run_daemon(&advancer, shutdown.clone()).await;
        shutdown.cancel();
        let _ = signals.await;

        let status = result.inspect_err(|e| error!("Ledger daemon failed: {e}"))?;
        info!(
            "Ledger daemon stopped ({} ledgers advanced)",
            status.advanced_count
        );
        Ok(())
    }
}
