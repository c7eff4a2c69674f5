use br_types::LedgerAdvancementStatus;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::advancer::LedgerAdvancer;
use crate::errors::Result;
use crate::rpc::AdminRpc;

/// Body of the detached daemon process: wait for the node, then advance
/// ledgers until `shutdown` is cancelled.
///
/// A shutdown requested during the readiness wait ends the daemon cleanly
/// without entering the loop. Only a readiness timeout is an error.
pub async fn run_daemon<R: AdminRpc>(
    advancer: &LedgerAdvancer<R>,
    shutdown: CancellationToken,
) -> Result<LedgerAdvancementStatus> {
    let config = advancer.config();
    info!("Waiting for node at {} to be ready...", config.rpc_endpoint());

    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            warn!("Ledger daemon stopped before the node became ready");
            return Ok(advancer.status().await);
        }
        ready = advancer.wait_until_ready(config.ready_timeout()) => ready?,
    }

    info!("Ledger daemon started (interval: {:?})", config.interval());
    advancer.run(shutdown).await;

    Ok(advancer.status().await)
}
