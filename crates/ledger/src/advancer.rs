use std::{sync::Arc, time::Duration};

use br_types::{LedgerAdvancementConfig, LedgerAdvancementStatus, LedgerIndex};
use log::{debug, info, warn};
use tokio::{
    sync::RwLock,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, Result};
use crate::rpc::AdminRpc;

/// Delay between two readiness probes.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Closes ledgers on a standalone node at a fixed cadence.
///
/// The same advancer backs both the detached daemon process and the
/// in-process [`LedgerService`](crate::service::LedgerService). Attempts are
/// strictly sequential: a slow call delays the next tick instead of
/// overlapping with it.
pub struct LedgerAdvancer<R: AdminRpc> {
    rpc: Arc<R>,
    config: LedgerAdvancementConfig,
    status: Arc<RwLock<LedgerAdvancementStatus>>,
}

impl<R: AdminRpc> Clone for LedgerAdvancer<R> {
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
            config: self.config.clone(),
            status: Arc::clone(&self.status),
        }
    }
}

impl<R: AdminRpc> LedgerAdvancer<R> {
    pub fn new(rpc: R, config: LedgerAdvancementConfig) -> Self {
        Self::with_shared_rpc(Arc::new(rpc), config)
    }

    pub fn with_shared_rpc(rpc: Arc<R>, config: LedgerAdvancementConfig) -> Self {
        let status = LedgerAdvancementStatus::new(config.interval());
        Self {
            rpc,
            config,
            status: Arc::new(RwLock::new(status)),
        }
    }

    pub fn config(&self) -> &LedgerAdvancementConfig {
        &self.config
    }

    pub async fn status(&self) -> LedgerAdvancementStatus {
        self.status.read().await.clone()
    }

    pub(crate) async fn reset(&self, running: bool) {
        let mut status = self.status.write().await;
        status.reset();
        status.running = running;
    }

    pub(crate) async fn set_running(&self, running: bool) {
        self.status.write().await.running = running;
    }

    /// Polls the node until one `ledger_accept` succeeds.
    ///
    /// Individual failures are expected while the node boots and are not
    /// reported. Each probe is bounded by the time left, so the call returns
    /// shortly after `timeout` even against an endpoint that hangs.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::ReadyTimeout(timeout));
            }

            match tokio::time::timeout(remaining, self.rpc.ledger_accept()).await {
                Ok(Ok(accept)) => {
                    debug!(
                        "Node ready at {} (ledger {})",
                        self.config.rpc_endpoint(),
                        accept.ledger_current_index
                    );
                    return Ok(());
                }
                Ok(Err(e)) => debug!("Node not ready yet: {e}"),
                Err(_) => debug!("Readiness probe timed out"),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::ReadyTimeout(timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL.min(remaining)).await;
        }
    }

    /// Performs a single advancement attempt and records its outcome.
    ///
    /// A failure is stored in `last_error` and returned; counters are only
    /// touched on success.
    pub async fn advance_once(&self) -> Result<LedgerIndex> {
        match self.rpc.ledger_accept().await {
            Ok(accept) => {
                let index = accept.ledger_current_index;
                self.status.write().await.record_success(index);
                debug!("Ledger closed, current index {index}");
                Ok(index)
            }
            Err(e) => {
                warn!("Failed to advance ledger: {e}");
                self.status.write().await.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Advances once immediately, then once per interval, until `cancel` fires.
    ///
    /// Errors never end the loop. Cancellation is honoured before every tick
    /// and while an attempt is in flight.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.set_running(true).await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.advance_once() => {}
            }
        }

        self.set_running(false).await;
        info!(
            "Ledger advancement stopped ({} ledgers advanced)",
            self.status.read().await.advanced_count
        );
    }
}
