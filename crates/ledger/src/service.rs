use br_types::LedgerAdvancementStatus;
use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::advancer::LedgerAdvancer;
use crate::errors::{Error, Result};
use crate::rpc::AdminRpc;

/// Hosts a [`LedgerAdvancer`] on a tokio task of the current process.
///
/// Status can be polled at any time while the loop runs; the task is stopped
/// either through [`LedgerService::stop`] or when the shutdown token passed at
/// construction is cancelled.
pub struct LedgerService<R: AdminRpc + 'static> {
    advancer: LedgerAdvancer<R>,
    shutdown: CancellationToken,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl<R: AdminRpc + 'static> LedgerService<R> {
    pub fn new(advancer: LedgerAdvancer<R>, shutdown: CancellationToken) -> Self {
        Self {
            advancer,
            shutdown,
            cancel: None,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts the advancement loop in the background.
    ///
    /// Fails with [`Error::ShuttingDown`] once the shutdown token is cancelled.
    pub async fn start(&mut self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(Error::ShuttingDown);
        }
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }
        self.stop().await;

        self.advancer.reset(true).await;

        let cancel = self.shutdown.child_token();
        let advancer = self.advancer.clone();
        let token = cancel.clone();
        self.task = Some(tokio::spawn(async move { advancer.run(token).await }));
        self.cancel = Some(cancel);

        info!(
            "Ledger service started (interval: {:?})",
            self.advancer.config().interval()
        );
        Ok(())
    }

    /// Waits for the node to accept requests, then starts the loop.
    pub async fn start_when_ready(&mut self) -> Result<()> {
        let timeout = self.advancer.config().ready_timeout();
        self.advancer.wait_until_ready(timeout).await?;
        self.start().await
    }

    /// Stops the loop and waits for the task to finish. Calling it on a
    /// stopped service does nothing.
    pub async fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Ledger service task ended abnormally: {e}");
            }
            self.advancer.set_running(false).await;
        }
    }

    pub async fn status(&self) -> LedgerAdvancementStatus {
        self.advancer.status().await
    }
}
