use log::{error, info};
use tokio::{signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Cancels `token` on Ctrl+C or SIGTERM, turning OS signal delivery into the
/// same cooperative cancellation the in-process service uses.
///
/// The SIGTERM handler is registered before this function returns, so a stop
/// request that arrives right after spawn is not lost. Must be called from
/// within a tokio runtime.
pub fn cancel_on_shutdown_signal(token: CancellationToken) -> JoinHandle<()> {
    #[cfg(unix)]
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            error!("Failed to install SIGTERM handler: {e}");
            None
        }
    };

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match sigterm.as_mut() {
                Some(stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C");
                token.cancel();
            }
            _ = terminate => {
                info!("Received SIGTERM");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
