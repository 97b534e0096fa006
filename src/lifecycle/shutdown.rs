//! Shutdown signal source
//!
//! Trips the process-wide shutdown token when the process receives an OS
//! termination signal.

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels a shutdown token on SIGINT or SIGTERM
///
/// # Example
///
/// ```rust,ignore
/// use multisched::lifecycle::ShutdownHandler;
/// use tokio_util::sync::CancellationToken;
///
/// let shutdown = CancellationToken::new();
/// ShutdownHandler::new(shutdown.clone()).spawn();
/// ```
pub struct ShutdownHandler {
    token: CancellationToken,
}

impl ShutdownHandler {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Wait for a signal, then cancel the token.
    ///
    /// Returns early if the token is cancelled by someone else.
    pub async fn wait_for_shutdown(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {
                tracing::debug!("Shutdown token cancelled elsewhere");
            }
            _ = shutdown_signal() => {
                tracing::info!("Starting graceful shutdown...");
                self.token.cancel();
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.wait_for_shutdown().await;
        })
    }
}

/// Completes when Ctrl+C or SIGTERM is received.
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
