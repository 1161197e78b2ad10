//! Process lifecycle: turn a shutdown strategy into a `CancellationToken`
//! that servers and background tasks observe.

mod shutdown;

pub use shutdown::wait_for_shutdown;

use std::{future::Future, pin::Pin};
use tokio_util::sync::CancellationToken;

/// How the process should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we initiate shutdown.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

/// Spawn the waiter for the chosen strategy and return the token it cancels.
///
/// Must be called from within a Tokio runtime.
pub fn shutdown_token(opts: ShutdownOptions) -> CancellationToken {
    match opts {
        ShutdownOptions::Token(t) => {
            tracing::info!("shutdown: external token will control lifecycle");
            t
        }
        ShutdownOptions::Signals => {
            let cancel = CancellationToken::new();
            let c = cancel.clone();
            tokio::spawn(async move {
                match wait_for_shutdown().await {
                    Ok(()) => tracing::info!("shutdown: signal received"),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "shutdown: primary waiter failed; falling back to ctrl_c()"
                        );
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                c.cancel();
            });
            cancel
        }
        ShutdownOptions::Future(waiter) => {
            let cancel = CancellationToken::new();
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
            cancel
        }
    }
}
