// src/engine/shutdown.rs

use tracing::{info, warn};

/// Resolves when the process receives SIGINT (Ctrl-C) or SIGTERM.
///
/// A listener that cannot be installed never resolves, so a broken signal
/// setup is not mistaken for a shutdown request.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C"),
            Err(e) => {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("received SIGTERM");
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
