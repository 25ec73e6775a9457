// src/engine/session.rs

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::SessionOptions;
use crate::errors::Result;
use crate::exec::ProcessManager;
use crate::provision::BinaryPaths;

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The shutdown future fired and both processes were stopped.
    Interrupted,
    /// Both processes exited on their own.
    Exited,
}

/// Run one session: start both processes on `port`, surface the tunnel URL,
/// then wait for the processes to exit or for `shutdown` to fire.
///
/// Any failure after the first process has been started stops whatever is
/// running before the error is returned.
pub async fn run_session<F>(
    manager: Arc<ProcessManager>,
    binaries: &BinaryPaths,
    port: u16,
    opts: &SessionOptions,
    shutdown: F,
) -> Result<SessionEnd>
where
    F: Future<Output = ()>,
{
    let outcome = tokio::select! {
        res = drive(&manager, binaries, port, opts) => Some(res),
        _ = shutdown => None,
    };

    match outcome {
        Some(Ok(())) => {
            info!("both processes exited");
            Ok(SessionEnd::Exited)
        }
        Some(Err(err)) => {
            debug!(error = %err, "session failed; stopping processes");
            manager.stop().await;
            Err(err)
        }
        None => {
            info!("shutdown requested");
            manager.stop().await;
            Ok(SessionEnd::Interrupted)
        }
    }
}

async fn drive(
    manager: &ProcessManager,
    binaries: &BinaryPaths,
    port: u16,
    opts: &SessionOptions,
) -> Result<()> {
    manager
        .start_file_server(&binaries.filebrowser, port, &opts.directory)
        .await?;

    // Let the file server bind its port before the tunnel points at it.
    if !opts.startup_delay.is_zero() {
        tokio::time::sleep(opts.startup_delay).await;
    }

    println!("🌐 Starting Cloudflare tunnel...");
    manager.start_tunnel(&binaries.cloudflared, port).await?;

    let url = manager.wait_for_url(opts.url_timeout).await?;
    print_url_banner(&url);

    manager.wait().await
}

fn print_url_banner(url: &str) {
    let rule = "═".repeat(59);
    println!();
    println!("{rule}");
    println!();
    println!("  🔗 Your filebrowser is available at:\n");
    println!("     {url}\n");
    println!("  Press Ctrl+C to stop");
    println!();
    println!("{rule}");
    println!();
}
