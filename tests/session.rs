// tests/session.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, session_options, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::oneshot;

use filebrowser_tunnel::engine::{run_session, SessionEnd};
use filebrowser_tunnel::errors::TunnelError;
use filebrowser_tunnel::exec::ProcessManager;
use filebrowser_tunnel::net::free_port;
use filebrowser_tunnel::types::ProcessRole;
use filebrowser_tunnel_test_utils::builders::{StandInBuilder, STAND_IN_URL};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn shutdown_after_url_stops_everything() -> TestResult {
    init_tracing();
    let (_bin_dir, bins) = StandInBuilder::new().build();
    let root = TempDir::new()?;
    let opts = session_options(root.path(), Duration::from_secs(5));
    let manager = Arc::new(ProcessManager::new());

    // Fire shutdown once the URL has shown up in the status mirror.
    let (tx, rx) = oneshot::channel::<()>();
    let watcher = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move {
            while manager.tunnel_url().await.is_none() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            let _ = tx.send(());
        })
    };
    let shutdown = async {
        let _ = rx.await;
    };

    let end = with_timeout(run_session(
        Arc::clone(&manager),
        &bins,
        free_port()?,
        &opts,
        shutdown,
    ))
    .await?;

    assert_eq!(end, SessionEnd::Interrupted);
    assert_eq!(manager.tunnel_url().await.as_deref(), Some(STAND_IN_URL));
    assert!(!manager.is_running(ProcessRole::FileServer).await);
    assert!(!manager.is_running(ProcessRole::Tunnel).await);
    watcher.await?;
    Ok(())
}

#[tokio::test]
async fn natural_exit_ends_the_session() -> TestResult {
    init_tracing();
    let (_bin_dir, bins) = StandInBuilder::new()
        .file_server("sleep 0.3")
        .tunnel_announcing(&[STAND_IN_URL], "sleep 0.3")
        .build();
    let root = TempDir::new()?;
    let opts = session_options(root.path(), Duration::from_secs(5));
    let manager = Arc::new(ProcessManager::new());

    let end = with_timeout(run_session(
        manager,
        &bins,
        free_port()?,
        &opts,
        std::future::pending::<()>(),
    ))
    .await?;

    assert_eq!(end, SessionEnd::Exited);
    Ok(())
}

#[tokio::test]
async fn url_timeout_fails_and_stops_both_processes() -> TestResult {
    init_tracing();
    let (_bin_dir, bins) = StandInBuilder::new().tunnel("exec sleep 30").build();
    let root = TempDir::new()?;
    let opts = session_options(root.path(), Duration::from_millis(300));
    let manager = Arc::new(ProcessManager::new());

    let result = with_timeout(run_session(
        Arc::clone(&manager),
        &bins,
        free_port()?,
        &opts,
        std::future::pending::<()>(),
    ))
    .await;

    assert!(matches!(result, Err(TunnelError::TunnelUrlTimeout(_))));
    assert!(!manager.is_running(ProcessRole::FileServer).await);
    assert!(!manager.is_running(ProcessRole::Tunnel).await);
    Ok(())
}

#[tokio::test]
async fn missing_directory_fails_before_anything_starts() -> TestResult {
    init_tracing();
    let (_bin_dir, bins) = StandInBuilder::new().build();
    let root = TempDir::new()?;
    let opts = session_options(&root.path().join("nope"), Duration::from_secs(1));
    let manager = Arc::new(ProcessManager::new());

    let result = run_session(
        Arc::clone(&manager),
        &bins,
        free_port()?,
        &opts,
        std::future::pending::<()>(),
    )
    .await;

    assert!(matches!(result, Err(TunnelError::DirectoryNotFound(_))));
    assert!(!manager.is_running(ProcessRole::Tunnel).await);
    Ok(())
}

#[tokio::test]
async fn abnormal_exit_surfaces_as_error() -> TestResult {
    init_tracing();
    let (_bin_dir, bins) = StandInBuilder::new()
        .file_server("sleep 0.3; exit 4")
        .tunnel_announcing(&[STAND_IN_URL], "sleep 0.5")
        .build();
    let root = TempDir::new()?;
    let opts = session_options(root.path(), Duration::from_secs(5));
    let manager = Arc::new(ProcessManager::new());

    let result = with_timeout(run_session(
        Arc::clone(&manager),
        &bins,
        free_port()?,
        &opts,
        std::future::pending::<()>(),
    ))
    .await;

    // wait() joins both exits; the tunnel's clean exit does not mask the
    // file server's failure.
    match result {
        Err(TunnelError::ProcessExitedAbnormally { role, .. }) => {
            assert_eq!(role, ProcessRole::FileServer)
        }
        other => panic!("expected ProcessExitedAbnormally, got {other:?}"),
    }
    Ok(())
}
