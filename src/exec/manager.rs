// src/exec/manager.rs

//! Lifecycle of the file-server and tunnel-client processes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::io::AsyncRead;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::{Result, TunnelError};
use crate::exec::paths::resolve_serve_dir;
use crate::exec::process::{wait_for_exit, ManagedProcess, ProcessExit, StdioMode};
use crate::exec::scanner::spawn_url_scanner;
use crate::exec::slot::UrlSlot;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::ProcessRole;

/// Manager state guarded by the single manager lock.
#[derive(Debug, Default)]
struct ManagerState {
    file_server: Option<ManagedProcess>,
    tunnel: Option<ManagedProcess>,
    tunnel_url: Option<String>,
    scanner: Option<JoinHandle<()>>,
    stopped: bool,
}

/// State shared with the background scanner task.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: Mutex<ManagerState>,
    slot: UrlSlot,
}

impl Shared {
    /// Mirror `url` into the status field, then offer it to the slot.
    ///
    /// The mirror always holds the latest URL; the slot only ever yields the
    /// first one.
    pub(crate) async fn record_url(&self, url: String) {
        {
            let mut state = self.state.lock().await;
            state.tunnel_url = Some(url.clone());
        }

        if !self.slot.offer(url) {
            debug!("tunnel URL slot already filled; keeping the first URL");
        }
    }
}

/// Owns both child processes and the discovered tunnel URL.
///
/// Lifecycle per process is `NotStarted -> Running -> Exited`; nothing is
/// ever restarted. After [`stop`](Self::stop) the manager is finished and
/// refuses to start anything else.
#[derive(Debug)]
pub struct ProcessManager {
    shared: Arc<Shared>,
    fs: Arc<dyn FileSystem>,
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessManager {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    /// Use `fs` for resolving the served directory.
    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            fs,
        }
    }

    /// Start `filebrowser` serving `directory` on `port`.
    ///
    /// The directory is resolved and checked before anything is spawned.
    /// Returns the resolved directory.
    pub async fn start_file_server(
        &self,
        binary: &Path,
        port: u16,
        directory: &str,
    ) -> Result<PathBuf> {
        let mut state = self.shared.state.lock().await;
        ensure_can_start(&state, state.file_server.is_some(), ProcessRole::FileServer)?;

        let root = resolve_serve_dir(self.fs.as_ref(), directory)?;
        let args = file_server_args(port, &root);

        let (process, _) =
            ManagedProcess::spawn(ProcessRole::FileServer, binary, args, StdioMode::Inherit)?;
        state.file_server = Some(process);

        println!(
            "🗂️  Filebrowser started on port {} (serving: {})",
            port,
            root.display()
        );
        Ok(root)
    }

    /// Start `cloudflared` tunnelling to `http://localhost:<local_port>` and
    /// begin scanning its stderr for the public URL.
    pub async fn start_tunnel(&self, binary: &Path, local_port: u16) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        ensure_can_start(&state, state.tunnel.is_some(), ProcessRole::Tunnel)?;

        let (process, stderr) = ManagedProcess::spawn(
            ProcessRole::Tunnel,
            binary,
            tunnel_args(local_port),
            StdioMode::CaptureStderr,
        )?;
        state.tunnel = Some(process);

        let stderr = stderr.ok_or_else(|| {
            TunnelError::Other(anyhow!("cloudflared stderr pipe was not captured"))
        })?;
        state.scanner = Some(spawn_url_scanner(stderr, Arc::clone(&self.shared)));
        Ok(())
    }

    /// Feed an arbitrary output stream through the URL scanner, as if it
    /// were the tunnel client's stderr. Lets the scanner be driven without a
    /// real `cloudflared`.
    #[doc(hidden)]
    pub async fn attach_output<R>(&self, reader: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let handle = spawn_url_scanner(reader, Arc::clone(&self.shared));
        self.shared.state.lock().await.scanner = Some(handle);
    }

    /// Report a tunnel URL as if the output scanner had found it. Same
    /// first-write-wins delivery as the scanner's own path.
    #[doc(hidden)]
    pub async fn record_tunnel_url(&self, url: impl Into<String>) {
        self.shared.record_url(url.into()).await;
    }

    /// Wait until the first tunnel URL is delivered, or fail after
    /// `timeout`.
    pub async fn wait_for_url(&self, timeout: Duration) -> Result<String> {
        self.shared
            .slot
            .take(timeout)
            .await
            .ok_or(TunnelError::TunnelUrlTimeout(timeout))
    }

    /// Latest tunnel URL seen so far, if any.
    pub async fn tunnel_url(&self) -> Option<String> {
        self.shared.state.lock().await.tunnel_url.clone()
    }

    /// Resolves once the output scanner has seen end-of-stream. Returns
    /// immediately if no scanner was started or it was already awaited.
    pub async fn scanner_finished(&self) {
        let handle = self.shared.state.lock().await.scanner.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!(error = %e, "tunnel output scanner task failed");
            }
        }
    }

    /// Whether the given process has been started and has not exited yet.
    pub async fn is_running(&self, role: ProcessRole) -> bool {
        let state = self.shared.state.lock().await;
        let process = match role {
            ProcessRole::FileServer => state.file_server.as_ref(),
            ProcessRole::Tunnel => state.tunnel.as_ref(),
        };
        process.is_some_and(|p| p.is_running())
    }

    /// Kill both processes, tunnel client first, and wait for each to be
    /// reaped.
    ///
    /// A no-op if nothing was started or if already stopped.
    pub async fn stop(&self) {
        let mut guard = self.shared.state.lock().await;
        let state = &mut *guard;
        if state.stopped {
            return;
        }
        state.stopped = true;

        if state.tunnel.is_none() && state.file_server.is_none() {
            debug!("stop requested with no processes started");
            return;
        }

        println!("\n🛑 Shutting down...");

        // Tunnel first so it never advertises a URL with nothing behind it.
        for process in [state.tunnel.as_mut(), state.file_server.as_mut()]
            .into_iter()
            .flatten()
        {
            let exit = process.stop().await;
            debug!(role = %process.role(), %exit, "process stopped");
        }

        println!("✓ Stopped");
        info!("all processes stopped");
    }

    /// Wait for both processes to exit on their own.
    ///
    /// Fails with [`TunnelError::ProcessExitedAbnormally`] if either did not
    /// exit cleanly (the file server is reported first). A process that was
    /// never started is ignored.
    pub async fn wait(&self) -> Result<()> {
        let (file_server, tunnel) = {
            let state = self.shared.state.lock().await;
            (
                state.file_server.as_ref().map(|p| p.exit_watcher()),
                state.tunnel.as_ref().map(|p| p.exit_watcher()),
            )
        };

        let (file_server, tunnel) = tokio::join!(join_exit(file_server), join_exit(tunnel));

        for (role, exit) in [
            (ProcessRole::FileServer, file_server),
            (ProcessRole::Tunnel, tunnel),
        ] {
            if let Some(exit) = exit.filter(ProcessExit::is_abnormal) {
                return Err(TunnelError::ProcessExitedAbnormally {
                    role,
                    status: exit.to_string(),
                });
            }
        }
        Ok(())
    }
}

async fn join_exit(
    watcher: Option<tokio::sync::watch::Receiver<Option<ProcessExit>>>,
) -> Option<ProcessExit> {
    match watcher {
        Some(rx) => Some(wait_for_exit(rx).await),
        None => None,
    }
}

fn ensure_can_start(state: &ManagerState, already_started: bool, role: ProcessRole) -> Result<()> {
    if state.stopped {
        return Err(TunnelError::Other(anyhow!(
            "cannot start {role}: process manager already stopped"
        )));
    }
    if already_started {
        return Err(TunnelError::Other(anyhow!("{role} is already running")));
    }
    Ok(())
}

/// Arguments for `filebrowser`: no auth, all interfaces, given port and root.
pub fn file_server_args(port: u16, root: &Path) -> Vec<String> {
    vec![
        "--noauth".to_string(),
        "--address".to_string(),
        "0.0.0.0".to_string(),
        "--port".to_string(),
        port.to_string(),
        "--root".to_string(),
        root.to_string_lossy().into_owned(),
    ]
}

/// Arguments for a `cloudflared` quick tunnel to the local port.
pub fn tunnel_args(local_port: u16) -> Vec<String> {
    vec![
        "tunnel".to_string(),
        "--url".to_string(),
        format!("http://localhost:{local_port}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn child_argument_contracts() {
        assert_eq!(
            file_server_args(8080, Path::new("/srv/files")),
            [
                "--noauth", "--address", "0.0.0.0", "--port", "8080", "--root", "/srv/files"
            ]
        );
        assert_eq!(
            tunnel_args(8080),
            ["tunnel", "--url", "http://localhost:8080"]
        );
    }

    #[tokio::test]
    async fn stop_without_processes_is_a_noop() {
        let pm = ProcessManager::new();
        pm.stop().await;
        pm.stop().await;
        assert!(!pm.is_running(ProcessRole::FileServer).await);
        pm.wait().await.unwrap();
    }

    #[tokio::test]
    async fn first_url_is_delivered_latest_is_mirrored() {
        let pm = ProcessManager::new();
        pm.record_tunnel_url("https://first.trycloudflare.com").await;
        pm.record_tunnel_url("https://second.trycloudflare.com").await;

        let url = pm.wait_for_url(Duration::from_secs(1)).await.unwrap();
        assert_eq!(url, "https://first.trycloudflare.com");
        assert_eq!(
            pm.tunnel_url().await.as_deref(),
            Some("https://second.trycloudflare.com")
        );
    }

    #[tokio::test]
    async fn zero_timeout_without_delivery_times_out() {
        let pm = ProcessManager::new();
        match pm.wait_for_url(Duration::ZERO).await {
            Err(TunnelError::TunnelUrlTimeout(d)) => assert_eq!(d, Duration::ZERO),
            other => panic!("expected TunnelUrlTimeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_directory_fails_before_spawn() {
        let fs = Arc::new(MockFileSystem::new("/work", Some(PathBuf::from("/home/u"))));
        let pm = ProcessManager::with_fs(fs);

        let err = pm
            .start_file_server(Path::new("/definitely/not/a/binary"), 8080, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, TunnelError::DirectoryNotFound(_)));
        assert!(!pm.is_running(ProcessRole::FileServer).await);
    }

    #[tokio::test]
    async fn scanner_reports_urls_and_finishes_on_eof() {
        let pm = ProcessManager::new();
        let output: &'static [u8] = b"INF Requesting new quick Tunnel on trycloudflare.com...\n\
            INF |  https://alpha-beta.trycloudflare.com  |\n\
            INF Registered tunnel connection\n";
        pm.attach_output(output).await;
        pm.scanner_finished().await;

        assert_eq!(
            pm.wait_for_url(Duration::ZERO).await.unwrap(),
            "https://alpha-beta.trycloudflare.com"
        );
        // Second await is a no-op.
        pm.scanner_finished().await;
    }

    #[tokio::test]
    async fn start_after_stop_is_refused() {
        let pm = ProcessManager::new();
        pm.stop().await;
        let err = pm
            .start_tunnel(Path::new("/bin/true"), 8080)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already stopped"));
    }
}
