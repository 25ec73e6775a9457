// src/exec/process.rs

//! A single supervised child process.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, TunnelError};
use crate::types::ProcessRole;

/// How a managed process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited on its own.
    Exited(ExitStatus),
    /// We killed it on request.
    Killed,
    /// Waiting on the OS failed; the process state is unknown.
    WaitFailed,
}

impl ProcessExit {
    /// Anything other than a clean exit or a requested kill.
    pub fn is_abnormal(&self) -> bool {
        match self {
            ProcessExit::Exited(status) => !status.success(),
            ProcessExit::Killed => false,
            ProcessExit::WaitFailed => true,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExit::Exited(status) => write!(f, "{status}"),
            ProcessExit::Killed => f.write_str("killed on shutdown"),
            ProcessExit::WaitFailed => f.write_str("wait failed"),
        }
    }
}

/// What to do with the child's stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the parent's stdout/stderr.
    Inherit,
    /// Pipe stderr back to us; discard stdout.
    CaptureStderr,
}

/// Handle to a child process owned by a supervisor task.
///
/// The supervisor owns the OS handle and either waits for a natural exit or
/// kills the child when asked. The outcome is published on a `watch`
/// channel so any number of callers can wait for it.
pub struct ManagedProcess {
    role: ProcessRole,
    program: PathBuf,
    args: Vec<String>,
    pid: Option<u32>,
    kill: Option<oneshot::Sender<()>>,
    exit_rx: watch::Receiver<Option<ProcessExit>>,
    _supervisor: JoinHandle<()>,
}

impl fmt::Debug for ManagedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedProcess")
            .field("role", &self.role)
            .field("program", &self.program)
            .field("args", &self.args)
            .field("pid", &self.pid)
            .field("exit", &*self.exit_rx.borrow())
            .finish_non_exhaustive()
    }
}

impl ManagedProcess {
    /// Spawn `program` with `args`.
    ///
    /// With [`StdioMode::CaptureStderr`] the child's stderr pipe is returned
    /// alongside the handle.
    pub fn spawn(
        role: ProcessRole,
        program: &Path,
        args: Vec<String>,
        stdio: StdioMode,
    ) -> Result<(Self, Option<ChildStderr>)> {
        let mut cmd = Command::new(program);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        match stdio {
            StdioMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            StdioMode::CaptureStderr => {
                cmd.stdout(Stdio::null()).stderr(Stdio::piped());
            }
        }

        let mut child = cmd.spawn().map_err(|source| TunnelError::ProcessStartFailed {
            role,
            path: program.to_path_buf(),
            source,
        })?;

        let pid = child.id();
        let stderr = child.stderr.take();
        info!(%role, pid, program = ?program, ?args, "process started");

        let (kill_tx, kill_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = watch::channel(None);
        let supervisor = tokio::spawn(supervise(role, child, kill_rx, exit_tx));

        Ok((
            Self {
                role,
                program: program.to_path_buf(),
                args,
                pid,
                kill: Some(kill_tx),
                exit_rx,
                _supervisor: supervisor,
            },
            stderr,
        ))
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_running(&self) -> bool {
        self.exit_rx.borrow().is_none()
    }

    /// A receiver that resolves once the process has exited.
    pub fn exit_watcher(&self) -> watch::Receiver<Option<ProcessExit>> {
        self.exit_rx.clone()
    }

    /// Kill the process (if still alive) and wait until it has been reaped.
    pub async fn stop(&mut self) -> ProcessExit {
        if let Some(kill) = self.kill.take() {
            if kill.send(()).is_err() {
                debug!(role = %self.role, "supervisor already finished before kill request");
            }
        }
        wait_for_exit(self.exit_watcher()).await
    }
}

/// Wait until the watched process reports its exit.
pub async fn wait_for_exit(mut rx: watch::Receiver<Option<ProcessExit>>) -> ProcessExit {
    let exit = match rx.wait_for(|exit| exit.is_some()).await {
        Ok(exit) => *exit,
        // The supervisor always publishes before dropping its sender.
        Err(_) => None,
    };
    exit.unwrap_or(ProcessExit::WaitFailed)
}

async fn supervise(
    role: ProcessRole,
    mut child: Child,
    mut kill_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
) {
    let exit = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => {
                info!(%role, %status, "process exited");
                ProcessExit::Exited(status)
            }
            Err(e) => {
                warn!(%role, error = %e, "waiting for process failed");
                ProcessExit::WaitFailed
            }
        },

        req = &mut kill_rx => {
            if req.is_err() {
                debug!(%role, "process handle dropped; killing child");
            } else {
                info!(%role, "stop requested; killing process");
            }
            match child.kill().await {
                Ok(()) => ProcessExit::Killed,
                Err(e) => {
                    warn!(%role, error = %e, "failed to kill process");
                    ProcessExit::WaitFailed
                }
            }
        }
    };

    let _ = exit_tx.send(Some(exit));
}
