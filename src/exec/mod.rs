// src/exec/mod.rs

//! Process coordination layer.
//!
//! This module starts the two child processes with `tokio::process::Command`
//! and coordinates their lifecycle.
//!
//! - [`process`] wraps one child in a supervisor task that either waits for
//!   it to exit or kills it on request.
//! - [`scanner`] reads the tunnel client's stderr and reports URLs.
//! - [`slot`] is the single-capacity handoff for the first discovered URL.
//! - [`paths`] resolves the directory handed to the file server.
//! - [`manager`] ties them together behind [`ProcessManager`].

pub mod manager;
pub mod paths;
pub mod process;
pub mod scanner;
pub mod slot;

pub use manager::{file_server_args, tunnel_args, ProcessManager};
pub use paths::resolve_serve_dir;
pub use process::{ManagedProcess, ProcessExit, StdioMode};
pub use slot::UrlSlot;
