// src/engine/mod.rs

//! Orchestration of one tunnel session.
//!
//! This module sequences the pieces once the binaries are available:
//! - start the file server, give it a moment to bind
//! - start the tunnel client and wait for its public URL
//! - show the URL and wait for the processes (or a shutdown request)
//!
//! Shutdown is an explicit future handed to [`run_session`]; the real one,
//! listening for SIGINT/SIGTERM, is [`shutdown::shutdown_signal`].

use std::time::Duration;

pub mod session;
pub mod shutdown;

pub use session::{run_session, SessionEnd};
pub use shutdown::shutdown_signal;

/// Per-session options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Directory to serve, as given on the command line.
    pub directory: String,
    /// How long to wait for the tunnel URL.
    pub url_timeout: Duration,
    /// Pause between starting the file server and the tunnel client.
    pub startup_delay: Duration,
}

impl SessionOptions {
    pub fn new(directory: impl Into<String>, cfg: &crate::config::Config) -> Self {
        Self {
            directory: directory.into(),
            url_timeout: cfg.url_timeout,
            startup_delay: cfg.startup_delay,
        }
    }
}
