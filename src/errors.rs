// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every variant carries enough context (binary, stage, path) to be printed
//! straight to the user. None of them are retried.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{DownloadStage, ProcessRole};

#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("unsupported platform: {os}/{arch} (supported: linux|darwin on amd64|arm64)")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("failed to {stage} {binary}: {message}")]
    DownloadFailed {
        binary: String,
        stage: DownloadStage,
        message: String,
    },

    #[error("binary '{binary}' not found in archive {archive:?}")]
    BinaryNotFoundInArchive { binary: String, archive: PathBuf },

    #[error("directory does not exist: {0:?}")]
    DirectoryNotFound(PathBuf),

    #[error("failed to start {role} ({path:?})")]
    ProcessStartFailed {
        role: ProcessRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("timeout waiting for tunnel URL after {0:?}")]
    TunnelUrlTimeout(Duration),

    #[error("{role} exited abnormally ({status})")]
    ProcessExitedAbnormally { role: ProcessRole, status: String },

    #[error("failed to clear cache at {path:?}")]
    CacheClearFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TunnelError {
    /// Shorthand for building a [`TunnelError::DownloadFailed`].
    pub fn download(binary: &str, stage: DownloadStage, err: impl std::fmt::Display) -> Self {
        TunnelError::DownloadFailed {
            binary: binary.to_string(),
            stage,
            message: err.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TunnelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sourced_variants_do_not_repeat_their_cause() {
        let err = TunnelError::ProcessStartFailed {
            role: ProcessRole::Tunnel,
            path: PathBuf::from("/cache/cloudflared"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("no such file").count(), 1, "{chain}");

        let err = TunnelError::CacheClearFailed {
            path: PathBuf::from("/cache"),
            source: anyhow::anyhow!("permission denied"),
        };
        assert_eq!(err.to_string(), "failed to clear cache at \"/cache\"");
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("permission denied").count(), 1, "{chain}");
    }
}
