// src/provision/download.rs

//! Streaming HTTP download with terminal progress.

use std::io::Write;
use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::errors::{Result, TunnelError};
use crate::types::DownloadStage;

const MIB: f64 = 1024.0 * 1024.0;

/// Running byte count of a download, rendered as a single status line.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadProgress {
    pub total: Option<u64>,
    pub downloaded: u64,
}

impl DownloadProgress {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            downloaded: 0,
        }
    }

    pub fn advance(&mut self, n: usize) {
        self.downloaded += n as u64;
    }

    /// Percentage when the size is known, otherwise cumulative megabytes.
    pub fn render(&self) -> String {
        let done = self.downloaded as f64 / MIB;
        match self.total {
            Some(total) => {
                let percent = self.downloaded as f64 / total as f64 * 100.0;
                format!(
                    "  Downloading... {:.1}% ({:.2} MB / {:.2} MB)",
                    percent,
                    done,
                    total as f64 / MIB
                )
            }
            None => format!("  Downloading... {:.2} MB", done),
        }
    }

    fn print(&self) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{}", self.render());
        let _ = out.flush();
    }
}

/// Download `url` into `dest`, overwriting it. Returns the byte count.
///
/// Non-2xx responses are errors. Nothing is retried.
pub async fn download_to(
    client: &reqwest::Client,
    binary: &str,
    url: &str,
    dest: &Path,
) -> Result<u64> {
    info!(binary, url, dest = ?dest, "downloading artifact");

    let mut resp = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| fail(binary, e))?;

    let mut out = File::create(dest)
        .await
        .map_err(|e| fail(binary, format!("creating {:?}: {e}", dest)))?;

    let mut progress = DownloadProgress::new(resp.content_length());

    while let Some(chunk) = resp.chunk().await.map_err(|e| fail(binary, e))? {
        out.write_all(&chunk)
            .await
            .map_err(|e| fail(binary, format!("writing {:?}: {e}", dest)))?;
        progress.advance(chunk.len());
        progress.print();
    }
    println!();

    out.flush()
        .await
        .map_err(|e| fail(binary, format!("writing {:?}: {e}", dest)))?;

    debug!(binary, bytes = progress.downloaded, "download complete");
    Ok(progress.downloaded)
}

fn fail(binary: &str, err: impl std::fmt::Display) -> TunnelError {
    TunnelError::download(binary, DownloadStage::Download, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_percentage_when_size_known() {
        let mut p = DownloadProgress::new(Some(2 * 1024 * 1024));
        p.advance(1024 * 1024);
        assert_eq!(p.render(), "  Downloading... 50.0% (1.00 MB / 2.00 MB)");
    }

    #[test]
    fn renders_bytes_when_size_unknown() {
        let mut p = DownloadProgress::new(None);
        p.advance(512 * 1024);
        assert_eq!(p.render(), "  Downloading... 0.50 MB");

        // A zero Content-Length is treated as unknown.
        let p = DownloadProgress::new(Some(0));
        assert_eq!(p.total, None);
    }
}
