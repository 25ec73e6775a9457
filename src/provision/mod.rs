// src/provision/mod.rs

//! Acquisition of the `filebrowser` and `cloudflared` executables.
//!
//! - [`platform`] maps the running OS/arch onto release-asset names.
//! - [`artifact`] knows where each binary is published and in what layout.
//! - [`download`] streams an artifact to disk with progress output.
//! - [`extract`] pulls the executable out of a tar+gzip archive.
//! - [`cache`] owns the on-disk cache directory.
//!
//! Artifacts are fetched once and kept forever; a cached file is never
//! re-checked. Downloads are not checksum-verified (upstream publishes no
//! stable checksum file for the "latest" URLs used here).

pub mod artifact;
pub mod cache;
pub mod download;
pub mod extract;
pub mod platform;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{Result, TunnelError};
use crate::fs::FileSystem;
use crate::types::{ArchiveFormat, DownloadStage, ProcessRole};

pub use artifact::Artifact;
pub use cache::BinaryCache;
pub use platform::{Arch, Os, PlatformKey};

/// Paths of the two executables the session needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPaths {
    pub filebrowser: PathBuf,
    pub cloudflared: PathBuf,
}

/// Makes sure both executables exist in the cache, fetching them if needed.
#[derive(Debug)]
pub struct Provisioner {
    platform: PlatformKey,
    cache: BinaryCache,
    client: reqwest::Client,
    filebrowser: Artifact,
    cloudflared: Artifact,
}

impl Provisioner {
    pub fn new(platform: PlatformKey, cfg: &Config, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let dir = BinaryCache::resolve_dir(fs.as_ref(), cfg.cache_dir.as_deref())?;
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TunnelError::Other(e.into()))?;

        Ok(Self {
            platform,
            cache: BinaryCache::new(dir, fs),
            client,
            filebrowser: Artifact::for_role(
                ProcessRole::FileServer,
                platform,
                cfg.filebrowser_url.as_deref(),
            ),
            cloudflared: Artifact::for_role(
                ProcessRole::Tunnel,
                platform,
                cfg.cloudflared_url.as_deref(),
            ),
        })
    }

    pub fn cache(&self) -> &BinaryCache {
        &self.cache
    }

    /// Ensure both binaries are present and executable.
    pub async fn ensure_binaries(&self) -> Result<BinaryPaths> {
        self.cache.ensure_dir()?;

        println!("🔍 Platform: {}", self.platform);
        println!("📁 Cache directory: {}\n", self.cache.dir().display());

        let filebrowser = self.ensure(&self.filebrowser).await?;
        let cloudflared = self.ensure(&self.cloudflared).await?;
        println!();

        Ok(BinaryPaths {
            filebrowser,
            cloudflared,
        })
    }

    /// Return the cached executable for `artifact`, downloading it first on a
    /// cache miss.
    pub async fn ensure(&self, artifact: &Artifact) -> Result<PathBuf> {
        if let Some(path) = self.cache.lookup(&artifact.name) {
            return Ok(path);
        }

        println!("📦 Downloading {}...", artifact.name);

        let target = self.cache.path_for(&artifact.name);
        let download = self.cache.path_for(&format!("{}.download", artifact.name));
        let staged = self.cache.path_for(&format!("{}.part", artifact.name));

        let result = self.fetch(artifact, &download, &staged, &target).await;

        // Leftovers from either a success or a failure.
        for leftover in [&download, &staged] {
            remove_if_present(leftover);
        }

        result?;
        println!("  ✓ {} ready", artifact.name);
        info!(binary = %artifact.name, path = ?target, "binary provisioned");
        Ok(target)
    }

    async fn fetch(
        &self,
        artifact: &Artifact,
        download: &Path,
        staged: &Path,
        target: &Path,
    ) -> Result<()> {
        download::download_to(&self.client, &artifact.name, &artifact.url, download).await?;

        match artifact.format {
            ArchiveFormat::TarGz => {
                println!("  Extracting...");
                let archive = download.to_path_buf();
                let dest = staged.to_path_buf();
                let art = artifact.clone();
                tokio::task::spawn_blocking(move || extract::extract_binary(&archive, &art, &dest))
                    .await
                    .map_err(|e| {
                        TunnelError::download(&artifact.name, DownloadStage::Extract, e)
                    })??;
            }
            ArchiveFormat::Raw => {
                tokio::fs::rename(download, staged).await.map_err(|e| {
                    TunnelError::download(&artifact.name, DownloadStage::Install, e)
                })?;
            }
        }

        install(&artifact.name, staged, target).await
    }
}

/// Mark `staged` executable (`0o755`) and move it to its final cache path.
async fn install(binary: &str, staged: &Path, target: &Path) -> Result<()> {
    let fail = |e: std::io::Error| TunnelError::download(binary, DownloadStage::Install, e);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(staged, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(fail)?;
    }

    tokio::fs::rename(staged, target).await.map_err(fail)?;
    debug!(binary, path = ?target, "installed into cache");
    Ok(())
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = ?path, "removed intermediate file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "failed to remove intermediate file"),
    }
}
