// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract view of the host filesystem and process environment used by
/// directory resolution and the binary cache.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a directory tree. Removing something that does not exist is
    /// not an error.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    fn current_dir(&self) -> Result<PathBuf>;
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Implementation that uses `std::fs` and the real process environment.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("setting permissions on {:?}", path))?;
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing dir {:?}", path)),
        }
    }

    fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("reading current working directory")
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}
