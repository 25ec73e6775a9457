// src/provision/cache.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{Result, TunnelError};
use crate::fs::FileSystem;

/// On-disk cache of provisioned executables.
///
/// Layout is flat: `<dir>/<name>`, no metadata. Presence of the file is
/// taken as proof that it is valid; nothing is ever re-validated.
#[derive(Debug, Clone)]
pub struct BinaryCache {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl BinaryCache {
    pub fn new(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    /// `<home>/.cache/filebrowser-tunnel`, or the configured override.
    pub fn resolve_dir(fs: &dyn FileSystem, configured: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = configured {
            return Ok(dir.to_path_buf());
        }
        let home = fs.home_dir().ok_or_else(|| {
            TunnelError::Config("cannot determine home directory for the cache".to_string())
        })?;
        Ok(home.join(".cache").join(crate::PRODUCT_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Cached path for `name`, if present.
    pub fn lookup(&self, name: &str) -> Option<PathBuf> {
        let path = self.path_for(name);
        if self.fs.exists(&path) {
            debug!(binary = name, path = ?path, "cache hit");
            Some(path)
        } else {
            debug!(binary = name, path = ?path, "cache miss");
            None
        }
    }

    /// Create the cache directory if needed.
    pub fn ensure_dir(&self) -> Result<()> {
        self.fs.create_dir_all(&self.dir).map_err(|e| {
            TunnelError::Config(format!("failed to create cache directory {:?}: {e:#}", self.dir))
        })
    }

    /// Delete the whole cache directory. A missing directory is not an error.
    pub fn clear(&self) -> Result<()> {
        self.fs
            .remove_dir_all(&self.dir)
            .map_err(|source| TunnelError::CacheClearFailed {
                path: self.dir.clone(),
                source,
            })?;
        info!(path = ?self.dir, "cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn mock() -> Arc<MockFileSystem> {
        Arc::new(MockFileSystem::new("/work", Some(PathBuf::from("/home/u"))))
    }

    #[test]
    fn default_dir_lives_under_home() {
        let fs = mock();
        let dir = BinaryCache::resolve_dir(fs.as_ref(), None).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.cache/filebrowser-tunnel"));

        let custom = BinaryCache::resolve_dir(fs.as_ref(), Some(Path::new("/opt/c"))).unwrap();
        assert_eq!(custom, PathBuf::from("/opt/c"));
    }

    #[test]
    fn missing_home_is_a_config_error() {
        let fs = MockFileSystem::new("/work", None);
        assert!(matches!(
            BinaryCache::resolve_dir(&fs, None),
            Err(TunnelError::Config(_))
        ));
    }

    #[test]
    fn lookup_reports_presence_only() {
        let fs = mock();
        let cache = BinaryCache::new("/home/u/.cache/filebrowser-tunnel", fs.clone());
        assert!(cache.lookup("filebrowser").is_none());

        fs.add_file("/home/u/.cache/filebrowser-tunnel/filebrowser");
        assert_eq!(
            cache.lookup("filebrowser"),
            Some(PathBuf::from("/home/u/.cache/filebrowser-tunnel/filebrowser"))
        );
    }

    #[test]
    fn clear_removes_everything_and_tolerates_absence() {
        let fs = mock();
        let cache = BinaryCache::new("/home/u/.cache/filebrowser-tunnel", fs.clone());
        fs.add_file("/home/u/.cache/filebrowser-tunnel/cloudflared");

        cache.clear().unwrap();
        assert!(!fs.exists(Path::new("/home/u/.cache/filebrowser-tunnel/cloudflared")));
        assert!(!fs.exists(cache.dir()));
        assert!(fs.exists(Path::new("/home/u")));

        cache.clear().unwrap();
    }

    #[test]
    fn clear_failure_is_reported() {
        let fs = mock();
        fs.add_file("/home/u/not-a-dir");
        let cache = BinaryCache::new("/home/u/not-a-dir", fs);
        assert!(matches!(
            cache.clear(),
            Err(TunnelError::CacheClearFailed { .. })
        ));
    }
}
