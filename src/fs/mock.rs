// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File,
    Dir,
}

/// In-memory filesystem for unit tests.
///
/// Only tracks which paths exist and whether they are directories; file
/// contents are irrelevant to the code that uses [`FileSystem`].
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    dirs: Arc<Mutex<HashSet<PathBuf>>>,
    files: Arc<Mutex<HashSet<PathBuf>>>,
    cwd: PathBuf,
    home: Option<PathBuf>,
}

impl MockFileSystem {
    /// Create a mock with the given working and home directories, both of
    /// which exist.
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        let fs = Self {
            dirs: Arc::new(Mutex::new(HashSet::new())),
            files: Arc::new(Mutex::new(HashSet::new())),
            cwd: cwd.into(),
            home,
        };
        fs.add_dir(fs.cwd.clone());
        if let Some(home) = fs.home.clone() {
            fs.add_dir(home);
        }
        fs
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.lock().unwrap().insert(path.to_path_buf());
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        let path = path.as_ref();
        if self.dirs.lock().unwrap().contains(path) {
            Some(MockEntry::Dir)
        } else if self.files.lock().unwrap().contains(path) {
            Some(MockEntry::File)
        } else {
            None
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entry(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entry(path) == Some(MockEntry::Dir)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.files.lock().unwrap().contains(path) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        self.add_dir(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        if self.files.lock().unwrap().contains(path) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        self.dirs.lock().unwrap().retain(|p| !p.starts_with(path));
        self.files.lock().unwrap().retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}
