// src/exec/paths.rs

use std::path::{Path, PathBuf};

use crate::errors::{Result, TunnelError};
use crate::fs::FileSystem;

/// Resolve the directory to serve into an absolute path that exists.
///
/// - `""` and `"."` are the current working directory.
/// - A leading `~` or `~/` is the home directory.
/// - Other relative paths are joined onto the current working directory.
pub fn resolve_serve_dir(fs: &dyn FileSystem, dir: &str) -> Result<PathBuf> {
    let resolved = if dir.is_empty() || dir == "." {
        fs.current_dir()?
    } else if let Some(rest) = home_relative(dir) {
        let home = fs.home_dir().ok_or_else(|| {
            TunnelError::Config(format!("cannot expand '{dir}': home directory unknown"))
        })?;
        if rest.is_empty() { home } else { home.join(rest) }
    } else {
        let path = Path::new(dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            fs.current_dir()?.join(path)
        }
    };

    if !fs.is_dir(&resolved) {
        return Err(TunnelError::DirectoryNotFound(resolved));
    }
    Ok(resolved)
}

/// `"~"` → `Some("")`, `"~/x"` → `Some("x")`, anything else → `None`.
fn home_relative(dir: &str) -> Option<&str> {
    let rest = dir.strip_prefix('~')?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/').map(|r| r.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn fs() -> MockFileSystem {
        let fs = MockFileSystem::new("/work", Some(PathBuf::from("/home/u")));
        fs.add_dir("/home/u/Downloads");
        fs.add_dir("/work/site");
        fs.add_dir("/srv/data");
        fs.add_file("/work/notes.txt");
        fs
    }

    #[test]
    fn dot_and_empty_are_cwd() {
        let fs = fs();
        assert_eq!(resolve_serve_dir(&fs, ".").unwrap(), PathBuf::from("/work"));
        assert_eq!(resolve_serve_dir(&fs, "").unwrap(), PathBuf::from("/work"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let fs = fs();
        assert_eq!(resolve_serve_dir(&fs, "~").unwrap(), PathBuf::from("/home/u"));
        assert_eq!(
            resolve_serve_dir(&fs, "~/Downloads").unwrap(),
            PathBuf::from("/home/u/Downloads")
        );
    }

    #[test]
    fn relative_and_absolute_paths() {
        let fs = fs();
        assert_eq!(resolve_serve_dir(&fs, "site").unwrap(), PathBuf::from("/work/site"));
        assert_eq!(resolve_serve_dir(&fs, "/srv/data").unwrap(), PathBuf::from("/srv/data"));
    }

    #[test]
    fn missing_or_non_directory_fails() {
        let fs = fs();
        match resolve_serve_dir(&fs, "nope") {
            Err(TunnelError::DirectoryNotFound(p)) => assert_eq!(p, PathBuf::from("/work/nope")),
            other => panic!("expected DirectoryNotFound, got {other:?}"),
        }
        assert!(matches!(
            resolve_serve_dir(&fs, "notes.txt"),
            Err(TunnelError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn tilde_user_is_not_expanded() {
        let fs = fs();
        fs.add_dir("/work/~bob");
        assert_eq!(resolve_serve_dir(&fs, "~bob").unwrap(), PathBuf::from("/work/~bob"));
    }
}
