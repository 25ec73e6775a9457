// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::model::{CacheSection, Config, RawConfigFile};
use crate::errors::{Result, TunnelError};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to get
/// a checked [`Config`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        TunnelError::Config(format!("reading config file at {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = load_from_path(&path)?;
    let config = Config::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for this run.
///
/// - An explicit `--config` path must exist and be valid.
/// - Otherwise the default location is used if a file is present there.
/// - Otherwise built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        debug!(path = ?path, "loading config from --config");
        return load_and_validate(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!(path = ?path, "loading config from default location");
            load_and_validate(path)
        }
        _ => {
            debug!("no config file found; using defaults");
            Ok(Config::default())
        }
    }
}

/// Only the `[cache]` table; every other key is ignored.
#[derive(Debug, Default, Deserialize)]
struct CacheOnly {
    #[serde(default)]
    cache: CacheSection,
}

/// Resolve just the configured cache directory, for `--clean`.
///
/// Other sections are not parsed or validated, so a config that is broken
/// elsewhere does not prevent clearing the cache. A file that is not valid
/// TOML at all is reported and the default cache directory is used.
/// An explicit path that cannot be read is still an error.
pub fn load_cache_dir(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.is_file() => path,
            _ => return Ok(None),
        },
    };

    let contents = fs::read_to_string(&path).map_err(|e| {
        TunnelError::Config(format!("reading config file at {:?}: {e}", path))
    })?;

    match toml::from_str::<CacheOnly>(&contents) {
        Ok(file) => Ok(file.cache.dir.filter(|d| !d.as_os_str().is_empty())),
        Err(e) => {
            warn!(path = ?path, error = %e, "config file unreadable; using default cache directory");
            Ok(None)
        }
    }
}

/// `<home>/.config/filebrowser-tunnel/config.toml`, if a home directory is
/// known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(crate::PRODUCT_NAME)
            .join("config.toml")
    })
}
