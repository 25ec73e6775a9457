// src/config/mod.rs

//! Configuration loading and validation for filebrowser-tunnel.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a checked [`Config`] (`validate.rs`).
//!
//! A config file is optional; without one the built-in defaults apply.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{
    default_config_path, load, load_and_validate, load_cache_dir, load_from_path,
};
pub use model::{CacheSection, Config, DownloadSection, RawConfigFile, TunnelSection};
