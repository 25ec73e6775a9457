// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod net;
pub mod provision;
pub mod tunnel_url;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::engine::{run_session, shutdown_signal, SessionEnd, SessionOptions};
use crate::exec::ProcessManager;
use crate::fs::{FileSystem, RealFileSystem};
use crate::provision::{PlatformKey, Provisioner};

/// Name used for the cache and config directories.
pub const PRODUCT_NAME: &str = "filebrowser-tunnel";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - `--clean` handling
/// - binary provisioning
/// - port selection
/// - the tunnel session, with SIGINT/SIGTERM as its shutdown trigger
pub async fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.clean {
        return clean(args.config.as_deref(), fs);
    }

    let cfg = config::load(args.config.as_deref()).context("failed to load configuration")?;
    debug!(?cfg, "configuration loaded");

    print_banner();

    let platform = PlatformKey::detect()?;
    let provisioner = Provisioner::new(platform, &cfg, Arc::clone(&fs))?;
    let binaries = provisioner
        .ensure_binaries()
        .await
        .context("failed to ensure binaries")?;

    let port = net::free_port().context("failed to find a free port")?;
    info!(port, "using local port");

    let manager = Arc::new(ProcessManager::with_fs(fs));
    let opts = SessionOptions::new(args.directory, &cfg);

    match run_session(manager, &binaries, port, &opts, shutdown_signal()).await? {
        SessionEnd::Interrupted => debug!("session interrupted"),
        SessionEnd::Exited => debug!("session ended"),
    }
    Ok(())
}

/// `--clean`: only the cache location is read from the config.
fn clean(config_path: Option<&Path>, fs: Arc<dyn FileSystem>) -> Result<()> {
    let configured = config::load_cache_dir(config_path)?;
    let dir = provision::BinaryCache::resolve_dir(fs.as_ref(), configured.as_deref())?;
    provision::BinaryCache::new(dir, fs).clear()?;
    println!("Cache cleared successfully");
    Ok(())
}

fn print_banner() {
    println!("🚀 Filebrowser Tunnel");
    println!("=====================\n");
}
