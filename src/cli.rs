// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `filebrowser-tunnel`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "filebrowser-tunnel",
    version,
    about = "Share a local directory over a temporary public Cloudflare tunnel.",
    long_about = None,
    after_help = "Examples:\n  \
        filebrowser-tunnel              Serve the current directory\n  \
        filebrowser-tunnel ~/Documents  Serve ~/Documents\n  \
        filebrowser-tunnel --clean      Clear cached binaries"
)]
pub struct CliArgs {
    /// Directory to serve. `~` expands to the home directory.
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: String,

    /// Remove the binary cache and exit.
    #[arg(long)]
    pub clean: bool,

    /// Path to a config file (TOML).
    ///
    /// Default: `~/.config/filebrowser-tunnel/config.toml` if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FILEBROWSER_TUNNEL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
