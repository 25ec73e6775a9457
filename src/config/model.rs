// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [tunnel]
/// url_timeout = "30s"
/// startup_delay = "1s"
///
/// [cache]
/// dir = "/custom/cache"
///
/// [download]
/// filebrowser_url = "https://mirror.example/{os}-{arch}-filebrowser.tar.gz"
/// cloudflared_url = "https://mirror.example/cloudflared-{os}-{arch}"
/// ```
///
/// All sections are optional. This is the unchecked form; convert it into a
/// [`Config`] with `Config::try_from` to validate it.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tunnel: TunnelSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub download: DownloadSection,
}

/// `[tunnel]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TunnelSection {
    /// How long to wait for `cloudflared` to announce its public URL.
    #[serde(default = "default_url_timeout")]
    pub url_timeout: String,

    /// Pause between starting the file server and the tunnel client, giving
    /// the file server a moment to bind its port.
    #[serde(default = "default_startup_delay")]
    pub startup_delay: String,
}

fn default_url_timeout() -> String {
    "30s".to_string()
}

fn default_startup_delay() -> String {
    "1s".to_string()
}

impl Default for TunnelSection {
    fn default() -> Self {
        Self {
            url_timeout: default_url_timeout(),
            startup_delay: default_startup_delay(),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Override for `<home>/.cache/filebrowser-tunnel`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// `[download]` section.
///
/// URL templates may use `{os}` (`linux`/`darwin`) and `{arch}`
/// (`amd64`/`arm64`). A template ending in `.tar.gz`/`.tgz` is treated as an
/// archive, anything else as the raw executable.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DownloadSection {
    #[serde(default)]
    pub filebrowser_url: Option<String>,

    #[serde(default)]
    pub cloudflared_url: Option<String>,
}

/// Validated configuration used by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub url_timeout: Duration,
    pub startup_delay: Duration,
    pub cache_dir: Option<PathBuf>,
    pub filebrowser_url: Option<String>,
    pub cloudflared_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_timeout: Duration::from_secs(30),
            startup_delay: Duration::from_secs(1),
            cache_dir: None,
            filebrowser_url: None,
            cloudflared_url: None,
        }
    }
}
