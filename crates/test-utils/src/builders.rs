#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use filebrowser_tunnel::provision::BinaryPaths;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

/// URL the stand-in tunnel client announces by default.
pub const STAND_IN_URL: &str = "https://stand-in-quick-tunnel.trycloudflare.com";

/// Write an executable `#!/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stand-in script");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("chmod stand-in script");
    }
    path
}

/// Builder for a pair of stand-in executables.
///
/// By default the file server sleeps, and the tunnel client prints a
/// cloudflared-style banner with [`STAND_IN_URL`] to stderr, then sleeps.
/// `exec` is used so killing the script kills the sleeper too.
pub struct StandInBuilder {
    file_server: String,
    tunnel: String,
}

impl StandInBuilder {
    pub fn new() -> Self {
        Self {
            file_server: "exec sleep 30".to_string(),
            tunnel: tunnel_body(&[STAND_IN_URL], "exec sleep 30"),
        }
    }

    /// Replace the file-server script body.
    pub fn file_server(mut self, body: &str) -> Self {
        self.file_server = body.to_string();
        self
    }

    /// Tunnel client that announces `urls` (in order), then runs `then`.
    pub fn tunnel_announcing(mut self, urls: &[&str], then: &str) -> Self {
        self.tunnel = tunnel_body(urls, then);
        self
    }

    /// Replace the tunnel-client script body.
    pub fn tunnel(mut self, body: &str) -> Self {
        self.tunnel = body.to_string();
        self
    }

    /// Write both scripts into a fresh temp dir. Keep the `TempDir` alive
    /// for as long as the scripts are used.
    pub fn build(self) -> (TempDir, BinaryPaths) {
        let dir = TempDir::new().expect("create temp dir");
        let filebrowser = write_script(dir.path(), "filebrowser", &self.file_server);
        let cloudflared = write_script(dir.path(), "cloudflared", &self.tunnel);
        (
            dir,
            BinaryPaths {
                filebrowser,
                cloudflared,
            },
        )
    }
}

impl Default for StandInBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn tunnel_body(urls: &[&str], then: &str) -> String {
    let mut body = String::from(
        "echo 'INF Requesting new quick Tunnel on trycloudflare.com...' >&2\n",
    );
    for url in urls {
        body.push_str(&format!(
            "echo 'INF |  {url}                           |' >&2\n"
        ));
    }
    body.push_str(then);
    body
}

/// Builder for an in-memory tar+gzip archive.
pub struct TarGzBuilder {
    builder: tar::Builder<GzEncoder<Vec<u8>>>,
}

impl TarGzBuilder {
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    /// Add a regular file at `path` with `contents`.
    pub fn file(mut self, path: &str, contents: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, contents)
            .expect("append tar file");
        self
    }

    /// Add a directory entry at `path`.
    pub fn dir(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .expect("append tar dir");
        self
    }

    pub fn build(self) -> Vec<u8> {
        let gz = self.builder.into_inner().expect("finish tar");
        gz.finish().expect("finish gzip")
    }
}

impl Default for TarGzBuilder {
    fn default() -> Self {
        Self::new()
    }
}
