use std::fmt;

/// Which of the two managed child processes something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    /// The `filebrowser` HTTP file server.
    FileServer,
    /// The `cloudflared` tunnel client.
    Tunnel,
}

impl ProcessRole {
    pub fn binary_name(self) -> &'static str {
        match self {
            ProcessRole::FileServer => "filebrowser",
            ProcessRole::Tunnel => "cloudflared",
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Stage of artifact provisioning an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStage {
    Download,
    Extract,
    Install,
}

impl fmt::Display for DownloadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadStage::Download => "download",
            DownloadStage::Extract => "extract",
            DownloadStage::Install => "install",
        };
        f.write_str(s)
    }
}

/// Layout of a downloaded artifact.
///
/// - `TarGz`: a gzip-compressed tarball containing the executable somewhere
///   inside it.
/// - `Raw`: the executable itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Raw,
}

impl ArchiveFormat {
    /// Infer the format from the artifact URL's file extension.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Raw
        }
    }
}
