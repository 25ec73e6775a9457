// src/provision/artifact.rs

use crate::provision::platform::{Os, PlatformKey};
use crate::types::{ArchiveFormat, ProcessRole};

const FILEBROWSER_URL: &str =
    "https://github.com/filebrowser/filebrowser/releases/latest/download/{os}-{arch}-filebrowser.tar.gz";
const CLOUDFLARED_URL: &str =
    "https://github.com/cloudflare/cloudflared/releases/latest/download/cloudflared-{os}-{arch}";
const CLOUDFLARED_DARWIN_URL: &str =
    "https://github.com/cloudflare/cloudflared/releases/latest/download/cloudflared-{os}-{arch}.tgz";

/// Base names accepted when searching an archive for an executable, besides
/// the artifact's own name. Guards against archives that bundle the tool
/// under the project name instead of the binary name.
const ARCHIVE_ALIASES: &[&str] = &["filebrowser", "cloudflared"];

/// A remote executable to provision into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Cache file name and preferred archive entry name.
    pub name: String,
    pub url: String,
    pub format: ArchiveFormat,
}

impl Artifact {
    /// Build the artifact for `role` on `platform`, optionally from a
    /// user-supplied URL template.
    pub fn for_role(role: ProcessRole, platform: PlatformKey, template: Option<&str>) -> Self {
        let template = template.unwrap_or(match (role, platform.os) {
            (ProcessRole::FileServer, _) => FILEBROWSER_URL,
            (ProcessRole::Tunnel, Os::Darwin) => CLOUDFLARED_DARWIN_URL,
            (ProcessRole::Tunnel, Os::Linux) => CLOUDFLARED_URL,
        });
        let url = render_template(template, platform);
        let format = ArchiveFormat::from_url(&url);

        Self {
            name: role.binary_name().to_string(),
            url,
            format,
        }
    }

    /// Whether an archive entry with this base name is the executable.
    pub fn matches_entry(&self, base_name: &str) -> bool {
        base_name == self.name || ARCHIVE_ALIASES.contains(&base_name)
    }
}

/// Substitute `{os}` and `{arch}` in a URL template.
pub fn render_template(template: &str, platform: PlatformKey) -> String {
    template
        .replace("{os}", platform.os.as_str())
        .replace("{arch}", platform.arch.as_str())
}
