// src/provision/extract.rs

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::errors::{Result, TunnelError};
use crate::provision::artifact::Artifact;
use crate::types::DownloadStage;

/// Copy the executable for `artifact` out of the tar+gzip file at `archive`
/// into `dest`.
///
/// The first regular-file entry whose base name matches the artifact (or one
/// of its aliases) wins. Blocking; run it off the async runtime.
pub fn extract_binary(archive: &Path, artifact: &Artifact, dest: &Path) -> Result<PathBuf> {
    let fail = |e: io::Error| TunnelError::download(&artifact.name, DownloadStage::Extract, e);

    let file = File::open(archive).map_err(fail)?;
    let mut tar = Archive::new(GzDecoder::new(file));

    for entry in tar.entries().map_err(fail)? {
        let mut entry = entry.map_err(fail)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_path = entry.path().map_err(fail)?.into_owned();
        let Some(base) = entry_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !artifact.matches_entry(base) {
            continue;
        }

        debug!(binary = %artifact.name, entry = ?entry_path, "found executable in archive");
        let mut out = File::create(dest).map_err(fail)?;
        io::copy(&mut entry, &mut out).map_err(fail)?;
        return Ok(dest.to_path_buf());
    }

    Err(TunnelError::BinaryNotFoundInArchive {
        binary: artifact.name.clone(),
        archive: archive.to_path_buf(),
    })
}
