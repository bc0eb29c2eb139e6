use std::fs::File;
use std::path::Path;

use tracing::info;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Extract every entry of a zip archive below `dest`.
///
/// Entries with unsafe paths are rejected by `ZipArchive::extract`. On failure
/// a partially written tree may remain; callers must not record the archive
/// as done.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| archive.display().to_string());
    info!("Extracting {} into {:?}", name, dest);

    let file = File::open(archive).map_err(|e| Error::fs(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| Error::archive(&name, e))?;
    zip.extract(dest).map_err(|e| Error::archive(&name, e))?;

    info!("Extracted {} ({} entries)", name, zip.len());
    Ok(())
}
