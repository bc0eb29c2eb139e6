//! Filesystem-backed artifact store.
//!
//! Every idempotency probe and every cleanup in the pipeline goes through
//! `ArtifactStore`, so the "does it exist / make room for it / drop it"
//! contract is the same for ledger files, calibrated products, tile
//! sub-images and result directories.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::layout::dimap_data;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactStore;

impl ArtifactStore {
    pub fn new() -> Self {
        Self
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Create a directory (and parents) if it does not exist yet.
    pub fn create_dir(&self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            debug!("Creating directory {:?}", path);
            fs::create_dir_all(path).map_err(|e| Error::fs(path, e))?;
        }
        Ok(())
    }

    /// Create an empty file if it does not exist yet, leaving existing content untouched.
    pub fn create_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir(parent)?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::fs(path, e))?;
        Ok(())
    }

    /// Paths of the entries of `dir`, sorted by name.
    pub fn entries(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = fs::read_dir(dir)
            .and_then(|it| it.map(|e| e.map(|e| e.path())).collect::<std::io::Result<Vec<_>>>())
            .map_err(|e| Error::fs(dir, e))?;
        paths.sort();
        Ok(paths)
    }

    /// Remove a file or a directory tree. Missing paths are not an error.
    pub fn delete(&self, path: &Path) -> Result<()> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => {
                debug!("Removing directory {:?}", path);
                fs::remove_dir_all(path).map_err(|e| Error::fs(path, e))?;
            }
            Ok(_) => {
                debug!("Removing file {:?}", path);
                fs::remove_file(path).map_err(|e| Error::fs(path, e))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::fs(path, e)),
        }
        Ok(())
    }

    /// Remove a BEAM-DIMAP product: the `.dim` header and its `.data` directory.
    pub fn delete_dimap(&self, header: &Path) -> Result<()> {
        self.delete(header)?;
        self.delete(&dimap_data(header))
    }
}
