//! Append-only record of archives that have already been extracted.
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// `done.txt`: one archive file name per line.
///
/// Membership is exact string equality against trimmed lines, so an archive
/// whose name is a substring of another is never mistaken for it.
#[derive(Debug)]
pub struct RunLedger {
    path: PathBuf,
    entries: HashSet<String>,
}

impl RunLedger {
    /// Load the ledger, treating a missing file as empty.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(Error::fs(path, e)),
        };
        debug!("Loaded {} ledger entries from {:?}", entries.len(), path);
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn contains(&self, archive_name: &str) -> bool {
        self.entries.contains(archive_name)
    }

    /// Append an archive name. Call only after its extraction succeeded.
    pub fn record(&mut self, archive_name: &str) -> Result<()> {
        if self.contains(archive_name) {
            return Ok(());
        }
        let path = self.path.as_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::fs(path, e))?;
        writeln!(file, "{}", archive_name)
            .and_then(|_| file.sync_data())
            .map_err(|e| Error::fs(path, e))?;
        self.entries.insert(archive_name.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
