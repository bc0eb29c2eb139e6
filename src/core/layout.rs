//! Deterministic naming of every artifact the pipeline reads or writes.
//!
//! All stages derive their paths from here so that idempotency probes and
//! engine parameters agree on the same names:
//!
//! ```text
//! {download}/S1A_..._DADE.zip
//! {preprocessing}/done.txt
//! {preprocessing}/S1A_..._DADE.SAFE/manifest.safe
//! {preprocessing}/{YYYYMMDD}.dim            calibrated date product
//! {tiles}/{i}_{j}/{YYYYMMDD}.dim            tile-date sub-image
//! {tiles}/{i}_{j}/Sigma0_filtered.dim       linear filtered stack
//! {tiles}/{i}_{j}/Sigma0_filtered_db.data/  dB filtered stack bands
//! {result}/{i}_{j}/sigma0_db_{kind}_{i}_{j}_{YYMMDD}.tif
//! ```
use std::path::{Path, PathBuf};

use crate::core::params::PipelineConfig;
use crate::types::{AcquisitionDate, ProductKind, TileId};

pub const LEDGER_FILE: &str = "done.txt";
pub const MANIFEST_FILE: &str = "manifest.safe";
pub const DIMAP_EXT: &str = "dim";
pub const DIMAP_DATA_EXT: &str = "data";
pub const FILTERED_STACK: &str = "Sigma0_filtered";
pub const FILTERED_STACK_DB: &str = "Sigma0_filtered_db";

#[derive(Debug, Clone)]
pub struct Layout {
    pub download: PathBuf,
    pub preprocessing: PathBuf,
    pub tiles: PathBuf,
    pub result: PathBuf,
}

impl Layout {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            download: config.resolve(&config.download_dir),
            preprocessing: config.resolve(&config.preprocessing_dir),
            tiles: config.resolve(&config.tiles_dir),
            result: config.resolve(&config.result_dir),
        }
    }

    /// Layout using the default directory names below `root`.
    pub fn under(root: &Path) -> Self {
        Self::from_config(&PipelineConfig {
            root: root.to_path_buf(),
            ..Default::default()
        })
    }

    pub fn ledger(&self) -> PathBuf {
        self.preprocessing.join(LEDGER_FILE)
    }

    pub fn archive(&self, archive_name: &str) -> PathBuf {
        self.download.join(archive_name)
    }

    /// `manifest.safe` of an extracted archive; the SAFE directory is named
    /// after the archive with its suffix replaced by `.SAFE`.
    pub fn scene_manifest(&self, archive_name: &str, archive_suffix: &str) -> PathBuf {
        let stem = archive_name
            .strip_suffix(archive_suffix)
            .unwrap_or(archive_name);
        self.preprocessing
            .join(format!("{}.SAFE", stem))
            .join(MANIFEST_FILE)
    }

    /// Engine output target for a date (the engine appends `.dim`).
    pub fn calibrated_target(&self, date: AcquisitionDate) -> PathBuf {
        self.preprocessing.join(date.to_string())
    }

    pub fn calibrated_product(&self, date: AcquisitionDate) -> PathBuf {
        dimap(&self.calibrated_target(date))
    }

    pub fn tile_dir(&self, tile: TileId) -> PathBuf {
        self.tiles.join(tile.to_string())
    }

    pub fn tile_subimage(&self, tile: TileId, date: AcquisitionDate) -> PathBuf {
        dimap(&self.tile_dir(tile).join(date.to_string()))
    }

    pub fn filtered_target(&self, tile: TileId) -> PathBuf {
        self.tile_dir(tile).join(FILTERED_STACK)
    }

    pub fn filtered_db_target(&self, tile: TileId) -> PathBuf {
        self.tile_dir(tile).join(FILTERED_STACK_DB)
    }

    pub fn filtered_db_product(&self, tile: TileId) -> PathBuf {
        dimap(&self.filtered_db_target(tile))
    }

    /// Directory holding the per-band `.img` rasters of the dB stack.
    pub fn filtered_db_bands(&self, tile: TileId) -> PathBuf {
        dimap_data(&self.filtered_db_product(tile))
    }

    pub fn result_dir(&self, tile: TileId) -> PathBuf {
        self.result.join(tile.to_string())
    }

    pub fn product(&self, tile: TileId, kind: ProductKind, date: &str) -> PathBuf {
        self.result_dir(tile)
            .join(format!("sigma0_db_{}_{}_{}.tif", kind.tag(), tile, date))
    }
}

/// `target` with the `.dim` extension appended.
pub fn dimap(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".");
    name.push(DIMAP_EXT);
    PathBuf::from(name)
}

/// Sibling `.data` directory of a `.dim` header.
pub fn dimap_data(header: &Path) -> PathBuf {
    header.with_extension(DIMAP_DATA_EXT)
}
