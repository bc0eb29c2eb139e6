use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Run configuration, usually loaded from a JSON file.
///
/// Relative paths (`aoi`, `grid`, `gpt`, `graph_dir` and the four working
/// directories) are resolved against `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root data directory
    pub root: PathBuf,
    /// Area-of-interest vector file (single feature)
    pub aoi: PathBuf,
    /// Grid vector file; generated on first run if absent
    pub grid: PathBuf,
    /// Number of grid columns (x direction)
    pub grid_x: u32,
    /// Number of grid rows (y direction)
    pub grid_y: u32,
    /// Processing engine executable (SNAP `gpt`)
    pub gpt: PathBuf,
    /// Directory holding the engine graph templates; `root` when unset
    pub graph_dir: Option<PathBuf>,
    pub download_dir: PathBuf,
    pub preprocessing_dir: PathBuf,
    pub tiles_dir: PathBuf,
    pub result_dir: PathBuf,
    /// Suffix identifying downloaded archives
    pub archive_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            aoi: PathBuf::from("aoi.shp"),
            grid: PathBuf::from("grid.shp"),
            grid_x: 8,
            grid_y: 6,
            gpt: PathBuf::from("gpt"),
            graph_dir: None,
            download_dir: PathBuf::from("download"),
            preprocessing_dir: PathBuf::from("preprocessings"),
            tiles_dir: PathBuf::from("tiles"),
            result_dir: PathBuf::from("result"),
            archive_suffix: ".zip".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
        let config: PipelineConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_x == 0 {
            return Err(Error::InvalidArgument {
                arg: "grid_x",
                value: self.grid_x.to_string(),
            });
        }
        if self.grid_y == 0 {
            return Err(Error::InvalidArgument {
                arg: "grid_y",
                value: self.grid_y.to_string(),
            });
        }
        if self.archive_suffix.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "archive_suffix",
                value: String::new(),
            });
        }
        Ok(())
    }

    /// Resolve a configured path against `root` unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn graph_dir(&self) -> PathBuf {
        match &self.graph_dir {
            Some(dir) => self.resolve(dir),
            None => self.root.clone(),
        }
    }

    /// Engine executable; bare command names are looked up on `PATH`.
    pub fn gpt_command(&self) -> PathBuf {
        if self.gpt.components().count() > 1 {
            self.resolve(&self.gpt)
        } else {
            self.gpt.clone()
        }
    }
}
