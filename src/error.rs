//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, GDAL, archive, XML and config errors, and provides
//! semantic variants that carry enough context (file, date, tile) to resume a run.
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::EngineError;
use crate::types::Stage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error on {path:?}: {source}")]
    Fs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Archive error in {archive}: {source}")]
    Archive {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Manifest parse error in {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Processing engine error for {context}: {source}")]
    Engine {
        context: String,
        #[source]
        source: EngineError,
    },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Malformed archive name `{name}`: {reason}")]
    MalformedArchiveName { name: String, reason: String },

    #[error("Malformed band name `{name}` in tile {tile}: {reason}")]
    MalformedBandName {
        name: String,
        tile: String,
        reason: String,
    },

    #[error("Area of interest {0:?} contains no features")]
    EmptyAoi(PathBuf),

    #[error("Feature {id} of {path:?} has no geometry")]
    MissingGeometry { path: PathBuf, id: u64 },

    #[error("Feature {id} of {path:?} has no `{field}` field")]
    MissingField {
        path: PathBuf,
        id: u64,
        field: &'static str,
    },

    #[error("Manifest for archive {archive} not found at {path:?}")]
    MissingManifest { archive: String, path: PathBuf },

    #[error("Engine reported success but {0:?} was not produced")]
    MissingEngineOutput(PathBuf),

    #[error("Tile {tile} is missing sub-image for date {date} ({path:?})")]
    MissingSubImage {
        tile: String,
        date: String,
        path: PathBuf,
    },

    #[error("Dimension mismatch: expected {0}x{1}, got {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    #[error("{stage} failed (last completed stage: {}): {source}", completed_label(.completed))]
    StageFailed {
        stage: Stage,
        completed: Option<Stage>,
        #[source]
        source: Box<Error>,
    },
}

fn completed_label(completed: &Option<Stage>) -> String {
    match completed {
        Some(stage) => stage.to_string(),
        None => "none".to_string(),
    }
}

impl Error {
    pub fn engine<S: Into<String>>(context: S, source: EngineError) -> Self {
        Error::Engine {
            context: context.into(),
            source,
        }
    }

    /// Filesystem error on `path`.
    pub fn fs(path: &Path, source: std::io::Error) -> Self {
        Error::Fs {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn manifest(path: &Path, source: quick_xml::Error) -> Self {
        Error::Manifest {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn archive<S: Into<String>>(archive: S, source: zip::result::ZipError) -> Self {
        Error::Archive {
            archive: archive.into(),
            source,
        }
    }
}
