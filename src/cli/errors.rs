use std::path::PathBuf;

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Config file not found: {path:?}")]
    ConfigNotFound { path: PathBuf },

    #[error(transparent)]
    Pipeline(#[from] orbitstack::Error),
}
