use std::path::PathBuf;
use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Band index must be 1 or greater, got: {band}")]
    InvalidBand { band: usize },

    #[error("First and second acquisitions are the same file: {path:?}")]
    SameInput { path: PathBuf },

    #[error("Failed to load config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: sarcd::Error,
    },

    #[error("Invalid parameters: {0}")]
    Params(#[from] sarcd::Error),
}
