//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Precondition failures (shape, parameters, non-finite input) are raised before any
//! computation; collaborator errors (I/O, JSON, GDAL) are converted via `#[from]`.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Shape mismatch: first image is {}x{}, second image is {}x{}",
        first.0, first.1, second.0, second.1
    )]
    ShapeMismatch {
        first: (usize, usize),
        second: (usize, usize),
    },

    #[error("Invalid parameter: {param}={value} ({reason})")]
    InvalidParameter {
        param: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Empty image: {rows}x{cols}")]
    EmptyImage { rows: usize, cols: usize },

    #[error("Non-finite value in {image} image at row {row}, col {col}")]
    NonFiniteInput {
        image: &'static str,
        row: usize,
        col: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),
}

impl Error {
    pub(crate) fn invalid<V: std::fmt::Display>(
        param: &'static str,
        value: V,
        reason: &'static str,
    ) -> Self {
        Error::InvalidParameter {
            param,
            value: value.to_string(),
            reason,
        }
    }
}
