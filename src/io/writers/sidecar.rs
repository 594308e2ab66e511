use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::metadata::LABEL_ENCODING;
use crate::api::ChangeSummary;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ChangeSidecar<'a> {
    tool: &'static str,
    version: &'static str,
    created: String,
    first_source: String,
    second_source: String,
    label_encoding: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    geotransform: Option<[f64; 6]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crs: Option<&'a str>,
    summary: &'a ChangeSummary,
}

/// Sidecar location for a change map: same stem, `.json` extension
pub fn sidecar_path(output: &Path) -> PathBuf {
    output.with_extension("json")
}

/// Write a pretty JSON summary next to `output`; returns the sidecar path.
pub fn create_change_sidecar(
    output: &Path,
    summary: &ChangeSummary,
    first: &Path,
    second: &Path,
    geotransform: Option<[f64; 6]>,
    crs: Option<&str>,
) -> Result<PathBuf> {
    let sidecar = ChangeSidecar {
        tool: "sarcd",
        version: env!("CARGO_PKG_VERSION"),
        created: chrono::Utc::now().to_rfc3339(),
        first_source: first.display().to_string(),
        second_source: second.display().to_string(),
        label_encoding: LABEL_ENCODING,
        geotransform,
        crs,
        summary,
    };

    let path = sidecar_path(output);
    let json_string = serde_json::to_string_pretty(&sidecar)?;
    std::fs::write(&path, json_string)?;

    info!("Created change-map sidecar: {:?}", path);
    Ok(path)
}
