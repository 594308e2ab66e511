#[cfg(feature = "gdal")]
use gdal::{Dataset, Metadata};
use std::collections::HashMap;
use std::path::Path;
#[cfg(feature = "gdal")]
use tracing::debug;

use crate::api::ChangeSummary;
#[cfg(feature = "gdal")]
use crate::io::{GdalError, RasterMetadata};

pub const LABEL_ENCODING: &str = "-1=disappearance,0=no change,1=appearance";

/// Collect the dataset-level metadata items describing a change map
pub fn change_metadata_fields(
    summary: &ChangeSummary,
    first: &Path,
    second: &Path,
) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    let params = &summary.params;

    // Inputs
    metadata.insert("FIRST_SOURCE".to_string(), first.display().to_string());
    metadata.insert("SECOND_SOURCE".to_string(), second.display().to_string());
    metadata.insert("LABEL_ENCODING".to_string(), LABEL_ENCODING.to_string());

    // Detection parameters
    metadata.insert("CHANGE_DETECTOR".to_string(), summary.detector.clone());
    metadata.insert("FILTER_SIZE".to_string(), params.filter_size.to_string());
    metadata.insert("CONTAMINATION".to_string(), params.contamination.to_string());
    metadata.insert("SEED".to_string(), params.seed.to_string());
    metadata.insert("N_ESTIMATORS".to_string(), params.n_estimators.to_string());
    metadata.insert("MAX_SAMPLES".to_string(), params.max_samples.to_string());
    metadata.insert("SMOOTHING_DOMAIN".to_string(), params.domain.to_string());
    metadata.insert("BOUNDARY_MODE".to_string(), params.boundary.to_string());
    metadata.insert("NAN_POLICY".to_string(), params.nan_policy.to_string());

    // Outcome
    metadata.insert("APPEARANCE_PIXELS".to_string(), summary.appearance.to_string());
    metadata.insert(
        "DISAPPEARANCE_PIXELS".to_string(),
        summary.disappearance.to_string(),
    );
    metadata.insert("UNCHANGED_PIXELS".to_string(), summary.unchanged.to_string());
    metadata.insert("MASKED_PIXELS".to_string(), summary.masked.to_string());
    metadata.insert("DEGENERATE_PIXELS".to_string(), summary.degenerate.to_string());
    if let Some(threshold) = summary.threshold {
        metadata.insert("ANOMALY_THRESHOLD".to_string(), threshold.to_string());
    }

    // Provenance
    metadata.insert("CONVERSION_TOOL".to_string(), "sarcd".to_string());
    metadata.insert(
        "CONVERSION_VERSION".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    metadata.insert(
        "CONVERSION_TIMESTAMP".to_string(),
        chrono::Utc::now().to_rfc3339(),
    );

    metadata
}

/// Copy georeferencing from the source raster and attach metadata items.
///
/// An identity geotransform means the source carried no georeferencing, in which
/// case neither transform nor projection is written.
#[cfg(feature = "gdal")]
pub fn embed_change_metadata(
    ds: &mut Dataset,
    source: &RasterMetadata,
    fields: &HashMap<String, String>,
) -> Result<(), GdalError> {
    if !source.has_identity_transform() {
        ds.set_geo_transform(&source.geotransform)?;
        if !source.projection.is_empty() {
            ds.set_projection(&source.projection)?;
        }
    } else {
        debug!("Source raster has no georeferencing; change map left in pixel space");
    }

    for (key, value) in fields {
        ds.set_metadata_item(key, value, "")?;
    }
    Ok(())
}
