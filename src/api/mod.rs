//! High-level library API: detect changes between two co-registered acquisitions held
//! in memory, or run a raster pair end to end (read, detect, write GeoTIFF + sidecar).
//! Prefer these entrypoints over the low-level processing modules when integrating.
#[cfg(feature = "gdal")]
use std::path::Path;

use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::classify::ClassifiedChanges;
use crate::core::params::DetectionParams;
use crate::core::processing::ops::complex_amplitude_arrays;
use crate::core::processing::pipeline::change_detection_pipeline;
use crate::core::processing::ratio::RatioStatistic;
use crate::error::Result;
use crate::types::{ChangeClass, FilterSize};

/// Per-call counts and the parameters that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub rows: usize,
    pub cols: usize,
    pub appearance: usize,
    pub disappearance: usize,
    pub unchanged: usize,
    /// Pixels excluded because either input was non-finite
    pub masked: usize,
    /// Pixels where the smoothed geometric mean was zero
    pub degenerate: usize,
    /// Anomalous pixels, including ties kept as no-change
    pub anomalies: usize,
    /// Detector score cut (absent when no pixel was valid)
    pub threshold: Option<f64>,
    pub detector: String,
    pub params: DetectionParams,
}

impl ChangeSummary {
    fn from_results(
        stat: &RatioStatistic,
        classified: &ClassifiedChanges,
        params: &DetectionParams,
    ) -> Self {
        let (rows, cols) = classified.labels.dim();
        let count = |class: ChangeClass| {
            classified
                .labels
                .iter()
                .filter(|&&l| l == class.as_i8())
                .count()
        };
        Self {
            rows,
            cols,
            appearance: count(ChangeClass::Appearance),
            disappearance: count(ChangeClass::Disappearance),
            unchanged: count(ChangeClass::NoChange),
            masked: rows * cols - stat.valid_count(),
            degenerate: stat.degenerate,
            anomalies: classified.anomalies,
            threshold: classified.threshold.is_finite().then_some(classified.threshold),
            detector: classified.detector.to_string(),
            params: params.clone(),
        }
    }

    /// Share of pixels labeled as appearance or disappearance
    pub fn changed_fraction(&self) -> f64 {
        let total = self.rows * self.cols;
        if total == 0 {
            return 0.0;
        }
        (self.appearance + self.disappearance) as f64 / total as f64
    }
}

/// Change labels (-1 disappearance, 0 no change, +1 appearance) plus their summary
#[derive(Debug, Clone)]
pub struct ChangeMap {
    pub labels: Array2<i8>,
    pub summary: ChangeSummary,
}

/// Detect changes between two amplitude images of identical shape.
///
/// Returns an `i8` map of the same shape with values in {-1, 0, 1}. Uses the
/// default detector settings (Isolation Forest, seed 0, edge-replicated smoothing).
pub fn detect_change(
    first: &Array2<f64>,
    second: &Array2<f64>,
    filter_size: impl Into<FilterSize>,
    contamination: f64,
) -> Result<Array2<i8>> {
    let params = DetectionParams {
        filter_size: filter_size.into(),
        contamination,
        ..Default::default()
    };
    detect_change_with_params(first, second, &params).map(|map| map.labels)
}

/// Detect changes with the full parameter set, returning labels and summary.
pub fn detect_change_with_params(
    first: &Array2<f64>,
    second: &Array2<f64>,
    params: &DetectionParams,
) -> Result<ChangeMap> {
    let (stat, classified) = change_detection_pipeline(first, second, params)?;
    let summary = ChangeSummary::from_results(&stat, &classified, params);
    info!(
        "Labels: {} appearance, {} disappearance, {} unchanged ({} masked)",
        summary.appearance, summary.disappearance, summary.unchanged, summary.masked
    );
    Ok(ChangeMap {
        labels: classified.labels,
        summary,
    })
}

/// Detect changes between two complex (SLC) acquisitions; amplitude is the modulus.
pub fn detect_change_complex(
    first: &Array2<Complex<f64>>,
    second: &Array2<Complex<f64>>,
    params: &DetectionParams,
) -> Result<ChangeMap> {
    let amp_first = complex_amplitude_arrays(first);
    let amp_second = complex_amplitude_arrays(second);
    detect_change_with_params(&amp_first, &amp_second, params)
}

/// Read band `band` (1-based) of two rasters, detect changes and write an Int16
/// GeoTIFF change map carrying the first raster's georeferencing. With `sidecar`,
/// a pretty-printed JSON summary is written next to the output as `<output>.json`.
#[cfg(feature = "gdal")]
pub fn process_pair_to_path(
    first: &Path,
    second: &Path,
    output: &Path,
    params: &DetectionParams,
    band: usize,
    sidecar: bool,
) -> Result<ChangeSummary> {
    use crate::error::Error;
    use crate::io::GdalRasterReader;
    use crate::io::writers::metadata::{change_metadata_fields, embed_change_metadata};
    use crate::io::writers::sidecar::create_change_sidecar;
    use crate::io::writers::tiff::write_change_map_tiff;

    if band == 0 {
        return Err(Error::invalid("band", band, "band indices start at 1"));
    }
    params.validate()?;

    info!("Reading first acquisition {:?} (band {})", first, band);
    let first_reader = GdalRasterReader::open(first)?;
    let first_data = first_reader.read_amplitude(band)?;
    info!("Reading second acquisition {:?} (band {})", second, band);
    let second_reader = GdalRasterReader::open(second)?;
    let second_data = second_reader.read_amplitude(band)?;

    let map = detect_change_with_params(&first_data, &second_data, params)?;

    let mut ds = write_change_map_tiff(output, &map.labels)?;
    let fields = change_metadata_fields(&map.summary, first, second);
    embed_change_metadata(&mut ds, &first_reader.metadata, &fields)?;
    info!("Wrote change map {:?}", output);

    if sidecar {
        create_change_sidecar(
            output,
            &map.summary,
            first,
            second,
            Some(first_reader.metadata.geotransform)
                .filter(|_| !first_reader.metadata.has_identity_transform()),
            Some(first_reader.metadata.projection.as_str()).filter(|p| !p.is_empty()),
        )?;
    }

    Ok(map.summary)
}
