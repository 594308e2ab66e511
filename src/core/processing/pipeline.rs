use ndarray::Array2;
use tracing::info;

use crate::core::anomaly::build_detector;
use crate::core::classify::{ClassifiedChanges, classify_changes};
use crate::core::params::DetectionParams;
use crate::core::processing::ratio::{RatioStatistic, compute_ratio_statistic};
use crate::error::Result;

/// Full single-pass detection: validate, ratio statistic, anomaly labels.
pub fn change_detection_pipeline(
    first: &Array2<f64>,
    second: &Array2<f64>,
    params: &DetectionParams,
) -> Result<(RatioStatistic, ClassifiedChanges)> {
    params.validate()?;
    let contamination = params.contamination()?;

    let stat = compute_ratio_statistic(first, second, &params.ratio_params())?;

    let detector = build_detector(params);
    let classified = classify_changes(&stat, detector.as_ref(), contamination);

    info!(
        "Change detection done: {} anomalies over {} valid pixels (threshold={:.6})",
        classified.anomalies,
        stat.valid_count(),
        classified.threshold
    );
    Ok((stat, classified))
}
