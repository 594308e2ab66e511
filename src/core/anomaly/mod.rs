//! Unsupervised anomaly detectors over a one-dimensional feature (the per-pixel
//! ratio statistic). Every detector scores samples so that larger means more
//! anomalous, and thresholds the scores at the `1 - contamination` percentile.
pub mod isolation_forest;
pub mod robust_zscore;

pub use isolation_forest::IsolationForest;
pub use robust_zscore::RobustZScore;

use tracing::debug;

use crate::core::params::DetectionParams;
use crate::types::{Contamination, DetectorKind};

/// Outcome of `fit_predict`
#[derive(Debug, Clone)]
pub struct AnomalyFlags {
    /// One flag per input sample, true when anomalous
    pub flags: Vec<bool>,
    /// Score cut: samples scoring strictly above it are anomalous
    pub threshold: f64,
}

impl AnomalyFlags {
    pub fn anomaly_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Pluggable anomaly model: contamination-controlled and reproducible.
pub trait AnomalyDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fit on `features` and return one score per sample (higher = more anomalous).
    fn score_samples(&self, features: &[f64]) -> Vec<f64>;

    /// Fit on `features` and flag the expected `contamination` share as anomalous.
    fn fit_predict(&self, features: &[f64], contamination: Contamination) -> AnomalyFlags {
        let scores = self.score_samples(features);
        threshold_scores(&scores, contamination)
    }
}

/// Flag scores strictly above the `1 - contamination` percentile.
pub fn threshold_scores(scores: &[f64], contamination: Contamination) -> AnomalyFlags {
    if scores.is_empty() {
        return AnomalyFlags {
            flags: Vec::new(),
            threshold: f64::NAN,
        };
    }
    let threshold = percentile(scores, 100.0 * (1.0 - contamination.value()));
    let flags: Vec<bool> = scores.iter().map(|&s| s > threshold).collect();
    debug!(
        "Anomaly threshold {:.6} flags {} of {} samples",
        threshold,
        flags.iter().filter(|&&f| f).count(),
        scores.len()
    );
    AnomalyFlags { flags, threshold }
}

/// Percentile with linear interpolation between closest ranks (`q` in [0, 100]).
pub fn percentile(values: &[f64], q: f64) -> f64 {
    debug_assert!(!values.is_empty());
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

/// Instantiate the detector selected in `params`.
pub fn build_detector(params: &DetectionParams) -> Box<dyn AnomalyDetector> {
    match params.detector {
        DetectorKind::IsolationForest => Box::new(
            IsolationForest::new()
                .with_n_estimators(params.n_estimators)
                .with_max_samples(params.max_samples)
                .with_seed(params.seed),
        ),
        DetectorKind::RobustZ => Box::new(RobustZScore::new()),
    }
}
