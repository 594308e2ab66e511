//! Modified z-score detector based on the median absolute deviation (MAD).
//!
//! `M_i = 0.6745 * |x_i - median| / MAD`. When the MAD is zero (more than half the
//! population is identical) the unscaled absolute deviation is used instead, which
//! preserves the ranking the threshold depends on.
use super::{AnomalyDetector, percentile};

/// Consistency factor relating the MAD to a normal standard deviation
const MAD_SCALE: f64 = 0.6745;

#[derive(Debug, Clone, Copy, Default)]
pub struct RobustZScore;

impl RobustZScore {
    pub fn new() -> Self {
        Self
    }
}

impl AnomalyDetector for RobustZScore {
    fn name(&self) -> &'static str {
        "robust-z"
    }

    fn score_samples(&self, features: &[f64]) -> Vec<f64> {
        if features.is_empty() {
            return Vec::new();
        }
        let median = percentile(features, 50.0);
        let deviations: Vec<f64> = features.iter().map(|&x| (x - median).abs()).collect();
        let mad = percentile(&deviations, 50.0);

        if mad > 0.0 {
            deviations.iter().map(|&d| MAD_SCALE * d / mad).collect()
        } else {
            deviations
        }
    }
}
