//! Turn the ratio statistic into signed change labels: anomaly detection over the
//! valid pixels, then the sign of the directional map splits appearance from
//! disappearance.
use ndarray::Array2;
use tracing::{debug, info};

use crate::core::anomaly::AnomalyDetector;
use crate::core::processing::ratio::RatioStatistic;
use crate::types::{ChangeClass, Contamination};

/// Labels plus the detector's decision details
#[derive(Debug, Clone)]
pub struct ClassifiedChanges {
    pub labels: Array2<i8>,
    /// Name of the detector that produced the flags
    pub detector: &'static str,
    /// Score threshold used by the detector (NaN when no pixel was valid)
    pub threshold: f64,
    /// Pixels flagged anomalous, including ties labeled no-change
    pub anomalies: usize,
}

pub fn classify_changes(
    stat: &RatioStatistic,
    detector: &dyn AnomalyDetector,
    contamination: Contamination,
) -> ClassifiedChanges {
    // Logical (row-major) order on both sides keeps flags aligned with pixels
    let features: Vec<f64> = stat
        .statistic
        .iter()
        .zip(stat.valid.iter())
        .filter_map(|(&s, &ok)| ok.then_some(s))
        .collect();
    debug_assert!(features.iter().all(|v| !v.is_nan()));

    info!(
        "Fitting {} on {} samples (contamination={})",
        detector.name(),
        features.len(),
        contamination
    );
    let result = detector.fit_predict(&features, contamination);

    let mut labels = Array2::<i8>::zeros(stat.dim());
    let mut flags = result.flags.iter();
    let mut ties = 0usize;
    for ((label, &direction), &ok) in labels
        .iter_mut()
        .zip(stat.direction.iter())
        .zip(stat.valid.iter())
    {
        if !ok || !flags.next().copied().unwrap_or(false) {
            continue;
        }
        let class = ChangeClass::from_direction(direction);
        if class == ChangeClass::NoChange {
            ties += 1;
        }
        *label = class.as_i8();
    }

    if ties > 0 {
        debug!("{} anomalous pixels had zero direction and stay unchanged", ties);
    }

    ClassifiedChanges {
        labels,
        detector: detector.name(),
        threshold: result.threshold,
        anomalies: result.anomaly_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anomaly::{AnomalyFlags, IsolationForest};
    use ndarray::array;

    /// Flags every sample above 1.0, regardless of contamination.
    struct AboveOne;

    impl AnomalyDetector for AboveOne {
        fn name(&self) -> &'static str {
            "above-one"
        }

        fn score_samples(&self, features: &[f64]) -> Vec<f64> {
            features.to_vec()
        }

        fn fit_predict(&self, features: &[f64], _: Contamination) -> AnomalyFlags {
            AnomalyFlags {
                flags: features.iter().map(|&f| f > 1.0).collect(),
                threshold: 1.0,
            }
        }
    }

    #[test]
    fn sign_of_direction_picks_class() {
        let stat = RatioStatistic {
            statistic: array![[1.0, 2.0], [3.0, 1.5]],
            direction: array![[5.0, 1.0], [-2.0, 0.0]],
            valid: Array2::from_elem((2, 2), true),
            degenerate: 0,
        };
        let out = classify_changes(&stat, &AboveOne, Contamination::default());
        assert_eq!(out.labels, array![[0i8, 1], [-1, 0]]);
        assert_eq!(out.anomalies, 3);
        assert_eq!(out.detector, "above-one");
    }

    #[test]
    fn invalid_pixels_are_skipped_and_unchanged() {
        let stat = RatioStatistic {
            statistic: array![[1.0, 1.0], [3.0, 2.0]],
            direction: array![[0.0, 0.0], [-1.0, 1.0]],
            valid: array![[true, false], [false, true]],
            degenerate: 0,
        };
        let out = classify_changes(&stat, &AboveOne, Contamination::default());
        // Only (0,0) and (1,1) reach the detector, in row-major order
        assert_eq!(out.labels, array![[0i8, 0], [0, 1]]);
        assert_eq!(out.anomalies, 1);
    }

    #[test]
    fn all_invalid_yields_all_zero() {
        let stat = RatioStatistic {
            statistic: Array2::from_elem((3, 3), 1.0),
            direction: Array2::zeros((3, 3)),
            valid: Array2::from_elem((3, 3), false),
            degenerate: 0,
        };
        let out = classify_changes(&stat, &IsolationForest::new(), Contamination::default());
        assert!(out.labels.iter().all(|&l| l == 0));
        assert!(out.threshold.is_nan());
    }
}
