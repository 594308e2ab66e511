//! Ratio statistic: spatially smoothed arithmetic-to-geometric mean ratio of the two
//! acquisitions plus the signed direction of change.
use ndarray::{Array2, Zip};
use tracing::{debug, info};

use crate::core::processing::filter::uniform_filter;
use crate::core::processing::ops::{
    amplitude_arrays, difference_arrays, domain_arrays, mean_ratio_arrays, rescale_pair,
};
use crate::error::{Error, Result};
use crate::types::{BoundaryMode, FilterSize, NanPolicy, SmoothingDomain};

/// Knobs of the statistic computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioParams {
    pub filter_size: FilterSize,
    pub domain: SmoothingDomain,
    pub boundary: BoundaryMode,
    pub nan_policy: NanPolicy,
}

impl Default for RatioParams {
    fn default() -> Self {
        Self {
            filter_size: FilterSize::default(),
            domain: SmoothingDomain::Amplitude,
            boundary: BoundaryMode::Nearest,
            nan_policy: NanPolicy::Reject,
        }
    }
}

/// Per-pixel statistic maps aligned with the input images
#[derive(Debug, Clone)]
pub struct RatioStatistic {
    /// AM / GM of the smoothed values; 1.0 means no change
    pub statistic: Array2<f64>,
    /// Smoothed second minus smoothed first
    pub direction: Array2<f64>,
    /// True where both inputs were finite
    pub valid: Array2<bool>,
    /// Pixels whose geometric mean vanished and received the sentinel
    pub degenerate: usize,
}

impl RatioStatistic {
    pub fn dim(&self) -> (usize, usize) {
        self.statistic.dim()
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }
}

/// Shape preconditions shared by every entry point.
pub fn validate_pair_shapes(first: (usize, usize), second: (usize, usize)) -> Result<()> {
    if first != second {
        return Err(Error::ShapeMismatch { first, second });
    }
    if first.0 == 0 || first.1 == 0 {
        return Err(Error::EmptyImage {
            rows: first.0,
            cols: first.1,
        });
    }
    Ok(())
}

fn first_non_finite(image: &Array2<f64>) -> Option<(usize, usize)> {
    image
        .indexed_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(idx, _)| idx)
}

/// Compute the ratio statistic from two real-valued acquisitions.
///
/// Inputs are converted to amplitude with `|x|`. Non-finite pixels are either
/// rejected or zeroed and flagged invalid, depending on `params.nan_policy`.
pub fn compute_ratio_statistic(
    first: &Array2<f64>,
    second: &Array2<f64>,
    params: &RatioParams,
) -> Result<RatioStatistic> {
    validate_pair_shapes(first.dim(), second.dim())?;
    params.filter_size.validate_for(first.dim())?;

    let mut valid = Array2::from_elem(first.dim(), true);
    let (amp_first, amp_second) = match params.nan_policy {
        NanPolicy::Reject => {
            if let Some((row, col)) = first_non_finite(first) {
                return Err(Error::NonFiniteInput {
                    image: "first",
                    row,
                    col,
                });
            }
            if let Some((row, col)) = first_non_finite(second) {
                return Err(Error::NonFiniteInput {
                    image: "second",
                    row,
                    col,
                });
            }
            (amplitude_arrays(first), amplitude_arrays(second))
        }
        NanPolicy::Mask => {
            Zip::from(&mut valid)
                .and(first)
                .and(second)
                .for_each(|v, a, b| *v = a.is_finite() && b.is_finite());
            let zero_masked = |image: &Array2<f64>| {
                let mut amp = amplitude_arrays(image);
                Zip::from(&mut amp).and(&valid).for_each(|a, &ok| {
                    if !ok {
                        *a = 0.0;
                    }
                });
                amp
            };
            (zero_masked(first), zero_masked(second))
        }
    };

    Ok(ratio_from_amplitudes(amp_first, amp_second, valid, params))
}

/// Smoothing, AM/GM kernel and direction over validated amplitudes.
fn ratio_from_amplitudes(
    mut amp_first: Array2<f64>,
    mut amp_second: Array2<f64>,
    valid: Array2<bool>,
    params: &RatioParams,
) -> RatioStatistic {
    let (rows, cols) = amp_first.dim();
    info!(
        "Computing ratio statistic: {}x{}, window={}, domain={}, boundary={}",
        rows, cols, params.filter_size, params.domain, params.boundary
    );

    let orders = rescale_pair(&mut amp_first, &mut amp_second);
    if orders > 0 {
        debug!("Amplitudes scaled down by 2^{} to keep window sums finite", orders);
    }

    let smoothed_first = uniform_filter(
        &domain_arrays(amp_first, params.domain),
        params.filter_size,
        params.boundary,
    );
    let smoothed_second = uniform_filter(
        &domain_arrays(amp_second, params.domain),
        params.filter_size,
        params.boundary,
    );

    let (mut statistic, degenerate) = mean_ratio_arrays(&smoothed_first, &smoothed_second);
    let mut direction = difference_arrays(&smoothed_first, &smoothed_second);

    // Masked pixels carry no evidence of change
    Zip::from(&mut statistic)
        .and(&mut direction)
        .and(&valid)
        .for_each(|s, d, &ok| {
            if !ok {
                *s = 1.0;
                *d = 0.0;
            }
        });

    if degenerate > 0 {
        debug!(
            "Geometric mean vanished at {} pixels; sentinel ratio applied",
            degenerate
        );
    }
    debug_assert!(statistic.iter().all(|v| v.is_finite()));

    RatioStatistic {
        statistic,
        direction,
        valid,
        degenerate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn identical_images_give_unit_statistic() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let stat = compute_ratio_statistic(&a, &a, &RatioParams::default()).unwrap();
        assert!(stat.statistic.iter().all(|&v| v == 1.0));
        assert!(stat.direction.iter().all(|&v| v == 0.0));
        assert_eq!(stat.valid_count(), 9);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let a = Array2::<f64>::ones((10, 10));
        let b = Array2::<f64>::ones((10, 12));
        let err = compute_ratio_statistic(&a, &b, &RatioParams::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                first: (10, 10),
                second: (10, 12)
            }
        ));
    }

    #[test]
    fn empty_image_is_rejected() {
        let a = Array2::<f64>::zeros((0, 4));
        let err = compute_ratio_statistic(&a, &a, &RatioParams::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyImage { rows: 0, cols: 4 }));
    }

    #[test]
    fn oversized_filter_is_rejected() {
        let a = Array2::<f64>::ones((2, 2));
        let params = RatioParams {
            filter_size: FilterSize::new(3, 3),
            ..Default::default()
        };
        let err = compute_ratio_statistic(&a, &a, &params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { param: "filter_size", .. }));
    }

    #[test]
    fn zero_images_use_sentinel() {
        let a = Array2::<f64>::zeros((4, 4));
        let stat = compute_ratio_statistic(&a, &a, &RatioParams::default()).unwrap();
        assert_eq!(stat.degenerate, 16);
        assert!(stat.statistic.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn direction_follows_increase() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![[4.0, 4.0], [0.25, 0.25]];
        let params = RatioParams {
            filter_size: FilterSize::new(1, 1),
            ..Default::default()
        };
        let stat = compute_ratio_statistic(&a, &b, &params).unwrap();
        assert!(stat.direction[[0, 0]] > 0.0);
        assert!(stat.direction[[1, 1]] < 0.0);
        assert!(stat.statistic.iter().all(|&v| v > 1.0));
    }

    #[test]
    fn nan_is_rejected_by_default() {
        let a = array![[1.0, f64::NAN], [3.0, 4.0]];
        let b = array![[4.0, 3.0], [2.0, 1.0]];
        let err = compute_ratio_statistic(&a, &b, &RatioParams {
            filter_size: FilterSize::new(2, 2),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::NonFiniteInput {
                image: "first",
                row: 0,
                col: 1
            }
        ));
    }

    #[test]
    fn nan_is_masked_on_request() {
        let a = array![[1.0, f64::NAN], [3.0, 4.0]];
        let b = array![[4.0, 3.0], [f64::INFINITY, 1.0]];
        let params = RatioParams {
            filter_size: FilterSize::new(2, 2),
            nan_policy: NanPolicy::Mask,
            ..Default::default()
        };
        let stat = compute_ratio_statistic(&a, &b, &params).unwrap();
        assert_eq!(stat.valid, array![[true, false], [false, true]]);
        assert_eq!(stat.statistic[[0, 1]], 1.0);
        assert_eq!(stat.direction[[1, 0]], 0.0);
        assert!(stat.statistic.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn huge_amplitudes_keep_a_finite_statistic() {
        let first = Array2::<f64>::ones((20, 20));
        let mut second = first.clone();
        second[[10, 10]] = 1e160;
        for domain in [SmoothingDomain::Amplitude, SmoothingDomain::Intensity] {
            let params = RatioParams {
                domain,
                ..Default::default()
            };
            let stat = compute_ratio_statistic(&first, &second, &params).unwrap();
            assert!(stat.statistic.iter().all(|v| v.is_finite()), "{domain}");
            assert!(stat.statistic[[10, 10]] > 1.0, "{domain}");
            assert!(stat.direction[[10, 10]] > 0.0, "{domain}");
            assert_eq!(stat.statistic[[0, 0]], 1.0);
        }
    }

    #[test]
    fn change_near_f64_max_is_visible() {
        let first = Array2::from_elem((20, 20), 1e308);
        let mut second = first.clone();
        second[[10, 10]] = 1.7e308;
        for domain in [SmoothingDomain::Amplitude, SmoothingDomain::Intensity] {
            let params = RatioParams {
                domain,
                ..Default::default()
            };
            let stat = compute_ratio_statistic(&first, &second, &params).unwrap();
            assert!(stat.statistic.iter().all(|v| v.is_finite()), "{domain}");
            assert!(stat.statistic[[10, 10]] > 1.0, "{domain}");
            assert!(stat.direction[[10, 10]] > 0.0, "{domain}");
        }
    }

    #[test]
    fn negative_samples_are_treated_as_amplitude() {
        let a = array![[-2.0, 2.0]];
        let b = array![[2.0, -2.0]];
        let params = RatioParams {
            filter_size: FilterSize::new(1, 1),
            ..Default::default()
        };
        let stat = compute_ratio_statistic(&a, &b, &params).unwrap();
        assert!(stat.statistic.iter().all(|&v| v == 1.0));
    }
}
