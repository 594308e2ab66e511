use ndarray::{Array2, Zip};
use num_complex::Complex;

use crate::types::SmoothingDomain;

/// Statistic assigned where the geometric mean vanishes.
pub const DEGENERATE_RATIO: f64 = 1.0;

/// Element-wise amplitude |a|
pub fn amplitude_arrays(a: &Array2<f64>) -> Array2<f64> {
    a.mapv(f64::abs)
}

/// Element-wise modulus of complex samples
pub fn complex_amplitude_arrays(a: &Array2<Complex<f64>>) -> Array2<f64> {
    a.mapv(|z| z.norm())
}

/// Amplitude to the quantity averaged by the spatial filter
pub fn domain_arrays(amplitude: Array2<f64>, domain: SmoothingDomain) -> Array2<f64> {
    match domain {
        SmoothingDomain::Amplitude => amplitude,
        SmoothingDomain::Intensity => amplitude.mapv_into(|v| v * v),
    }
}

/// Amplitudes above this are brought down by a common power of two before smoothing.
pub const RESCALE_ABOVE: f64 = 1e100;

/// Multiply both images by the same power of two when their largest finite value
/// exceeds `RESCALE_ABOVE`, so squaring and window sums stay finite. The scaling is
/// exact and leaves the AM/GM ratio and the sign of the difference unchanged.
/// Returns the number of binary orders removed (0 when untouched).
pub fn rescale_pair(a: &mut Array2<f64>, b: &mut Array2<f64>) -> i32 {
    let peak = a
        .iter()
        .chain(b.iter())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    if peak <= RESCALE_ABOVE {
        return 0;
    }
    let orders = peak.log2().ceil() as i32;
    // Two normal factors; a single 2^-1024 would be subnormal
    let (f1, f2) = (2f64.powi(-(orders / 2)), 2f64.powi(-(orders - orders / 2)));
    a.mapv_inplace(|v| v * f1 * f2);
    b.mapv_inplace(|v| v * f1 * f2);
    orders
}

/// AM/GM of two non-negative values as `(sqrt(hi/lo) + sqrt(lo/hi)) / 2`, which
/// never forms `a * b` or `a + b`. `None` when the geometric mean is zero.
/// Ratios past the f64 range saturate at `f64::MAX`.
#[inline]
fn mean_ratio(a: f64, b: f64) -> Option<f64> {
    if a == b {
        // AM == GM; skip the sqrt so equal inputs give exactly 1
        return (a > 0.0).then_some(1.0);
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    if lo <= 0.0 {
        return None;
    }
    let r = (hi / lo).sqrt();
    Some((0.5 * (r + 1.0 / r)).clamp(1.0, f64::MAX))
}

/// Arithmetic-to-geometric mean ratio: ((a + b) / 2) / sqrt(a * b) with zero handling.
/// Returns the ratio map and the number of pixels that received `DEGENERATE_RATIO`.
pub fn mean_ratio_arrays(a: &Array2<f64>, b: &Array2<f64>) -> (Array2<f64>, usize) {
    let mut result = Array2::zeros(a.dim());
    Zip::from(a).and(b).and(&mut result).par_for_each(|&a_val, &b_val, res| {
        *res = mean_ratio(a_val, b_val).unwrap_or(DEGENERATE_RATIO);
    });

    let degenerate = Zip::from(a).and(b).fold(0usize, |acc, &a_val, &b_val| {
        if mean_ratio(a_val, b_val).is_some() { acc } else { acc + 1 }
    });
    (result, degenerate)
}

/// Signed change b - a; only its sign is consumed downstream
pub fn difference_arrays(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    b - a
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn ratio_of_equal_values_is_one() {
        let a = array![[0.3, 7.0], [1e-3, 42.0]];
        let (ratio, degenerate) = mean_ratio_arrays(&a, &a);
        assert!(ratio.iter().all(|&v| v == 1.0));
        assert_eq!(degenerate, 0);
    }

    #[test]
    fn ratio_is_symmetric_and_at_least_one() {
        let a = array![[1.0, 10.0]];
        let b = array![[10.0, 1.0]];
        let (ab, _) = mean_ratio_arrays(&a, &b);
        let (ba, _) = mean_ratio_arrays(&b, &a);
        assert_eq!(ab, ba);
        let expected = 5.5 / 10.0_f64.sqrt();
        assert!((ab[[0, 0]] - expected).abs() < 1e-12);
        assert!(ab.iter().all(|&v| v >= 1.0));
    }

    #[test]
    fn zero_geometric_mean_uses_sentinel() {
        let a = array![[0.0, 0.0, 2.0]];
        let b = array![[0.0, 3.0, 2.0]];
        let (ratio, degenerate) = mean_ratio_arrays(&a, &b);
        assert_eq!(ratio, array![[DEGENERATE_RATIO, DEGENERATE_RATIO, 1.0]]);
        assert_eq!(degenerate, 2);
        assert!(ratio.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn extreme_ratios_stay_finite() {
        let a = array![[1e-300, f64::MAX, 1.0]];
        let b = array![[1e300, 1e308, 1e-320]];
        let (ratio, degenerate) = mean_ratio_arrays(&a, &b);
        assert_eq!(degenerate, 0);
        assert!(ratio.iter().all(|v| v.is_finite() && *v >= 1.0));
        assert_eq!(ratio[[0, 0]], f64::MAX);
        assert!(ratio[[0, 1]] > 1.0);
    }

    #[test]
    fn rescale_only_touches_huge_pairs() {
        let mut a = array![[1.0, 2.0]];
        let mut b = array![[3.0, 4.0]];
        assert_eq!(rescale_pair(&mut a, &mut b), 0);
        assert_eq!(a, array![[1.0, 2.0]]);

        let mut a = array![[1e308, 1e160]];
        let mut b = array![[1.7e308, f64::NAN]];
        assert_eq!(rescale_pair(&mut a, &mut b), 1024);
        assert!(a.iter().chain(b.iter()).filter(|v| !v.is_nan()).all(|&v| v <= 1.0));
        assert!(b[[0, 0]] > a[[0, 0]]);
        assert_eq!(a[[0, 0]] / b[[0, 0]], 1e308 / 1.7e308);
    }

    #[test]
    fn complex_amplitude_is_modulus() {
        let z = array![[Complex::new(3.0, 4.0), Complex::new(0.0, -2.0)]];
        assert_eq!(complex_amplitude_arrays(&z), array![[5.0, 2.0]]);
    }

    #[test]
    fn intensity_squares_amplitude() {
        let a = array![[-2.0, 3.0]];
        let amp = amplitude_arrays(&a);
        assert_eq!(domain_arrays(amp.clone(), SmoothingDomain::Amplitude), array![[2.0, 3.0]]);
        assert_eq!(domain_arrays(amp, SmoothingDomain::Intensity), array![[4.0, 9.0]]);
    }
}
