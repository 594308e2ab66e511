use ndarray::{Array2, ArrayView1, ArrayViewMut1, Zip};

use crate::types::{BoundaryMode, FilterSize};

/// Map a possibly out-of-range index onto `0..len` according to `mode`.
#[inline]
fn fold_index(idx: isize, len: usize, mode: BoundaryMode) -> usize {
    let n = len as isize;
    match mode {
        BoundaryMode::Nearest => idx.clamp(0, n - 1) as usize,
        BoundaryMode::Reflect => {
            // Half-sample symmetric extension has period 2n
            let period = 2 * n;
            let mut i = idx.rem_euclid(period);
            if i >= n {
                i = period - 1 - i;
            }
            i as usize
        }
    }
}

/// 1-D box mean of `src` into `dst` with a window of `size` samples.
/// The window covers offsets `-(size / 2) ..= size - 1 - size / 2`.
fn smooth_line(src: ArrayView1<f64>, mut dst: ArrayViewMut1<f64>, size: usize, mode: BoundaryMode) {
    let len = src.len();
    let lo = (size / 2) as isize;
    let hi = (size - 1) as isize - lo;
    let denom = size as f64;

    for (j, out) in dst.iter_mut().enumerate() {
        let center = j as isize;
        let mut sum = 0.0_f64;
        for offset in -lo..=hi {
            sum += src[fold_index(center + offset, len, mode)];
        }
        *out = if sum.is_infinite() {
            // Window sum overflowed; average term by term instead
            (-lo..=hi)
                .map(|offset| src[fold_index(center + offset, len, mode)] / denom)
                .sum()
        } else {
            sum / denom
        };
    }
}

/// Separable uniform (box) filter producing a same-shape local mean.
///
/// Rows are smoothed first, then columns. Each output sample is the plain sum of
/// its window in a fixed order divided by the window length, so every pixel of a
/// uniform region receives the same value.
pub fn uniform_filter(input: &Array2<f64>, size: FilterSize, mode: BoundaryMode) -> Array2<f64> {
    if size.rows == 1 && size.cols == 1 {
        return input.clone();
    }

    let mut by_rows = Array2::<f64>::zeros(input.dim());
    if size.cols > 1 {
        Zip::from(by_rows.rows_mut())
            .and(input.rows())
            .par_for_each(|dst, src| smooth_line(src, dst, size.cols, mode));
    } else {
        by_rows.assign(input);
    }

    if size.rows == 1 {
        return by_rows;
    }

    let mut out = Array2::<f64>::zeros(input.dim());
    Zip::from(out.columns_mut())
        .and(by_rows.columns())
        .par_for_each(|dst, src| smooth_line(src, dst, size.rows, mode));
    out
}
