//! Single-channel sliding-window extraction.
//!
//! Window `i` of a sequence covers positions `[i * step, i * step + width)`.
//! A sequence of length `T` yields `floor((T - width) / step) + 1` windows when
//! `T >= width` and none otherwise. Consecutive windows share `width - step`
//! samples when `step < width`.
//!
//! # Example
//!
//! ```
//! use ts_segment::window::extract_windows;
//!
//! let seq = [0, 1, 2, 3, 4, 5, 6, 7];
//! let windows = extract_windows(&seq, 4, 2).unwrap();
//!
//! assert_eq!(windows, vec![vec![0, 1, 2, 3], vec![2, 3, 4, 5], vec![4, 5, 6, 7]]);
//! ```

use crate::error::{Result, SegmentError};
use ndarray::{Array2, ArrayView1};

/// Check that `width` and `step` can drive a sliding window.
pub fn validate_window(width: usize, step: usize) -> Result<()> {
    if width == 0 {
        return Err(SegmentError::invalid_parameter("width", "must be >= 1"));
    }
    if step == 0 {
        return Err(SegmentError::invalid_parameter("step", "must be >= 1"));
    }
    Ok(())
}

/// Number of complete windows that fit in a sequence of `len` samples.
///
/// `step` must be non-zero; use [`validate_window`] first when the values
/// come from outside.
#[inline]
pub fn window_count(len: usize, width: usize, step: usize) -> usize {
    if len < width {
        0
    } else {
        (len - width) / step + 1
    }
}

/// Start positions of every window, in increasing order.
pub fn window_starts(len: usize, width: usize, step: usize) -> impl Iterator<Item = usize> {
    (0..window_count(len, width, step)).map(move |i| i * step)
}

/// Extract all windows of a slice.
///
/// Each window is an owned copy of `sequence[start..start + width]`.
pub fn extract_windows<T: Clone>(sequence: &[T], width: usize, step: usize) -> Result<Vec<Vec<T>>> {
    validate_window(width, step)?;

    let windows = window_starts(sequence.len(), width, step)
        .map(|start| sequence[start..start + width].to_vec())
        .collect();

    Ok(windows)
}

/// Extract all windows of a (possibly strided) 1-D view into an `N × W` matrix.
///
/// Row `i` holds window `i`. Works on non-contiguous views such as a column of
/// a row-major series.
pub fn extract_windows_view<T: Clone>(
    sequence: ArrayView1<'_, T>,
    width: usize,
    step: usize,
) -> Result<Array2<T>> {
    validate_window(width, step)?;

    let n_windows = window_count(sequence.len(), width, step);
    let mut data = Vec::with_capacity(n_windows * width);

    for start in window_starts(sequence.len(), width, step) {
        for offset in 0..width {
            data.push(sequence[start + offset].clone());
        }
    }

    Array2::from_shape_vec((n_windows, width), data)
        .map_err(|e| SegmentError::invalid_input(format!("window matrix shape error: {e}")))
}
