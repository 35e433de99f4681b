//! Multivariate window tensors.
//!
//! A series is a `T × D` matrix (samples × channels). [`build_tensor`] windows
//! every channel independently and stacks the per-channel `N × W` matrices
//! along a new trailing axis, giving an `N × W × D` tensor whose window `i`
//! covers the same source range `[i * step, i * step + width)` in every channel.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use ts_segment::tensor::build_tensor;
//!
//! let series = array![[0.0, 10.0], [1.0, 11.0], [2.0, 12.0], [3.0, 13.0]];
//! let tensor = build_tensor(series.view(), 2, 2).unwrap();
//!
//! assert_eq!(tensor.dim(), (2, 2, 2));
//! assert_eq!(tensor[[1, 0, 1]], 12.0);
//! ```

use crate::error::{Result, SegmentError};
use crate::window::{extract_windows_view, validate_window, window_count};
use ndarray::{Array2, Array3, ArrayView2, Axis};

/// A multivariate series: `T` samples × `D` channels.
pub type Series<T = f64> = Array2<T>;

/// Windowed form of one series: `N` windows × `W` samples × `D` channels.
pub type SegmentedSeries<T = f64> = Array3<T>;

/// Build the `N × W × D` window tensor of one series.
pub fn build_tensor<T: Clone>(
    series: ArrayView2<'_, T>,
    width: usize,
    step: usize,
) -> Result<SegmentedSeries<T>> {
    validate_window(width, step)?;

    let (n_samples, n_channels) = series.dim();
    let n_windows = window_count(n_samples, width, step);

    if n_channels == 0 {
        return Array3::from_shape_vec((n_windows, width, 0), Vec::new())
            .map_err(|e| SegmentError::invalid_input(format!("tensor shape error: {e}")));
    }

    let per_channel = series
        .axis_iter(Axis(1))
        .map(|column| extract_windows_view(column, width, step))
        .collect::<Result<Vec<Array2<T>>>>()?;

    let views: Vec<_> = per_channel.iter().map(|m| m.view()).collect();
    ndarray::stack(Axis(2), &views)
        .map_err(|e| SegmentError::invalid_input(format!("channel windows disagree: {e}")))
}

/// Assemble a series from row-major samples (`rows[t][d]`).
///
/// Every row must have the same number of channels.
pub fn series_from_rows<T: Clone>(rows: &[Vec<T>]) -> Result<Series<T>> {
    let n_channels = rows.first().map_or(0, Vec::len);

    if let Some((t, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_channels) {
        return Err(SegmentError::invalid_input(format!(
            "series is not rectangular: sample {t} has {} channels, expected {n_channels}",
            row.len()
        )));
    }

    let flat: Vec<T> = rows.iter().flat_map(|row| row.iter().cloned()).collect();
    Array2::from_shape_vec((rows.len(), n_channels), flat)
        .map_err(|e| SegmentError::invalid_input(format!("series shape error: {e}")))
}

/// Assemble a series from per-channel columns (`channels[d][t]`).
///
/// Every channel must have the same length.
pub fn series_from_channels<T: Clone>(channels: &[Vec<T>]) -> Result<Series<T>> {
    let n_samples = channels.first().map_or(0, Vec::len);

    if let Some((d, channel)) = channels
        .iter()
        .enumerate()
        .find(|(_, c)| c.len() != n_samples)
    {
        return Err(SegmentError::invalid_input(format!(
            "channel lengths disagree: channel {d} has {} samples, expected {n_samples}",
            channel.len()
        )));
    }

    Ok(Array2::from_shape_fn((n_samples, channels.len()), |(t, d)| {
        channels[d][t].clone()
    }))
}
