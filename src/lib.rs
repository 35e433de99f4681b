//! Time-Series Segmentation
//!
//! Sliding-window segmentation of multivariate time series into fixed-shape
//! tensors for deep learning models.
//!
//! # Overview
//!
//! Given a batch of variable-length series (each `T × D`, samples × channels),
//! a window width `W` and an overlap fraction `r`, every series is cut into
//! `N = floor((T - W) / S) + 1` windows of shape `W × D`, where the step is
//! `S = max(1, round(W × (1 - r)))`. Each series becomes an `N × W × D` tensor.
//! Per-series auxiliary fields (labels, identifiers) are carried through
//! unchanged, one value per series.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Time-Series Segmentation                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  window/    - Single-channel sliding-window extraction          │
//! │  tensor/    - Per-channel windows stacked into N × W × D        │
//! │  batch/     - Plain / annotated batches and segmented output    │
//! │  segmenter/ - Configured segmenter and fit/transform wrapper    │
//! │  config/    - Width, overlap and batch policies (TOML / JSON)   │
//! │  export/    - NumPy export for Python/PyTorch                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use serde_json::json;
//! use ts_segment::{AnnotatedBatch, Batch, Segmenter};
//!
//! let segmenter = Segmenter::new(4, 0.5).unwrap(); // step = 2
//!
//! let walk = Array2::from_shape_fn((8, 3), |(t, d)| (t * 3 + d) as f64);
//! let run = Array2::from_shape_fn((5, 3), |(t, d)| (t * 3 + d) as f64);
//! let batch = AnnotatedBatch::new(vec![walk, run])
//!     .with_field("label", vec![json!("walk"), json!("run")])
//!     .unwrap();
//!
//! let out = segmenter.transform(&Batch::from(batch)).unwrap();
//! assert_eq!(out.window_counts(), vec![3, 1]);
//! assert_eq!(out.segments()[0].dim(), (3, 4, 3));
//! assert_eq!(out.field("label").unwrap().values[1], json!("run"));
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod prelude;
pub mod segmenter;
pub mod tensor;
pub mod window;

// Re-exports - Errors
pub use error::{Result, SegmentError};

// Re-exports - Config
pub use config::{derive_step, ParallelConfig, SegmentConfig, ShortSeriesPolicy};

// Re-exports - Windowing
pub use tensor::{build_tensor, series_from_channels, series_from_rows, SegmentedSeries, Series};
pub use window::{extract_windows, extract_windows_view, window_count, window_starts};

// Re-exports - Batches
pub use batch::{
    AnnotatedBatch, AuxiliaryField, Batch, FieldValue, SegmentRecord, SegmentedBatch,
    SeriesRecord, TS_FIELD,
};
pub use segmenter::{segment_batch, Segment, Segmenter};

// Re-exports - Export
pub use export::{export_to_numpy, ExportError, ExportMetadata, NumpyExporter};
