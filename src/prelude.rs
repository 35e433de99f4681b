//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```
//! use ts_segment::prelude::*;
//!
//! let mut segment = Segment::new();
//! assert_eq!(segment.configure(10, 0.5).unwrap(), 5);
//! assert!(segment.is_ready());
//! ```

pub use crate::batch::{
    AnnotatedBatch, AuxiliaryField, Batch, FieldValue, SegmentedBatch, SeriesRecord,
};
pub use crate::config::{ParallelConfig, SegmentConfig, ShortSeriesPolicy};
pub use crate::error::{Result, SegmentError};
pub use crate::export::NumpyExporter;
pub use crate::segmenter::{segment_batch, Segment, Segmenter};
pub use crate::tensor::{SegmentedSeries, Series};
