//! Error types for segmentation.
//!
//! Every failure is deterministic and tied to configuration or input shape,
//! so errors are returned synchronously and never retried. Errors raised while
//! processing one series of a batch are wrapped in [`SegmentError::Series`]
//! carrying the position of the offending series.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Error type for segmentation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    /// A configuration or extraction parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name (`width`, `overlap`, `step`, ...)
        name: &'static str,
        /// Human readable explanation
        reason: String,
    },

    /// `transform()` was called before a successful `configure()`.
    #[error("segmenter is not configured: call configure() before transform()")]
    NotConfigured,

    /// Malformed series or batch (ragged rows, channel mismatch, bad fields).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Series is shorter than the window width under the `Reject` policy.
    #[error("series of length {length} is shorter than window width {width}")]
    ShortSeries {
        /// Number of samples in the series
        length: usize,
        /// Configured window width
        width: usize,
    },

    /// Error raised while processing a particular series of a batch.
    #[error("series {index}: {source}")]
    Series {
        /// Position of the series within the batch
        index: usize,
        /// Underlying error
        #[source]
        source: Box<SegmentError>,
    },

    /// The local worker pool could not be created.
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

impl SegmentError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Tag this error with the position of the series that produced it.
    pub fn at_series(self, index: usize) -> Self {
        Self::Series {
            index,
            source: Box::new(self),
        }
    }

    /// Position of the offending series, if the error was tagged with one.
    pub fn series_index(&self) -> Option<usize> {
        match self {
            Self::Series { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The innermost error, with any series tagging stripped.
    pub fn root(&self) -> &SegmentError {
        match self {
            Self::Series { source, .. } => source.root(),
            other => other,
        }
    }
}
