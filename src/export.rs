//! NumPy export of segmented batches.
//!
//! Writes a [`SegmentedBatch`] to a directory for consumption from Python:
//!
//! - `segments.npy`: every window of the batch, `[ΣN, W, D]`
//! - `series_index.npy`: source series of each window, `[ΣN]` (u64)
//! - `fields.json`: auxiliary fields, one value per series (annotated batches only)
//! - `metadata.json`: shapes and windowing parameters
//!
//! # Example
//!
//! ```ignore
//! use ts_segment::export::NumpyExporter;
//!
//! let out = segmenter.transform(&batch)?;
//! let metadata = NumpyExporter::new("data/segmented").export(&out)?;
//! println!("{} windows written", metadata.n_windows);
//! ```

use crate::batch::SegmentedBatch;
use crate::error::SegmentError;
use log::info;
use ndarray::Array1;
use ndarray_npy::{WritableElement, WriteNpyError, WriteNpyExt};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File holding the concatenated window tensor.
pub const SEGMENTS_FILE: &str = "segments.npy";
/// File holding the per-window source series index.
pub const SERIES_INDEX_FILE: &str = "series_index.npy";
/// File holding the auxiliary fields.
pub const FIELDS_FILE: &str = "fields.json";
/// File holding the export metadata.
pub const METADATA_FILE: &str = "metadata.json";

/// Error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An array could not be encoded.
    #[error("failed to write {file}: {source}")]
    Npy {
        /// Target file name
        file: &'static str,
        /// Underlying encoder error
        #[source]
        source: WriteNpyError,
    },

    /// JSON encoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The batch could not be flattened.
    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// Metadata about an exported batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Number of source series
    pub n_series: usize,

    /// Total number of windows
    pub n_windows: usize,

    /// Window width
    pub width: usize,

    /// Window step
    pub step: usize,

    /// Channels per sample (0 for an empty batch)
    pub channels: usize,

    /// Windows per source series
    pub window_counts: Vec<usize>,

    /// Whether `fields.json` was written
    pub has_fields: bool,

    /// Export timestamp (RFC 3339)
    pub export_timestamp: String,
}

/// NumPy exporter - exports segmented batches to .npy files for Python.
pub struct NumpyExporter {
    output_dir: PathBuf,
}

impl NumpyExporter {
    /// Create new NumPy exporter.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Target directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export a segmented batch, creating the directory if needed.
    pub fn export<T>(&self, batch: &SegmentedBatch<T>) -> Result<ExportMetadata, ExportError>
    where
        T: Clone + WritableElement,
    {
        fs::create_dir_all(&self.output_dir)?;

        let (segments, series_index) = batch.concatenate()?;
        let (n_windows, width, channels) = segments.dim();

        let path = self.output_dir.join(SEGMENTS_FILE);
        segments
            .write_npy(BufWriter::new(File::create(&path)?))
            .map_err(|source| ExportError::Npy {
                file: SEGMENTS_FILE,
                source,
            })?;
        info!(
            "Exported segments: {} [{} windows × {} samples × {} channels]",
            path.display(),
            n_windows,
            width,
            channels
        );

        let index = Array1::from_iter(series_index.iter().map(|&k| k as u64));
        index
            .write_npy(BufWriter::new(File::create(
                self.output_dir.join(SERIES_INDEX_FILE),
            )?))
            .map_err(|source| ExportError::Npy {
                file: SERIES_INDEX_FILE,
                source,
            })?;

        if let Some(fields) = batch.fields() {
            let file = File::create(self.output_dir.join(FIELDS_FILE))?;
            serde_json::to_writer_pretty(BufWriter::new(file), fields)?;
        }

        let metadata = ExportMetadata {
            n_series: batch.len(),
            n_windows,
            width: batch.width(),
            step: batch.step(),
            channels,
            window_counts: batch.window_counts(),
            has_fields: batch.is_annotated(),
            export_timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let file = File::create(self.output_dir.join(METADATA_FILE))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &metadata)?;

        info!(
            "Exported {} series ({} windows) to {}",
            metadata.n_series,
            metadata.n_windows,
            self.output_dir.display()
        );

        Ok(metadata)
    }
}

/// Export a segmented batch with default settings.
pub fn export_to_numpy<T, P>(
    batch: &SegmentedBatch<T>,
    output_dir: P,
) -> Result<ExportMetadata, ExportError>
where
    T: Clone + WritableElement,
    P: AsRef<Path>,
{
    NumpyExporter::new(output_dir).export(batch)
}
