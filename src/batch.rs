//! Batch containers.
//!
//! A batch is either a plain list of series or an annotated list where each
//! series is accompanied by named auxiliary fields (labels, identifiers,
//! anything the caller wants carried along). The two shapes are explicit enum
//! variants so the transform never has to inspect its input to decide how to
//! treat it.
//!
//! Auxiliary fields are stored column-wise: one [`AuxiliaryField`] per name,
//! holding exactly one value per series. They are never windowed; after
//! segmentation each series still owns exactly one value per field.
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use serde_json::json;
//! use ts_segment::batch::{AnnotatedBatch, Batch};
//!
//! let series = vec![Array2::<f64>::zeros((8, 2)), Array2::<f64>::zeros((5, 2))];
//! let batch = AnnotatedBatch::new(series)
//!     .with_field("subject", vec![json!("s01"), json!("s02")])
//!     .unwrap();
//!
//! let batch = Batch::from(batch);
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.fields().unwrap()[0].name, "subject");
//! ```

use crate::error::{Result, SegmentError};
use crate::tensor::{SegmentedSeries, Series};
use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};

/// Reserved name of the channel-data field in an annotated batch.
pub const TS_FIELD: &str = "ts";

/// Value of an auxiliary field for one series. Any JSON-representable value.
pub type FieldValue = serde_json::Value;

/// A named column of per-series values carried through segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryField {
    /// Field name (never [`TS_FIELD`])
    pub name: String,

    /// One value per series, in batch order
    pub values: Vec<FieldValue>,
}

/// One series together with its auxiliary values, record-style.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord<T = f64> {
    /// Channel data, `T × D`
    pub ts: Series<T>,

    /// `(name, value)` pairs for this series
    pub fields: Vec<(String, FieldValue)>,
}

impl<T> SeriesRecord<T> {
    /// Create a record without auxiliary values.
    pub fn new(ts: Series<T>) -> Self {
        Self {
            ts,
            fields: Vec::new(),
        }
    }

    /// Attach an auxiliary value.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }
}

/// Series plus auxiliary fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBatch<T = f64> {
    series: Vec<Series<T>>,
    fields: Vec<AuxiliaryField>,
}

impl<T> AnnotatedBatch<T> {
    /// Create an annotated batch with no fields yet.
    pub fn new(series: Vec<Series<T>>) -> Self {
        Self {
            series,
            fields: Vec::new(),
        }
    }

    /// Add a field with one value per series.
    ///
    /// Fails with `InvalidInput` if the name is reserved or already present,
    /// or if the number of values differs from the number of series.
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<FieldValue>) -> Result<Self> {
        let name = name.into();
        self.check_field_name(&name)?;

        if values.len() != self.series.len() {
            return Err(SegmentError::invalid_input(format!(
                "field `{name}` has {} values for {} series",
                values.len(),
                self.series.len()
            )));
        }

        self.fields.push(AuxiliaryField { name, values });
        Ok(self)
    }

    /// Build a column-wise batch from per-series records.
    ///
    /// The first record fixes the field schema; every other record must carry
    /// the same set of names (in any order). Values are stored in the first
    /// record's name order.
    pub fn from_records(records: Vec<SeriesRecord<T>>) -> Result<Self> {
        let names: Vec<String> = match records.first() {
            Some(first) => first.fields.iter().map(|(name, _)| name.clone()).collect(),
            None => Vec::new(),
        };

        let mut batch = Self::new(Vec::with_capacity(records.len()));
        for name in &names {
            batch
                .check_field_name(name)
                .map_err(|e| e.at_series(0))?;
            batch.fields.push(AuxiliaryField {
                name: name.clone(),
                values: Vec::with_capacity(records.len()),
            });
        }

        for (index, record) in records.into_iter().enumerate() {
            if record.fields.len() != names.len() {
                return Err(SegmentError::invalid_input(format!(
                    "record has {} fields, expected {} ({})",
                    record.fields.len(),
                    names.len(),
                    names.join(", ")
                ))
                .at_series(index));
            }

            let mut values = record.fields;
            for field in batch.fields.iter_mut() {
                let position = values
                    .iter()
                    .position(|(name, _)| *name == field.name)
                    .ok_or_else(|| {
                        SegmentError::invalid_input(format!(
                            "record is missing field `{}`",
                            field.name
                        ))
                        .at_series(index)
                    })?;
                let (_, value) = values.swap_remove(position);
                field.values.push(value);
            }

            batch.series.push(record.ts);
        }

        Ok(batch)
    }

    fn check_field_name(&self, name: &str) -> Result<()> {
        if name == TS_FIELD {
            return Err(SegmentError::invalid_input(format!(
                "`{TS_FIELD}` is reserved for the series data"
            )));
        }
        if self.fields.iter().any(|f| f.name == name) {
            return Err(SegmentError::invalid_input(format!("duplicate field `{name}`")));
        }
        Ok(())
    }

    /// The channel data of every series.
    pub fn series(&self) -> &[Series<T>] {
        &self.series
    }

    /// All auxiliary fields, in insertion order.
    pub fn fields(&self) -> &[AuxiliaryField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&AuxiliaryField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names, in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the batch holds no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Input to a segmentation transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch<T = f64> {
    /// Series only.
    Plain(Vec<Series<T>>),

    /// Series with auxiliary fields.
    Annotated(AnnotatedBatch<T>),
}

impl<T> Batch<T> {
    /// The channel data of every series, regardless of variant.
    pub fn series(&self) -> &[Series<T>] {
        match self {
            Batch::Plain(series) => series,
            Batch::Annotated(batch) => batch.series(),
        }
    }

    /// Auxiliary fields, if this is an annotated batch.
    pub fn fields(&self) -> Option<&[AuxiliaryField]> {
        match self {
            Batch::Plain(_) => None,
            Batch::Annotated(batch) => Some(batch.fields()),
        }
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series().len()
    }

    /// Whether the batch holds no series.
    pub fn is_empty(&self) -> bool {
        self.series().is_empty()
    }
}

impl<T> From<Vec<Series<T>>> for Batch<T> {
    fn from(series: Vec<Series<T>>) -> Self {
        Batch::Plain(series)
    }
}

impl<T> From<AnnotatedBatch<T>> for Batch<T> {
    fn from(batch: AnnotatedBatch<T>) -> Self {
        Batch::Annotated(batch)
    }
}

/// A borrowed view of one segmented series and its auxiliary values.
#[derive(Debug, Clone)]
pub struct SegmentRecord<'a, T = f64> {
    /// Position of the series in the batch
    pub index: usize,

    /// `N × W × D` window tensor
    pub ts: &'a SegmentedSeries<T>,

    /// `(name, value)` pairs for this series; empty for plain batches
    pub fields: Vec<(&'a str, &'a FieldValue)>,
}

/// Output of a segmentation transform.
///
/// Holds one window tensor per input series, in input order, and the input's
/// auxiliary fields unchanged. Every tensor is an owned snapshot independent
/// of the segmenter that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedBatch<T = f64> {
    segments: Vec<SegmentedSeries<T>>,
    fields: Option<Vec<AuxiliaryField>>,
    width: usize,
    step: usize,
}

impl<T> SegmentedBatch<T> {
    pub(crate) fn new(
        segments: Vec<SegmentedSeries<T>>,
        fields: Option<Vec<AuxiliaryField>>,
        width: usize,
        step: usize,
    ) -> Self {
        Self {
            segments,
            fields,
            width,
            step,
        }
    }

    /// Window tensors, one per input series.
    pub fn segments(&self) -> &[SegmentedSeries<T>] {
        &self.segments
    }

    /// Window tensor of series `index`.
    pub fn segment(&self, index: usize) -> Option<&SegmentedSeries<T>> {
        self.segments.get(index)
    }

    /// Auxiliary fields, if the input was annotated.
    pub fn fields(&self) -> Option<&[AuxiliaryField]> {
        self.fields.as_deref()
    }

    /// Look up an auxiliary field by name.
    pub fn field(&self, name: &str) -> Option<&AuxiliaryField> {
        self.fields.as_ref()?.iter().find(|f| f.name == name)
    }

    /// Whether the input was an annotated batch.
    pub fn is_annotated(&self) -> bool {
        self.fields.is_some()
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the batch holds no series.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Window width used.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Window step used.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Channel count, taken from the first series.
    pub fn channels(&self) -> Option<usize> {
        self.segments.first().map(|s| s.dim().2)
    }

    /// Number of windows per series.
    pub fn window_counts(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.dim().0).collect()
    }

    /// Total number of windows across the batch.
    pub fn total_windows(&self) -> usize {
        self.segments.iter().map(|s| s.dim().0).sum()
    }

    /// Iterate series with their auxiliary values.
    pub fn records(&self) -> impl Iterator<Item = SegmentRecord<'_, T>> {
        self.segments.iter().enumerate().map(move |(index, ts)| {
            let fields = self
                .fields
                .iter()
                .flatten()
                .filter_map(|f| f.values.get(index).map(|v| (f.name.as_str(), v)))
                .collect();
            SegmentRecord { index, ts, fields }
        })
    }

    /// Split into tensors and fields.
    pub fn into_parts(self) -> (Vec<SegmentedSeries<T>>, Option<Vec<AuxiliaryField>>) {
        (self.segments, self.fields)
    }
}

impl<T: Clone> SegmentedBatch<T> {
    /// Stack all windows of the batch into one `(ΣN, W, D)` tensor.
    ///
    /// Returns the tensor together with the source-series index of every
    /// window. Auxiliary fields stay per series; use the index to join them.
    pub fn concatenate(&self) -> Result<(Array3<T>, Vec<usize>)> {
        let series_index: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .flat_map(|(k, s)| std::iter::repeat(k).take(s.dim().0))
            .collect();

        if self.segments.is_empty() {
            let empty = Array3::from_shape_vec((0, self.width, 0), Vec::new())
                .map_err(|e| SegmentError::invalid_input(format!("tensor shape error: {e}")))?;
            return Ok((empty, series_index));
        }

        let views: Vec<_> = self.segments.iter().map(|s| s.view()).collect();
        let stacked = ndarray::concatenate(Axis(0), &views).map_err(|e| {
            SegmentError::invalid_input(format!("segments cannot be concatenated: {e}"))
        })?;

        Ok((stacked, series_index))
    }
}
