//! Batch segmentation.
//!
//! [`Segmenter`] is the configured, immutable form of a [`SegmentConfig`]: the
//! step is derived and validated once at construction and every transform
//! reads it through `&self`. A segmenter can be shared freely between threads.
//!
//! [`Segment`] is the stateful `configure` / `is_ready` / `transform` wrapper
//! for callers that follow a fit-then-transform lifecycle. Reconfiguring it
//! needs `&mut self`, so it can never change under an in-flight transform.
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use ts_segment::{Batch, Segmenter};
//!
//! let segmenter = Segmenter::new(4, 0.5).unwrap();
//! assert_eq!(segmenter.step(), 2);
//!
//! let series = Array2::from_shape_fn((8, 1), |(t, _)| t as f64);
//! let out = segmenter.transform(&Batch::from(vec![series])).unwrap();
//!
//! assert_eq!(out.segments()[0].dim(), (3, 4, 1));
//! ```

use crate::batch::{AuxiliaryField, Batch, SegmentedBatch};
use crate::config::{ParallelConfig, SegmentConfig, ShortSeriesPolicy};
use crate::error::{Result, SegmentError};
use crate::tensor::{build_tensor, SegmentedSeries, Series};
use log::{debug, trace};
use ndarray::ArrayView2;
use std::time::Instant;

/// A validated segmentation configuration with its derived step.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmenter {
    config: SegmentConfig,
    step: usize,
}

impl Segmenter {
    /// Configure a segmenter with default policies.
    ///
    /// Fails with `InvalidParameter` if `width == 0` or `overlap` is outside
    /// `[0, 1]`.
    pub fn new(width: usize, overlap: f64) -> Result<Self> {
        Self::from_config(SegmentConfig::new(width, overlap))
    }

    /// Validate a configuration and derive its step.
    pub fn from_config(config: SegmentConfig) -> Result<Self> {
        config.validate()?;
        let step = config.step()?;

        debug!(
            "Configured segmenter: width={} overlap={} step={} short_series={:?}",
            config.width, config.overlap, step, config.short_series
        );

        Ok(Self { config, step })
    }

    /// Window width.
    #[inline]
    pub fn width(&self) -> usize {
        self.config.width
    }

    /// Overlap fraction the step was derived from.
    #[inline]
    pub fn overlap(&self) -> f64 {
        self.config.overlap
    }

    /// Derived step between window starts.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Short-series policy.
    pub fn short_series(&self) -> ShortSeriesPolicy {
        self.config.short_series
    }

    /// The configuration this segmenter was built from.
    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Segment a single series, applying the short-series policy.
    pub fn segment_series<T: Clone>(
        &self,
        series: ArrayView2<'_, T>,
    ) -> Result<SegmentedSeries<T>> {
        let length = series.nrows();
        if length < self.width() && self.short_series() == ShortSeriesPolicy::Reject {
            return Err(SegmentError::ShortSeries {
                length,
                width: self.width(),
            });
        }

        build_tensor(series, self.width(), self.step)
    }

    /// Segment every series of a batch and carry its auxiliary fields through.
    pub fn transform<T>(&self, batch: &Batch<T>) -> Result<SegmentedBatch<T>>
    where
        T: Clone + Send + Sync,
    {
        let start = Instant::now();

        let segments = self.transform_series(batch.series())?;
        let fields = batch.fields().map(<[AuxiliaryField]>::to_vec);
        let output = SegmentedBatch::new(segments, fields, self.width(), self.step);

        debug!(
            "Segmented {} series into {} windows (width={}, step={}) in {:?}",
            output.len(),
            output.total_windows(),
            self.width(),
            self.step,
            start.elapsed()
        );

        Ok(output)
    }

    /// Segment a list of series, preserving order.
    ///
    /// The first series fixes the channel count; any series with a different
    /// count fails with `InvalidInput`. Every error is tagged with the position
    /// of the series that raised it, and the lowest position wins when several
    /// series fail.
    pub fn transform_series<T>(&self, series: &[Series<T>]) -> Result<Vec<SegmentedSeries<T>>>
    where
        T: Clone + Send + Sync,
    {
        let channels = series.first().map(|s| s.ncols());

        let results = if self.config.parallel.enabled {
            self.fan_out(series, channels)?
        } else {
            series
                .iter()
                .enumerate()
                .map(|(index, s)| self.segment_at(index, s, channels))
                .collect()
        };

        results.into_iter().collect()
    }

    fn segment_at<T: Clone>(
        &self,
        index: usize,
        series: &Series<T>,
        channels: Option<usize>,
    ) -> Result<SegmentedSeries<T>> {
        if Some(series.ncols()) != channels {
            return Err(SegmentError::invalid_input(format!(
                "series has {} channels, batch expects {}",
                series.ncols(),
                channels.unwrap_or(0)
            ))
            .at_series(index));
        }

        let tensor = self
            .segment_series(series.view())
            .map_err(|e| e.at_series(index))?;

        trace!(
            "Series {}: {} samples -> {} windows",
            index,
            series.nrows(),
            tensor.dim().0
        );

        Ok(tensor)
    }

    #[cfg(feature = "parallel")]
    fn fan_out<T>(
        &self,
        series: &[Series<T>],
        channels: Option<usize>,
    ) -> Result<Vec<Result<SegmentedSeries<T>>>>
    where
        T: Clone + Send + Sync,
    {
        use rayon::prelude::*;

        let run = || {
            series
                .par_iter()
                .enumerate()
                .map(|(index, s)| self.segment_at(index, s, channels))
                .collect::<Vec<_>>()
        };

        match self.config.parallel.num_threads {
            // A local pool, since the global one can only be configured once
            // per process.
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SegmentError::ThreadPool(e.to_string()))?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn fan_out<T: Clone>(
        &self,
        series: &[Series<T>],
        channels: Option<usize>,
    ) -> Result<Vec<Result<SegmentedSeries<T>>>> {
        Ok(series
            .iter()
            .enumerate()
            .map(|(index, s)| self.segment_at(index, s, channels))
            .collect())
    }
}

/// Stateful fit/transform wrapper around [`Segmenter`].
///
/// States: unconfigured until [`Segment::configure`] succeeds, then ready.
/// A failed `configure` leaves the wrapper unconfigured.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    short_series: ShortSeriesPolicy,
    parallel: ParallelConfig,
    segmenter: Option<Segmenter>,
}

impl Segment {
    /// Create an unconfigured wrapper with default policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the short-series policy applied by subsequent `configure` calls.
    pub fn with_short_series(mut self, policy: ShortSeriesPolicy) -> Self {
        self.short_series = policy;
        self
    }

    /// Set the fan-out settings applied by subsequent `configure` calls.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate `width` and `overlap` and derive the step.
    ///
    /// Replaces any previous configuration. Earlier transform outputs are
    /// unaffected.
    pub fn configure(&mut self, width: usize, overlap: f64) -> Result<usize> {
        let config = SegmentConfig::new(width, overlap)
            .with_short_series(self.short_series)
            .with_parallel(self.parallel.clone());
        self.configure_with(config)
    }

    /// Configure from a full [`SegmentConfig`].
    pub fn configure_with(&mut self, config: SegmentConfig) -> Result<usize> {
        self.segmenter = None;

        self.short_series = config.short_series;
        self.parallel = config.parallel.clone();

        let segmenter = Segmenter::from_config(config)?;
        let step = segmenter.step();
        self.segmenter = Some(segmenter);
        Ok(step)
    }

    /// Whether `configure` has succeeded.
    pub fn is_ready(&self) -> bool {
        self.segmenter.is_some()
    }

    /// Derived step, once configured.
    pub fn step(&self) -> Option<usize> {
        self.segmenter.as_ref().map(Segmenter::step)
    }

    /// The configured segmenter, or `NotConfigured`.
    pub fn segmenter(&self) -> Result<&Segmenter> {
        self.segmenter.as_ref().ok_or(SegmentError::NotConfigured)
    }

    /// Drop the configuration.
    pub fn reset(&mut self) {
        self.segmenter = None;
    }

    /// Segment a batch. Fails with `NotConfigured` before `configure`.
    pub fn transform<T>(&self, batch: &Batch<T>) -> Result<SegmentedBatch<T>>
    where
        T: Clone + Send + Sync,
    {
        self.segmenter()?.transform(batch)
    }
}

/// Segment a batch in one call.
///
/// # Example
///
/// ```
/// use ndarray::Array2;
/// use ts_segment::{segment_batch, Batch};
///
/// let batch = Batch::from(vec![Array2::<f32>::zeros((7, 3))]);
/// let out = segment_batch(&batch, 3, 0.0).unwrap();
/// assert_eq!(out.segments()[0].dim(), (2, 3, 3));
/// ```
pub fn segment_batch<T>(batch: &Batch<T>, width: usize, overlap: f64) -> Result<SegmentedBatch<T>>
where
    T: Clone + Send + Sync,
{
    Segmenter::new(width, overlap)?.transform(batch)
}
