//! Segmentation configuration.
//!
//! [`SegmentConfig`] holds the user-facing parameters (window width and
//! overlap fraction) plus the batch policies. It serializes to TOML or JSON so
//! that the exact windowing used to produce a dataset can be versioned next to
//! it.
//!
//! # Example
//!
//! ```
//! use ts_segment::config::{SegmentConfig, ShortSeriesPolicy};
//!
//! let config = SegmentConfig::new(4, 0.5).with_short_series(ShortSeriesPolicy::Reject);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.step().unwrap(), 2);
//! ```

use crate::error::{Result, SegmentError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

/// Derive the window step from width and overlap.
///
/// `step = max(1, round(width * (1 - overlap)))`. Rounding is half away from
/// zero. A step below one is clamped rather than rejected.
pub fn derive_step(width: usize, overlap: f64) -> Result<usize> {
    validate_parameters(width, overlap)?;

    let step = (width as f64 * (1.0 - overlap)).round();
    Ok(if step < 1.0 { 1 } else { step as usize })
}

fn validate_parameters(width: usize, overlap: f64) -> Result<()> {
    if width == 0 {
        return Err(SegmentError::invalid_parameter("width", "must be >= 1, got 0"));
    }
    if !(0.0..=1.0).contains(&overlap) {
        return Err(SegmentError::invalid_parameter(
            "overlap",
            format!("must be within [0, 1], got {overlap}"),
        ));
    }
    Ok(())
}

/// What to do with a series shorter than the window width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSeriesPolicy {
    /// Emit an explicit `(0, W, D)` tensor for the series (default).
    #[default]
    Empty,

    /// Fail the whole batch with [`SegmentError::ShortSeries`].
    Reject,
}

/// Per-series fan-out settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Process the series of a batch on a rayon pool.
    ///
    /// Ignored when the crate is built without the `parallel` feature.
    pub enabled: bool,

    /// Worker count for a dedicated pool.
    ///
    /// - `None`: use the global rayon pool
    /// - `Some(n)`: build a local pool with exactly n threads per transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Sequential processing.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Parallel processing on the global pool.
    pub fn parallel() -> Self {
        Self {
            enabled: true,
            num_threads: None,
        }
    }

    /// Parallel processing on a local pool with `threads` workers.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            enabled: true,
            num_threads: Some(threads),
        }
    }
}

/// Segmentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Number of samples per window.
    pub width: usize,

    /// Fraction of a window shared with the next one, in `[0, 1]`.
    ///
    /// - 0.0: windows are adjacent (step = width)
    /// - 0.5: half of each window is repeated
    /// - 1.0: maximal overlap (step = 1)
    pub overlap: f64,

    /// Handling of series shorter than `width`.
    #[serde(default)]
    pub short_series: ShortSeriesPolicy,

    /// Per-series fan-out settings.
    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self::new(100, 0.5)
    }
}

impl SegmentConfig {
    /// Create a configuration with default policies.
    pub fn new(width: usize, overlap: f64) -> Self {
        Self {
            width,
            overlap,
            short_series: ShortSeriesPolicy::default(),
            parallel: ParallelConfig::default(),
        }
    }

    /// Set the short-series policy.
    pub fn with_short_series(mut self, policy: ShortSeriesPolicy) -> Self {
        self.short_series = policy;
        self
    }

    /// Set the fan-out settings.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable parallel processing with a dedicated pool of `threads` workers.
    ///
    /// # Panics
    ///
    /// Panics if threads is 0.
    pub fn with_threads(mut self, threads: usize) -> Self {
        assert!(threads > 0, "Thread count must be > 0");
        self.parallel = ParallelConfig::with_threads(threads);
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        validate_parameters(self.width, self.overlap)?;

        if self.parallel.num_threads == Some(0) {
            return Err(SegmentError::invalid_parameter(
                "num_threads",
                "must be >= 1 when set",
            ));
        }

        Ok(())
    }

    /// The step this configuration derives.
    pub fn step(&self) -> Result<usize> {
        derive_step(self.width, self.overlap)
    }

    /// Save configuration to TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), Box<dyn Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load and validate configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> std::result::Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        let config: SegmentConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), Box<dyn Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load and validate configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::result::Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        let config: SegmentConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
