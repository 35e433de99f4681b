//! Tests for parallel per-series segmentation.
//!
//! These tests verify:
//! 1. Parallel and sequential processing produce identical results
//! 2. Error reporting is deterministic regardless of scheduling
//! 3. A configured segmenter can be shared across threads
//!
//! Run with: cargo test --test parallel_processing_tests

#![cfg(feature = "parallel")]

use ndarray::Array2;
use serde_json::json;
use std::sync::Arc;
use std::thread;
use ts_segment::{
    AnnotatedBatch, Batch, ParallelConfig, SegmentConfig, SegmentError, Segmenter,
    ShortSeriesPolicy,
};

// ============================================================================
// Test Fixtures
// ============================================================================

fn create_test_batch(n_series: usize, channels: usize) -> Batch {
    let series: Vec<Array2<f64>> = (0..n_series)
        .map(|k| {
            let samples = 20 + (k * 37) % 150;
            Array2::from_shape_fn((samples, channels), |(t, d)| {
                ((k * 1_000_000 + t * 100 + d) as f64).sin()
            })
        })
        .collect();

    let labels = (0..n_series).map(|k| json!(k % 3)).collect();

    AnnotatedBatch::new(series)
        .with_field("label", labels)
        .expect("Failed to create test batch")
        .into()
}

fn create_segmenter(parallel: ParallelConfig) -> Segmenter {
    Segmenter::from_config(SegmentConfig::new(16, 0.75).with_parallel(parallel))
        .expect("Failed to create segmenter")
}

// ============================================================================
// Equivalence Tests
// ============================================================================

#[test]
fn test_parallel_vs_sequential_identical_results() {
    let batch = create_test_batch(200, 6);

    let sequential = create_segmenter(ParallelConfig::sequential())
        .transform(&batch)
        .unwrap();
    let global_pool = create_segmenter(ParallelConfig::parallel())
        .transform(&batch)
        .unwrap();

    assert_eq!(sequential, global_pool);
    assert_eq!(sequential.len(), 200);
}

#[test]
fn test_thread_count_does_not_change_output() {
    let batch = create_test_batch(64, 3);
    let reference = create_segmenter(ParallelConfig::sequential())
        .transform(&batch)
        .unwrap();

    for threads in [1, 2, 4, 8] {
        let output = create_segmenter(ParallelConfig::with_threads(threads))
            .transform(&batch)
            .unwrap();
        assert_eq!(output, reference, "Failed for {} threads", threads);
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_lowest_failing_index_reported() {
    let mut series: Vec<Array2<f64>> = (0..100).map(|_| Array2::zeros((40, 2))).collect();
    series[17] = Array2::zeros((5, 2));
    series[63] = Array2::zeros((3, 2));
    let batch = Batch::from(series);

    let config = SegmentConfig::new(10, 0.5)
        .with_short_series(ShortSeriesPolicy::Reject)
        .with_threads(8);
    let segmenter = Segmenter::from_config(config).unwrap();

    for _ in 0..10 {
        let err = segmenter.transform(&batch).unwrap_err();
        assert_eq!(err.series_index(), Some(17));
        assert_eq!(
            err.root(),
            &SegmentError::ShortSeries {
                length: 5,
                width: 10
            }
        );
    }
}

#[test]
fn test_channel_mismatch_in_parallel() {
    let mut series: Vec<Array2<f64>> = (0..50).map(|_| Array2::zeros((30, 4))).collect();
    series[31] = Array2::zeros((30, 5));

    let err = create_segmenter(ParallelConfig::parallel())
        .transform(&Batch::from(series))
        .unwrap_err();
    assert_eq!(err.series_index(), Some(31));
    assert!(matches!(err.root(), SegmentError::InvalidInput(_)));
}

// ============================================================================
// Sharing Tests
// ============================================================================

#[test]
fn test_segmenter_shared_across_threads() {
    let segmenter = Arc::new(create_segmenter(ParallelConfig::sequential()));
    let batch = Arc::new(create_test_batch(20, 2));
    let reference = segmenter.transform(&*batch).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let segmenter = Arc::clone(&segmenter);
            let batch = Arc::clone(&batch);
            thread::spawn(move || segmenter.transform(&*batch).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), reference);
    }
}
