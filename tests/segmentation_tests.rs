//! End-to-end segmentation tests.
//!
//! These tests verify:
//! 1. Window counts and contents for the reference configurations
//! 2. Batch order and auxiliary-field pass-through
//! 3. Short-series policies across a whole batch
//! 4. Configure / transform lifecycle of the wrapper

use ndarray::{array, s, Array2, Array3};
use serde_json::json;
use ts_segment::{
    AnnotatedBatch, Batch, Segment, SegmentConfig, SegmentError, Segmenter, SeriesRecord,
    ShortSeriesPolicy,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Series whose value at (t, d) is `t + 100 * d`, so every sample is unique.
fn ramp(samples: usize, channels: usize) -> Array2<f64> {
    Array2::from_shape_fn((samples, channels), |(t, d)| (t + 100 * d) as f64)
}

// ============================================================================
// Reference Examples
// ============================================================================

#[test]
fn test_half_overlap_univariate() {
    let mut segment = Segment::new();
    assert_eq!(segment.configure(4, 0.5).unwrap(), 2);

    let batch = Batch::from(vec![array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]]]);
    let out = segment.transform(&batch).unwrap();

    let expected: Array3<f64> = array![
        [[0.0], [1.0], [2.0], [3.0]],
        [[2.0], [3.0], [4.0], [5.0]],
        [[4.0], [5.0], [6.0], [7.0]]
    ];
    assert_eq!(out.segments()[0], expected);
}

#[test]
fn test_no_overlap_drops_incomplete_tail() {
    let mut segment = Segment::new();
    assert_eq!(segment.configure(3, 0.0).unwrap(), 3);

    let out = segment.transform(&Batch::from(vec![ramp(7, 4)])).unwrap();
    let tensor = &out.segments()[0];

    assert_eq!(tensor.dim(), (2, 3, 4));
    assert_eq!(tensor[[0, 0, 0]], 0.0);
    assert_eq!(tensor[[1, 0, 0]], 3.0);
    assert_eq!(tensor[[1, 2, 3]], 305.0);
}

#[test]
fn test_batch_of_differing_lengths_with_fields() {
    let segmenter = Segmenter::new(4, 0.5).unwrap();
    let batch = AnnotatedBatch::new(vec![ramp(8, 2), ramp(5, 2)])
        .with_field("subject", vec![json!(7), json!(9)])
        .unwrap()
        .with_field("meta", vec![json!({"rate": 50.0}), json!(null)])
        .unwrap();

    let out = segmenter.transform(&Batch::from(batch.clone())).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out.window_counts(), vec![3, 1]);
    assert_eq!(out.segments()[1].dim(), (1, 4, 2));
    assert_eq!(
        out.segments()[1].slice(s![0, .., 0]),
        array![0.0, 1.0, 2.0, 3.0]
    );
    assert_eq!(out.fields().unwrap(), batch.fields());

    // Fields stay per series, never per window
    assert_eq!(out.field("subject").unwrap().values.len(), 2);
    assert_eq!(
        serde_json::to_vec(&out.field("meta").unwrap().values).unwrap(),
        serde_json::to_vec(&batch.field("meta").unwrap().values).unwrap()
    );
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_window_contents_match_source_ranges() {
    let series = ramp(37, 3);
    for width in 1..8 {
        for i in 0..=10 {
            let overlap = i as f64 / 10.0;
            let segmenter = Segmenter::new(width, overlap).unwrap();
            let step = segmenter.step();

            let out = segmenter.transform(&Batch::from(vec![series.clone()])).unwrap();
            let tensor = &out.segments()[0];

            assert_eq!(tensor.dim().0, (37 - width) / step + 1);
            for n in 0..tensor.dim().0 {
                let start = n * step;
                assert_eq!(
                    tensor.slice(s![n, .., ..]),
                    series.slice(s![start..start + width, ..])
                );
            }
        }
    }
}

#[test]
fn test_adjacent_windows_overlap_by_width_minus_step() {
    let segmenter = Segmenter::new(10, 0.7).unwrap();
    let step = segmenter.step();
    assert_eq!(step, 3);

    let out = segmenter.transform(&Batch::from(vec![ramp(50, 2)])).unwrap();
    let tensor = &out.segments()[0];

    for n in 0..tensor.dim().0 - 1 {
        assert_eq!(
            tensor.slice(s![n, step.., ..]),
            tensor.slice(s![n + 1, ..10 - step, ..])
        );
    }
}

#[test]
fn test_transform_is_idempotent() {
    let segmenter = Segmenter::new(5, 0.4).unwrap();
    let batch: Batch = AnnotatedBatch::new(vec![ramp(20, 2), ramp(3, 2), ramp(11, 2)])
        .with_field("label", vec![json!(0), json!(1), json!(0)])
        .unwrap()
        .into();

    let first = segmenter.transform(&batch).unwrap();
    let second = segmenter.transform(&batch).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_batch_order_preserved() {
    let segmenter = Segmenter::new(2, 0.0).unwrap();
    let series: Vec<_> = (0..10).map(|k| ramp(2 * k + 2, 1) + k as f64 * 1000.0).collect();

    let out = segmenter.transform(&Batch::from(series)).unwrap();
    for (k, tensor) in out.segments().iter().enumerate() {
        assert_eq!(tensor.dim().0, k + 1);
        assert_eq!(tensor[[0, 0, 0]], k as f64 * 1000.0);
    }
}

#[test]
fn test_single_precision_preserved() {
    let segmenter = Segmenter::new(2, 0.5).unwrap();
    let series: Array2<f32> = array![[0.1], [0.2], [0.3]];

    let out = segmenter.transform(&Batch::from(vec![series])).unwrap();
    let tensor: &Array3<f32> = &out.segments()[0];
    assert_eq!(tensor[[1, 1, 0]], 0.3_f32);
}

// ============================================================================
// Short Series
// ============================================================================

#[test]
fn test_short_series_kept_as_empty_tensor() {
    let segmenter = Segmenter::new(6, 0.5).unwrap();
    let batch = Batch::from(vec![ramp(10, 2), ramp(4, 2), ramp(0, 2)]);

    let out = segmenter.transform(&batch).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out.segments()[1].dim(), (0, 6, 2));
    assert_eq!(out.segments()[2].dim(), (0, 6, 2));
    assert_eq!(out.window_counts(), vec![2, 0, 0]);
}

#[test]
fn test_short_series_rejected_under_strict_policy() {
    let config = SegmentConfig::new(6, 0.5).with_short_series(ShortSeriesPolicy::Reject);
    let segmenter = Segmenter::from_config(config).unwrap();
    let batch = Batch::from(vec![ramp(10, 2), ramp(4, 2)]);

    let err = segmenter.transform(&batch).unwrap_err();
    assert_eq!(err.series_index(), Some(1));
    assert_eq!(
        err.root(),
        &SegmentError::ShortSeries {
            length: 4,
            width: 6
        }
    );
    assert!(err.to_string().contains("series 1"));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_transform_before_configure_fails() {
    let segment = Segment::new();
    let err = segment.transform(&Batch::from(vec![ramp(8, 1)])).unwrap_err();
    assert_eq!(err, SegmentError::NotConfigured);
}

#[test]
fn test_reconfigure_leaves_previous_output_untouched() {
    let mut segment = Segment::new();
    let batch = Batch::from(vec![ramp(12, 1)]);

    segment.configure(4, 0.5).unwrap();
    let before = segment.transform(&batch).unwrap();
    let snapshot = before.clone();

    segment.configure(3, 0.0).unwrap();
    let after = segment.transform(&batch).unwrap();

    assert_eq!(before, snapshot);
    assert_eq!(before.segments()[0].dim(), (5, 4, 1));
    assert_eq!(after.segments()[0].dim(), (4, 3, 1));
}

#[test]
fn test_invalid_configuration_names_parameter() {
    let mut segment = Segment::new();

    let err = segment.configure(0, 0.5).unwrap_err();
    assert!(err.to_string().contains("width"));

    let err = segment.configure(8, 1.5).unwrap_err();
    assert!(err.to_string().contains("overlap"));
    assert!(!segment.is_ready());
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_records_round_trip_through_transform() {
    let records = vec![
        SeriesRecord::new(ramp(9, 3)).with_field("label", json!("sit")),
        SeriesRecord::new(ramp(6, 3)).with_field("label", json!("stand")),
    ];
    let batch = AnnotatedBatch::from_records(records).unwrap();

    let out = Segmenter::new(3, 0.0).unwrap().transform(&Batch::from(batch)).unwrap();
    let records: Vec<_> = out.records().collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].ts.dim(), (3, 3, 3));
    assert_eq!(records[0].fields, vec![("label", &json!("sit"))]);
    assert_eq!(records[1].ts.dim(), (2, 3, 3));
    assert_eq!(records[1].fields, vec![("label", &json!("stand"))]);
}

#[test]
fn test_concatenate_maps_windows_to_series() {
    let segmenter = Segmenter::new(4, 0.5).unwrap();
    let out = segmenter
        .transform(&Batch::from(vec![ramp(8, 2), ramp(2, 2), ramp(5, 2)]))
        .unwrap();

    let (stacked, index) = out.concatenate().unwrap();
    assert_eq!(stacked.dim(), (4, 4, 2));
    assert_eq!(index, vec![0, 0, 0, 2]);
    assert_eq!(stacked.slice(s![3, .., ..]), out.segments()[2].slice(s![0, .., ..]));
}
