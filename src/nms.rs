//! Greedy non-maximum suppression.

use crate::error::{Error, Result};
use crate::overlap::{check_box_shape, overlap_matrix};
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Suppress near-duplicate detections, keeping the highest-scoring box of
/// every overlapping cluster.
///
/// Returns indices into `boxes` in the order they were selected, i.e. by
/// descending score. Each iteration keeps the best remaining candidate and
/// drops every other candidate whose overlap with it exceeds `threshold`;
/// the boundary is inclusive, so an overlap exactly equal to the threshold
/// survives.
///
/// Equal scores keep their original relative order (stable sort). The
/// ordering of NaN scores is unspecified; callers are expected to hand in
/// finite scores.
pub fn suppress(
    boxes: ArrayView2<f32>,
    scores: ArrayView1<f32>,
    threshold: f32,
) -> Result<Vec<usize>> {
    check_box_shape(boxes)?;
    if boxes.nrows() != scores.len() {
        return Err(Error::ScoreLengthMismatch {
            boxes: boxes.nrows(),
            scores: scores.len(),
        });
    }

    let mut order: Vec<usize> = (0..boxes.nrows()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut keep = Vec::new();
    while !order.is_empty() {
        let i = order[0];
        keep.push(i);

        let rest = &order[1..];
        let candidates = boxes.select(Axis(0), rest);
        let row = overlap_matrix(boxes.row(i).insert_axis(Axis(0)), candidates.view())?;

        order = rest
            .iter()
            .zip(row.row(0))
            .filter_map(|(&idx, &iou)| (iou <= threshold).then_some(idx))
            .collect();
    }

    Ok(keep)
}

/// Post-processing parameters for a set of scored detections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// Detections scoring below this are dropped before suppression.
    pub score_threshold: f32,
    /// Overlap above which a lower-scoring box counts as a duplicate.
    pub nms_threshold: f32,
    /// Upper bound on the number of surviving detections.
    pub max_detections: usize,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            nms_threshold: 0.3,
            max_detections: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    #[test]
    fn empty_input_keeps_nothing() {
        let boxes = Array2::<f32>::zeros((0, 4));
        let scores = Array1::<f32>::zeros(0);
        assert!(
            suppress(boxes.view(), scores.view(), 0.5)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn single_box_is_kept() {
        let boxes = array![[0.0_f32, 0.0, 10.0, 10.0]];
        let scores = array![0.4_f32];
        assert_eq!(suppress(boxes.view(), scores.view(), 0.5).unwrap(), vec![0]);
    }

    #[test]
    fn duplicate_of_the_best_box_is_suppressed() {
        let boxes = array![
            [0.0_f32, 0.0, 10.0, 10.0],
            [0.0, 0.0, 10.0, 10.0],
            [0.0, 0.0, 1.0, 1.0],
        ];
        let scores = array![0.9_f32, 0.8, 0.7];
        assert_eq!(
            suppress(boxes.view(), scores.view(), 0.5).unwrap(),
            vec![0, 2]
        );
    }

    #[test]
    fn overlap_equal_to_threshold_survives() {
        let boxes = array![[0.0_f32, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 5.0]];
        let scores = array![0.9_f32, 0.8];
        let iou = overlap_matrix(boxes.view(), boxes.view()).unwrap()[[0, 1]];

        assert_eq!(
            suppress(boxes.view(), scores.view(), iou).unwrap(),
            vec![0, 1]
        );
        assert_eq!(
            suppress(boxes.view(), scores.view(), iou - 1e-4).unwrap(),
            vec![0]
        );
    }

    #[test]
    fn full_threshold_only_removes_near_duplicates() {
        // IoU of this pair is 0.5; a threshold of 1.0 keeps both.
        let boxes = array![[0.0_f32, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 5.0]];
        let scores = array![0.9_f32, 0.8];
        assert_eq!(
            suppress(boxes.view(), scores.view(), 1.0).unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn zero_threshold_suppresses_any_positive_overlap() {
        let boxes = array![
            [0.0_f32, 0.0, 10.0, 10.0],
            [9.0, 9.0, 20.0, 20.0],
            [10.0, 10.0, 20.0, 20.0],
        ];
        let scores = array![0.9_f32, 0.8, 0.7];
        // box 1 shares a sliver with box 0; box 2 only touches at a corner
        assert_eq!(
            suppress(boxes.view(), scores.view(), 0.0).unwrap(),
            vec![0, 2]
        );
    }

    #[test]
    fn equal_scores_keep_original_order() {
        let boxes = array![[0.0_f32, 0.0, 10.0, 10.0], [100.0, 100.0, 110.0, 110.0]];
        let scores = array![0.5_f32, 0.5];
        assert_eq!(
            suppress(boxes.view(), scores.view(), 0.5).unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn misaligned_scores_are_rejected() {
        let boxes = Array2::<f32>::zeros((3, 4));
        let scores = Array1::<f32>::zeros(2);
        assert_eq!(
            suppress(boxes.view(), scores.view(), 0.5),
            Err(Error::ScoreLengthMismatch {
                boxes: 3,
                scores: 2
            })
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SuppressionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SuppressionConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.max_detections, config.max_detections);
        assert!((back.nms_threshold - config.nms_threshold).abs() < f32::EPSILON);
        assert!((back.score_threshold - config.score_threshold).abs() < f32::EPSILON);
    }
}
