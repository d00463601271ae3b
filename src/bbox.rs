//! Bounding box values and scored detection sets.
//!
//! Core types for detection candidates: a corner-form box value and a dense,
//! index-aligned collection of boxes with confidence scores.

use crate::error::{Error, Result};
use crate::nms::{SuppressionConfig, suppress};
use crate::overlap::{EPS, check_box_shape};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in `(top, left, bottom, right)` corner form.
///
/// Well-formed boxes satisfy `y2 >= y1` and `x2 >= x1`; zero-area boxes are
/// valid inputs everywhere and contribute zero area terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub y1: f32,
    pub x1: f32,
    pub y2: f32,
    pub x2: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(y1: f32, x1: f32, y2: f32, x2: f32) -> Self {
        Self { y1, x1, y2, x2 }
    }

    /// Read a box from one row of an `(N, 4)` array.
    pub fn from_row(row: ArrayView1<f32>) -> Self {
        Self::new(row[0], row[1], row[2], row[3])
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Area of the bounding box.
    pub fn area(&self) -> f32 {
        self.height() * self.width()
    }

    /// Center point as `(y, x)`.
    pub fn center(&self) -> (f32, f32) {
        (
            self.y1 + self.height() / 2.0,
            self.x1 + self.width() / 2.0,
        )
    }

    /// Center-size form `(ctr_y, ctr_x, height, width)`.
    pub fn center_size(&self) -> (f32, f32, f32, f32) {
        let (ctr_y, ctr_x) = self.center();
        (ctr_y, ctr_x, self.height(), self.width())
    }

    /// Whether the corner ordering invariant holds.
    pub fn is_well_formed(&self) -> bool {
        self.y2 >= self.y1 && self.x2 >= self.x1
    }

    /// Calculate intersection over union (IoU) with another box.
    ///
    /// The union denominator is epsilon-guarded, so two zero-area boxes
    /// produce 0 rather than NaN.
    pub fn iou(&self, other: &BBox) -> f32 {
        let y1 = self.y1.max(other.y1);
        let x1 = self.x1.max(other.x1);
        let y2 = self.y2.min(other.y2);
        let x2 = self.x2.min(other.x2);

        let intersection = (y2 - y1).max(0.0) * (x2 - x1).max(0.0);
        intersection / (self.area() + other.area() - intersection + EPS)
    }

    /// Check if this box overlaps with another beyond `threshold`.
    pub fn overlaps(&self, other: &BBox, threshold: f32) -> bool {
        self.iou(other) > threshold
    }

    /// Corner coordinates as a flat `[y1, x1, y2, x2]` array.
    pub fn to_array(&self) -> [f32; 4] {
        [self.y1, self.x1, self.y2, self.x2]
    }
}

/// A set of detection candidates: `(N, 4)` boxes with index-aligned scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Detections {
    boxes: Array2<f32>,
    scores: Array1<f32>,
}

impl Detections {
    /// Build a detection set, validating that boxes and scores line up.
    pub fn new(boxes: Array2<f32>, scores: Array1<f32>) -> Result<Self> {
        check_box_shape(boxes.view())?;
        if boxes.nrows() != scores.len() {
            return Err(Error::ScoreLengthMismatch {
                boxes: boxes.nrows(),
                scores: scores.len(),
            });
        }
        Ok(Self { boxes, scores })
    }

    /// An empty detection set.
    pub fn empty() -> Self {
        Self {
            boxes: Array2::zeros((0, 4)),
            scores: Array1::zeros(0),
        }
    }

    /// Build from `(box, score)` pairs.
    pub fn from_pairs(pairs: &[(BBox, f32)]) -> Self {
        let mut boxes = Array2::zeros((pairs.len(), 4));
        let mut scores = Array1::zeros(pairs.len());
        for (i, (bbox, score)) in pairs.iter().enumerate() {
            boxes.row_mut(i).assign(&ArrayView1::from(&bbox.to_array()));
            scores[i] = *score;
        }
        Self { boxes, scores }
    }

    /// Get number of detections.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Boxes as an `(N, 4)` view.
    pub fn boxes(&self) -> ArrayView2<f32> {
        self.boxes.view()
    }

    /// Scores as a length-N view.
    pub fn scores(&self) -> ArrayView1<f32> {
        self.scores.view()
    }

    /// Box and score at `index`.
    pub fn get(&self, index: usize) -> Option<(BBox, f32)> {
        (index < self.len()).then(|| (BBox::from_row(self.boxes.row(index)), self.scores[index]))
    }

    /// Iterate over `(box, score)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (BBox, f32)> + '_ {
        self.boxes
            .rows()
            .into_iter()
            .zip(self.scores.iter())
            .map(|(row, &score)| (BBox::from_row(row), score))
    }

    /// Copy out the rows named by `indices`, preserving their order.
    fn select(&self, indices: &[usize]) -> Self {
        Self {
            boxes: self.boxes.select(Axis(0), indices),
            scores: self.scores.select(Axis(0), indices),
        }
    }

    /// Drop every detection scoring below `threshold`.
    pub fn filter_by_score(&self, threshold: f32) -> Self {
        let kept: Vec<usize> = self
            .scores
            .iter()
            .enumerate()
            .filter_map(|(i, &score)| (score >= threshold).then_some(i))
            .collect();
        self.select(&kept)
    }

    /// Apply non-maximum suppression, returning the survivors ordered by
    /// descending score.
    pub fn apply_nms(&self, threshold: f32) -> Result<Self> {
        let keep = suppress(self.boxes.view(), self.scores.view(), threshold)?;
        Ok(self.select(&keep))
    }

    /// Full post-processing pass: score filter, suppression, truncation.
    pub fn postprocess(&self, config: &SuppressionConfig) -> Result<Self> {
        let mut kept = self
            .filter_by_score(config.score_threshold)
            .apply_nms(config.nms_threshold)?;

        if kept.len() > config.max_detections {
            kept = Self {
                boxes: kept.boxes.slice(s![..config.max_detections, ..]).to_owned(),
                scores: kept.scores.slice(s![..config.max_detections]).to_owned(),
            };
        }
        Ok(kept)
    }
}
