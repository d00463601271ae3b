//! Pairwise box overlap (IoU) computation.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Epsilon guard used throughout the crate.
///
/// Fixed at the `f32` machine epsilon so that union denominators stay
/// strictly positive even when both boxes have zero area.
pub const EPS: f32 = f32::EPSILON;

/// Validate that a box array has four columns.
pub(crate) fn check_box_shape(boxes: ArrayView2<f32>) -> Result<()> {
    if boxes.ncols() != 4 {
        return Err(Error::InvalidBoxShape {
            rows: boxes.nrows(),
            cols: boxes.ncols(),
        });
    }
    Ok(())
}

/// Compute the `(M, N)` IoU matrix between two box sets.
///
/// Rows correspond to `anchors`, columns to `targets`; boxes are
/// `(y1, x1, y2, x2)` corner-form rows. Entries are always finite and lie in
/// `[0, 1]` up to epsilon slack: the intersection is clamped at zero and the
/// union denominator carries [`EPS`], so zero-area boxes produce zero
/// overlap rather than a division by zero. Empty inputs yield an empty
/// matrix of the matching shape.
///
/// With the `parallel` feature the rows are filled on the rayon pool; each
/// row is computed with whole-array arithmetic across the target set either
/// way.
pub fn overlap_matrix(anchors: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array2<f32>> {
    check_box_shape(anchors)?;
    check_box_shape(targets)?;

    let mut overlaps = Array2::zeros((anchors.nrows(), targets.nrows()));

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let rows: Vec<Array1<f32>> = (0..anchors.nrows())
            .into_par_iter()
            .map(|i| overlap_row(anchors.row(i), targets))
            .collect();
        for (mut out, row) in overlaps.rows_mut().into_iter().zip(rows) {
            out.assign(&row);
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, anchor) in anchors.rows().into_iter().enumerate() {
            overlaps.row_mut(i).assign(&overlap_row(anchor, targets));
        }
    }

    Ok(overlaps)
}

/// One row of the IoU matrix: a single anchor against every target.
fn overlap_row(anchor: ArrayView1<f32>, targets: ArrayView2<f32>) -> Array1<f32> {
    let y1 = targets.column(0).mapv(|v| v.max(anchor[0]));
    let x1 = targets.column(1).mapv(|v| v.max(anchor[1]));
    let y2 = targets.column(2).mapv(|v| v.min(anchor[2]));
    let x2 = targets.column(3).mapv(|v| v.min(anchor[3]));

    let heights = (y2 - y1).mapv(|v| v.max(0.0));
    let widths = (x2 - x1).mapv(|v| v.max(0.0));
    let intersection = heights * widths;

    let anchor_area = (anchor[2] - anchor[0]) * (anchor[3] - anchor[1]);
    let target_areas =
        (&targets.column(2) - &targets.column(0)) * (&targets.column(3) - &targets.column(1));

    let union = target_areas + anchor_area - &intersection + EPS;
    intersection / union
}
