//! Anchor offset encoding and decoding.
//!
//! Targets are expressed relative to reference anchors as `(dy, dx, dh, dw)`
//! rows: center displacements scaled by the anchor dimensions, and log-space
//! ratios for height and width.

use crate::error::{Error, Result};
use crate::overlap::{EPS, check_box_shape};
use ndarray::{Array1, Array2, ArrayView2, Axis, stack};

/// Corner-form columns to center-size form: `(heights, widths, ctr_y, ctr_x)`.
fn center_size(boxes: ArrayView2<f32>) -> (Array1<f32>, Array1<f32>, Array1<f32>, Array1<f32>) {
    let heights = &boxes.column(2) - &boxes.column(0);
    let widths = &boxes.column(3) - &boxes.column(1);
    let ctr_y = &boxes.column(0) + &heights / 2.0;
    let ctr_x = &boxes.column(1) + &widths / 2.0;
    (heights, widths, ctr_y, ctr_x)
}

/// Encode `targets` relative to `anchors` as `(dy, dx, dh, dw)` rows.
///
/// Both inputs must be `(N, 4)` with the same N. Anchor heights and widths
/// are clamped to at least [`EPS`] before they are used as divisors, so a
/// degenerate anchor cannot divide by zero. Target dimensions are
/// deliberately left unclamped: a non-positive target height or width makes
/// the log-space terms `-inf`/`NaN`, and sanitizing targets is the caller's
/// responsibility.
pub fn encode_offsets(anchors: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array2<f32>> {
    check_box_shape(anchors)?;
    check_box_shape(targets)?;
    if anchors.nrows() != targets.nrows() {
        return Err(Error::LengthMismatch {
            anchors: anchors.nrows(),
            targets: targets.nrows(),
        });
    }

    let (heights, widths, ctr_y, ctr_x) = center_size(anchors);
    let (t_heights, t_widths, t_ctr_y, t_ctr_x) = center_size(targets);

    // Centers stay derived from the raw dimensions; only the divisors get
    // the epsilon floor.
    let heights = heights.mapv(|v| v.max(EPS));
    let widths = widths.mapv(|v| v.max(EPS));

    let dy = (t_ctr_y - ctr_y) / &heights;
    let dx = (t_ctr_x - ctr_x) / &widths;
    let dh = (t_heights / heights).mapv(f32::ln);
    let dw = (t_widths / widths).mapv(f32::ln);

    Ok(stack![Axis(1), dy, dx, dh, dw])
}

/// Decode `(dy, dx, dh, dw)` rows back into corner-form boxes.
///
/// Inverse of [`encode_offsets`]. The anchor dimension clamp is applied on
/// this side as well, so the pair stays an exact round trip even when the
/// clamp engages for sub-epsilon anchors.
pub fn decode_offsets(anchors: ArrayView2<f32>, offsets: ArrayView2<f32>) -> Result<Array2<f32>> {
    check_box_shape(anchors)?;
    check_box_shape(offsets)?;
    if anchors.nrows() != offsets.nrows() {
        return Err(Error::LengthMismatch {
            anchors: anchors.nrows(),
            targets: offsets.nrows(),
        });
    }

    let (heights, widths, ctr_y, ctr_x) = center_size(anchors);
    let heights = heights.mapv(|v| v.max(EPS));
    let widths = widths.mapv(|v| v.max(EPS));

    let dy = offsets.column(0);
    let dx = offsets.column(1);
    let dh = offsets.column(2);
    let dw = offsets.column(3);

    let pred_heights = dh.mapv(f32::exp) * &heights;
    let pred_widths = dw.mapv(f32::exp) * &widths;
    let pred_ctr_y = &dy * &heights + ctr_y;
    let pred_ctr_x = &dx * &widths + ctr_x;

    let half_h = pred_heights / 2.0;
    let half_w = pred_widths / 2.0;

    let y1 = &pred_ctr_y - &half_h;
    let x1 = &pred_ctr_x - &half_w;
    let y2 = &pred_ctr_y + &half_h;
    let x2 = &pred_ctr_x + &half_w;

    Ok(stack![Axis(1), y1, x1, y2, x2])
}
