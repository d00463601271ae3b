//! Geometric primitives for anchor-based object detection.
//!
//! Pure, stateless numerical routines over dense arrays of axis-aligned
//! boxes: pairwise IoU matrices, anchor offset encoding/decoding, and greedy
//! non-maximum suppression. Boxes are `(y1, x1, y2, x2)` corner-form rows of
//! `(N, 4)` `f32` arrays; every routine reads its inputs through views and
//! returns a fresh allocation.

pub mod bbox;
pub mod coder;
pub mod error;
pub mod nms;
pub mod overlap;

// Re-export commonly used types
pub use bbox::{BBox, Detections};
pub use coder::{decode_offsets, encode_offsets};
pub use error::{Error, Result};
pub use nms::{SuppressionConfig, suppress};
pub use overlap::{EPS, overlap_matrix};
