//! See [`Error`].

use thiserror::Error;

/// Error types for this crate.
///
/// All variants are shape violations; degenerate geometry and non-finite
/// coordinates are never errors and propagate through the numeric routines
/// instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("expected a box array of shape (N, 4), got ({rows}, {cols})")]
    InvalidBoxShape { rows: usize, cols: usize },

    #[error("anchor and target sets must be index-aligned ({anchors} anchors, {targets} targets)")]
    LengthMismatch { anchors: usize, targets: usize },

    #[error("boxes and scores must be index-aligned ({boxes} boxes, {scores} scores)")]
    ScoreLengthMismatch { boxes: usize, scores: usize },
}

/// Type alias for [`Result<T, Error>`].
pub type Result<T> = std::result::Result<T, Error>;
