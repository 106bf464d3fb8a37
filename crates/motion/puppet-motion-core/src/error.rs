//! Error types for clip construction and entry state changes.

use thiserror::Error;

/// Failures while building a [`MotionClip`](crate::data::MotionClip).
///
/// Construction is all-or-nothing: a clip that fails any of these checks is
/// never handed out.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MotionError {
    #[error("segment {segment}: unknown segment type code {code} (expected 0..=3)")]
    InvalidSegmentCode { segment: usize, code: i32 },

    #[error("segment {segment}: points {start}..{end} exceed point table of length {len}")]
    PointRangeOutOfBounds {
        segment: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("segment {segment}: point times must be strictly increasing (at point {point})")]
    NonIncreasingTime { segment: usize, point: usize },

    #[error("curve '{curve}': segments {start}..{end} exceed segment table of length {len}")]
    SegmentRangeOutOfBounds {
        curve: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("curve '{curve}' has no segments")]
    EmptyCurve { curve: String },

    #[error("curve '{curve}': segment {segment} does not start where the previous one ended")]
    DetachedSegment { curve: String, segment: usize },

    #[error("clip needs a positive, finite fps, got {fps}")]
    InvalidFps { fps: f32 },
}

/// A state change a lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid state transition {from} -> {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}
