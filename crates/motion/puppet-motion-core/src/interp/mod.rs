//! Segment evaluators.
//!
//! A [`CurveEvaluator`] is chosen per segment when the clip is built and is
//! dispatched with a plain `match` in the hot path.

pub mod functions;

use serde::{Deserialize, Serialize};

use crate::data::{MotionPoint, SegmentKind};
use functions::{
    bezier_cardano_evaluate, bezier_evaluate, inverse_stepped_evaluate, linear_evaluate,
    stepped_evaluate,
};

/// How bezier segments map query time to the curve parameter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BezierEvaluation {
    /// Solve the time cubic for `t` (closed form).
    #[default]
    Cardano,
    /// Take `t` from the segment chord. Legacy assets only.
    DeCasteljau,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveEvaluator {
    Linear,
    Bezier,
    BezierCardano,
    Stepped,
    InverseStepped,
}

impl CurveEvaluator {
    pub fn for_segment(kind: SegmentKind, bezier: BezierEvaluation) -> Self {
        match kind {
            SegmentKind::Linear => Self::Linear,
            SegmentKind::Bezier => match bezier {
                BezierEvaluation::Cardano => Self::BezierCardano,
                BezierEvaluation::DeCasteljau => Self::Bezier,
            },
            SegmentKind::Stepped => Self::Stepped,
            SegmentKind::InverseStepped => Self::InverseStepped,
        }
    }

    /// Evaluate on a window starting at the segment's first point.
    #[inline]
    pub fn evaluate(self, points: &[MotionPoint], time: f32) -> f32 {
        match self {
            Self::Linear => linear_evaluate(points, time),
            Self::Bezier => bezier_evaluate(points, time),
            Self::BezierCardano => bezier_cardano_evaluate(points, time),
            Self::Stepped => stepped_evaluate(points, time),
            Self::InverseStepped => inverse_stepped_evaluate(points, time),
        }
    }

    /// The 2-point kernel used for the synthetic loop-seam segment.
    #[inline]
    pub fn collapsed(self) -> Self {
        match self {
            Self::Linear | Self::Bezier | Self::BezierCardano => Self::Linear,
            Self::Stepped => Self::Stepped,
            Self::InverseStepped => Self::InverseStepped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_flavour_follows_clip_setting() {
        assert_eq!(
            CurveEvaluator::for_segment(SegmentKind::Bezier, BezierEvaluation::Cardano),
            CurveEvaluator::BezierCardano
        );
        assert_eq!(
            CurveEvaluator::for_segment(SegmentKind::Bezier, BezierEvaluation::DeCasteljau),
            CurveEvaluator::Bezier
        );
        assert_eq!(
            CurveEvaluator::for_segment(SegmentKind::Stepped, BezierEvaluation::DeCasteljau),
            CurveEvaluator::Stepped
        );
    }

    #[test]
    fn collapse_keeps_hold_kernels() {
        assert_eq!(CurveEvaluator::BezierCardano.collapsed(), CurveEvaluator::Linear);
        assert_eq!(CurveEvaluator::Bezier.collapsed(), CurveEvaluator::Linear);
        assert_eq!(CurveEvaluator::Stepped.collapsed(), CurveEvaluator::Stepped);
        assert_eq!(
            CurveEvaluator::InverseStepped.collapsed(),
            CurveEvaluator::InverseStepped
        );
    }
}
