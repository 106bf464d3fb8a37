//! Validated motion clip data model.
//!
//! A [`MotionClip`] is only produced by [`MotionClip::from_raw`](crate::raw),
//! so every clip in circulation satisfies the layout invariants checked there:
//! segment kinds are known, point and segment ranges are in bounds, and each
//! segment's end point is strictly later than its start point.

use serde::{Deserialize, Serialize};

use crate::ids::ParamId;
use crate::interp::{BezierEvaluation, CurveEvaluator};

/// Reserved model-level curve ids.
pub const EYE_BLINK_ID: &str = "EyeBlink";
pub const LIP_SYNC_ID: &str = "LipSync";
pub const OPACITY_ID: &str = "Opacity";

/// One keyframe or bezier handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionPoint {
    pub time: f32,
    pub value: f32,
}

impl MotionPoint {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Interpolation family of a segment, with the asset's numeric codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Linear,
    Bezier,
    Stepped,
    InverseStepped,
}

impl SegmentKind {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Linear),
            1 => Some(Self::Bezier),
            2 => Some(Self::Stepped),
            3 => Some(Self::InverseStepped),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Linear => 0,
            Self::Bezier => 1,
            Self::Stepped => 2,
            Self::InverseStepped => 3,
        }
    }

    /// Points read by the kernel, including the shared start point.
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            Self::Bezier => 4,
            _ => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub base_point_index: usize,
    pub evaluator: CurveEvaluator,
}

impl Segment {
    /// Index of the segment's end point in the clip point table.
    #[inline]
    pub fn last_point_index(&self) -> usize {
        self.base_point_index + self.kind.point_count() - 1
    }
}

/// What a curve writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveTarget {
    Model,
    Parameter,
    PartOpacity,
}

/// Meaning of a reserved `Model` curve id, resolved when the clip is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelEffect {
    EyeBlink,
    LipSync,
    Opacity,
}

impl ModelEffect {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            EYE_BLINK_ID => Some(Self::EyeBlink),
            LIP_SYNC_ID => Some(Self::LipSync),
            OPACITY_ID => Some(Self::Opacity),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub target: CurveTarget,
    pub id: ParamId,
    /// Set only for `Model` curves with a reserved id.
    pub effect: Option<ModelEffect>,
    pub base_segment_index: usize,
    pub segment_count: usize,
    /// Per-curve fade-in in seconds; negative when unset.
    pub fade_in_time: f32,
    /// Per-curve fade-out in seconds; negative when unset.
    pub fade_out_time: f32,
}

impl Curve {
    #[inline]
    pub fn has_own_fade(&self) -> bool {
        self.fade_in_time >= 0.0 || self.fade_out_time >= 0.0
    }
}

/// A user data event placed on the clip timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub fire_time: f32,
    pub value: String,
}

/// Immutable, validated motion asset. Share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionClip {
    pub(crate) duration: f32,
    pub(crate) looping: bool,
    pub(crate) fps: f32,
    pub(crate) bezier: BezierEvaluation,
    pub(crate) curves: Vec<Curve>,
    pub(crate) segments: Vec<Segment>,
    pub(crate) points: Vec<MotionPoint>,
    pub(crate) events: Vec<UserEvent>,
}

impl MotionClip {
    /// Clip length in seconds; negative means indeterminate.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Whether the asset itself asks to loop.
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn bezier_evaluation(&self) -> BezierEvaluation {
        self.bezier
    }

    #[inline]
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn points(&self) -> &[MotionPoint] {
        &self.points
    }

    #[inline]
    pub fn events(&self) -> &[UserEvent] {
        &self.events
    }

    /// Segments belonging to `curve`, in time order.
    #[inline]
    pub fn curve_segments(&self, curve: &Curve) -> &[Segment] {
        &self.segments[curve.base_segment_index..curve.base_segment_index + curve.segment_count]
    }

    /// Point window read by `segment`'s kernel.
    #[inline]
    pub fn segment_points(&self, segment: &Segment) -> &[MotionPoint] {
        &self.points[segment.base_point_index..=segment.last_point_index()]
    }

    pub fn find_curve(&self, target: CurveTarget, id: &str) -> Option<&Curve> {
        self.curves
            .iter()
            .find(|c| c.target == target && c.id.as_str() == id)
    }

    /// Events whose fire time lies in `(before, now]` of clip-local time.
    pub fn fired_events(&self, before: f32, now: f32) -> impl Iterator<Item = &UserEvent> {
        self.events
            .iter()
            .filter(move |e| e.fire_time > before && e.fire_time <= now)
    }
}
