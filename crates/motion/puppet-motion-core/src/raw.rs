//! Decoded-but-unchecked clip tables and their validation into [`MotionClip`].
//!
//! An asset loader decodes its source format into a [`RawClip`] (flat point,
//! segment and curve tables with numeric segment codes) and hands it to
//! [`MotionClip::from_raw`]. Code that authors clips directly can use
//! [`RawClip::curve`] to append keyframes without computing indices by hand.
//!
//! Notes:
//! - Segment codes: 0 linear, 1 bezier, 2 stepped, 3 inverse stepped.
//! - Segments of a curve are contiguous and each one starts on the previous
//!   one's end point.
//! - Reserved `Model` ids (`EyeBlink`, `LipSync`, `Opacity`) are resolved here.

use serde::{Deserialize, Serialize};

use crate::data::{Curve, CurveTarget, ModelEffect, MotionClip, MotionPoint, Segment, SegmentKind, UserEvent};
use crate::error::MotionError;
use crate::ids::ParamId;
use crate::interp::{BezierEvaluation, CurveEvaluator};

const UNSET_FADE: f32 = -1.0;
const DEFAULT_FPS: f32 = 30.0;

fn unset_fade() -> f32 {
    UNSET_FADE
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub code: i32,
    #[serde(rename = "basePointIndex")]
    pub base_point_index: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCurve {
    pub target: CurveTarget,
    pub id: String,
    #[serde(rename = "baseSegmentIndex")]
    pub base_segment_index: usize,
    #[serde(rename = "segmentCount")]
    pub segment_count: usize,
    #[serde(rename = "fadeInTime", default = "unset_fade")]
    pub fade_in_time: f32,
    #[serde(rename = "fadeOutTime", default = "unset_fade")]
    pub fade_out_time: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawClip {
    /// Seconds; negative for indeterminate length.
    pub duration: f32,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default)]
    pub bezier: BezierEvaluation,
    #[serde(default)]
    pub curves: Vec<RawCurve>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
    #[serde(default)]
    pub points: Vec<MotionPoint>,
    #[serde(default)]
    pub events: Vec<UserEvent>,
}

impl RawClip {
    pub fn new(duration: f32, fps: f32, looping: bool) -> Self {
        Self {
            duration,
            looping,
            fps,
            bezier: BezierEvaluation::default(),
            curves: Vec::new(),
            segments: Vec::new(),
            points: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_bezier(mut self, bezier: BezierEvaluation) -> Self {
        self.bezier = bezier;
        self
    }

    pub fn event(&mut self, fire_time: f32, value: &str) -> &mut Self {
        self.events.push(UserEvent {
            fire_time,
            value: value.to_string(),
        });
        self
    }

    /// Start a new curve at `(time, value)`; segments are appended through the builder.
    pub fn curve(&mut self, target: CurveTarget, id: &str, time: f32, value: f32) -> CurveBuilder<'_> {
        self.points.push(MotionPoint::new(time, value));
        self.curves.push(RawCurve {
            target,
            id: id.to_string(),
            base_segment_index: self.segments.len(),
            segment_count: 0,
            fade_in_time: UNSET_FADE,
            fade_out_time: UNSET_FADE,
        });
        let curve = self.curves.len() - 1;
        CurveBuilder { clip: self, curve }
    }
}

/// Appends segments to the most recently started curve of a [`RawClip`].
pub struct CurveBuilder<'a> {
    clip: &'a mut RawClip,
    curve: usize,
}

impl CurveBuilder<'_> {
    fn push(self, kind: SegmentKind, points: &[MotionPoint]) -> Self {
        let base_point_index = self.clip.points.len() - 1;
        self.clip.points.extend_from_slice(points);
        self.clip.segments.push(RawSegment {
            code: kind.code(),
            base_point_index,
        });
        self.clip.curves[self.curve].segment_count += 1;
        self
    }

    pub fn linear(self, time: f32, value: f32) -> Self {
        self.push(SegmentKind::Linear, &[MotionPoint::new(time, value)])
    }

    pub fn bezier(self, c1: (f32, f32), c2: (f32, f32), end: (f32, f32)) -> Self {
        self.push(
            SegmentKind::Bezier,
            &[
                MotionPoint::new(c1.0, c1.1),
                MotionPoint::new(c2.0, c2.1),
                MotionPoint::new(end.0, end.1),
            ],
        )
    }

    pub fn stepped(self, time: f32, value: f32) -> Self {
        self.push(SegmentKind::Stepped, &[MotionPoint::new(time, value)])
    }

    pub fn inverse_stepped(self, time: f32, value: f32) -> Self {
        self.push(SegmentKind::InverseStepped, &[MotionPoint::new(time, value)])
    }

    /// Per-curve fade times in seconds (negative leaves a side unset).
    pub fn fades(self, fade_in: f32, fade_out: f32) -> Self {
        let curve = &mut self.clip.curves[self.curve];
        curve.fade_in_time = fade_in;
        curve.fade_out_time = fade_out;
        self
    }
}

impl MotionClip {
    /// Validate raw tables and build an immutable clip.
    pub fn from_raw(raw: RawClip) -> Result<MotionClip, MotionError> {
        // Any clip may be looped through its playback config, so fps always matters.
        if !(raw.fps > 0.0 && raw.fps.is_finite()) {
            return Err(MotionError::InvalidFps { fps: raw.fps });
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(raw.segments.len());
        for (index, rs) in raw.segments.iter().enumerate() {
            let kind = SegmentKind::from_code(rs.code).ok_or(MotionError::InvalidSegmentCode {
                segment: index,
                code: rs.code,
            })?;
            let start = rs.base_point_index;
            let end = match start.checked_add(kind.point_count()) {
                Some(end) if end <= raw.points.len() => end,
                end => {
                    return Err(MotionError::PointRangeOutOfBounds {
                        segment: index,
                        start,
                        end: end.unwrap_or(usize::MAX),
                        len: raw.points.len(),
                    })
                }
            };
            let window = &raw.points[start..end];
            // Handles may sit on their key's time; the key times themselves must advance.
            for (offset, pair) in window.windows(2).enumerate() {
                if pair[1].time < pair[0].time {
                    return Err(MotionError::NonIncreasingTime {
                        segment: index,
                        point: start + offset + 1,
                    });
                }
            }
            if window[window.len() - 1].time <= window[0].time {
                return Err(MotionError::NonIncreasingTime {
                    segment: index,
                    point: end - 1,
                });
            }
            segments.push(Segment {
                kind,
                base_point_index: start,
                evaluator: CurveEvaluator::for_segment(kind, raw.bezier),
            });
        }

        let mut curves: Vec<Curve> = Vec::with_capacity(raw.curves.len());
        for rc in raw.curves {
            if rc.segment_count == 0 {
                return Err(MotionError::EmptyCurve { curve: rc.id });
            }
            let start = rc.base_segment_index;
            let end = match start.checked_add(rc.segment_count) {
                Some(end) if end <= segments.len() => end,
                end => {
                    return Err(MotionError::SegmentRangeOutOfBounds {
                        curve: rc.id,
                        start,
                        end: end.unwrap_or(usize::MAX),
                        len: segments.len(),
                    })
                }
            };
            for index in start + 1..end {
                if segments[index].base_point_index != segments[index - 1].last_point_index() {
                    return Err(MotionError::DetachedSegment {
                        curve: rc.id,
                        segment: index,
                    });
                }
            }
            let effect = match rc.target {
                CurveTarget::Model => ModelEffect::from_id(&rc.id),
                _ => None,
            };
            curves.push(Curve {
                target: rc.target,
                id: ParamId::from(rc.id),
                effect,
                base_segment_index: start,
                segment_count: rc.segment_count,
                fade_in_time: rc.fade_in_time,
                fade_out_time: rc.fade_out_time,
            });
        }

        Ok(MotionClip {
            duration: raw.duration,
            looping: raw.looping,
            fps: raw.fps,
            bezier: raw.bezier,
            curves,
            segments,
            points: raw.points,
            events: raw.events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> RawClip {
        let mut raw = RawClip::new(2.0, 30.0, false);
        raw.curve(CurveTarget::Parameter, "ParamAngleX", 0.0, 0.0)
            .linear(1.0, 10.0)
            .bezier((1.3, 10.0), (1.6, 0.0), (2.0, 0.0));
        raw.curve(CurveTarget::Model, "EyeBlink", 0.0, 1.0)
            .stepped(2.0, 0.0);
        raw
    }

    #[test]
    fn builder_lays_out_shared_points() {
        let raw = simple();
        assert_eq!(raw.points.len(), 7);
        assert_eq!(raw.segments[0].base_point_index, 0);
        assert_eq!(raw.segments[1].base_point_index, 1);
        assert_eq!(raw.segments[2].base_point_index, 5);
        assert_eq!(raw.curves[1].base_segment_index, 2);

        let clip = MotionClip::from_raw(raw).unwrap();
        assert_eq!(clip.curves().len(), 2);
        assert_eq!(clip.curves()[1].effect, Some(ModelEffect::EyeBlink));
        assert_eq!(clip.curves()[0].effect, None);
        assert_eq!(clip.segments()[1].evaluator, CurveEvaluator::BezierCardano);
    }

    #[test]
    fn rejects_unknown_segment_code() {
        let mut raw = simple();
        raw.segments[1].code = 7;
        assert_eq!(
            MotionClip::from_raw(raw),
            Err(MotionError::InvalidSegmentCode { segment: 1, code: 7 })
        );
    }

    #[test]
    fn rejects_backwards_time() {
        let mut raw = simple();
        raw.points[1].time = 0.0;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::NonIncreasingTime { segment: 0, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_tables() {
        let mut raw = simple();
        raw.segments[2].base_point_index = 6;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::PointRangeOutOfBounds { segment: 2, .. })
        ));

        let mut raw = simple();
        raw.curves[1].segment_count = 4;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::SegmentRangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_detached_curves() {
        let mut raw = simple();
        raw.curves[1].segment_count = 0;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::EmptyCurve { .. })
        ));

        let mut raw = simple();
        raw.segments[1].base_point_index = 0;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::DetachedSegment { segment: 1, .. })
        ));
    }

    #[test]
    fn one_shot_clip_needs_fps_too() {
        for fps in [-1.0, 0.0, f32::INFINITY, f32::NAN] {
            let mut raw = simple();
            raw.fps = fps;
            assert!(matches!(
                MotionClip::from_raw(raw),
                Err(MotionError::InvalidFps { .. })
            ));
        }
    }

    #[test]
    fn overflowing_indices_are_errors() {
        let mut raw = simple();
        raw.segments[0].base_point_index = usize::MAX;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::PointRangeOutOfBounds { segment: 0, .. })
        ));

        let mut raw = simple();
        raw.curves[0].base_segment_index = usize::MAX;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::SegmentRangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn looping_clip_needs_fps() {
        let mut raw = simple();
        raw.looping = true;
        raw.fps = 0.0;
        assert!(matches!(
            MotionClip::from_raw(raw),
            Err(MotionError::InvalidFps { .. })
        ));
    }

    #[test]
    fn legacy_bezier_flag_selects_chord_kernel() {
        let raw = simple().with_bezier(BezierEvaluation::DeCasteljau);
        let clip = MotionClip::from_raw(raw).unwrap();
        assert_eq!(clip.segments()[1].evaluator, CurveEvaluator::Bezier);
    }
}
