//! Curve sampling in clip-local time.
//!
//! Model:
//! - A curve's segments are scanned in order and the first one whose end point
//!   lies strictly after the query time is evaluated, so segment spans are
//!   half-open `(previous end, end]`.
//! - Past the last key the value is held, except on looping clips with seam
//!   correction enabled: between the last key and the loop end the curve
//!   travels back to its first value over a synthetic two-point segment.

use crate::data::{Curve, MotionClip, MotionPoint};

/// Seam correction parameters for looping playback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopSeam {
    /// Time at which the loop restarts (clip duration plus frame slack).
    pub end_time: f32,
}

/// Sample `curve` at clip-local `time`.
pub fn evaluate_curve(clip: &MotionClip, curve: &Curve, time: f32, seam: Option<LoopSeam>) -> f32 {
    let segments = clip.curve_segments(curve);
    let points = clip.points();

    if let Some(segment) = segments
        .iter()
        .find(|s| points[s.last_point_index()].time > time)
    {
        return segment.evaluator.evaluate(clip.segment_points(segment), time);
    }

    // Construction guarantees at least one segment per curve.
    let last = &segments[segments.len() - 1];
    let last_point = points[last.last_point_index()];

    match seam {
        Some(seam) if time < seam.end_time => {
            let first_value = points[segments[0].base_point_index].value;
            let window = [last_point, MotionPoint::new(seam.end_time, first_value)];
            last.evaluator.collapsed().evaluate(&window, time)
        }
        _ => last_point.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CurveTarget;
    use crate::raw::RawClip;

    fn clip() -> MotionClip {
        let mut raw = RawClip::new(2.0, 10.0, true);
        raw.curve(CurveTarget::Parameter, "P", 0.0, 0.0)
            .linear(1.0, 10.0)
            .linear(1.5, 4.0);
        raw.curve(CurveTarget::Parameter, "S", 0.0, 1.0)
            .stepped(1.0, 2.0)
            .inverse_stepped(1.5, 3.0);
        MotionClip::from_raw(raw).unwrap()
    }

    #[test]
    fn boundaries_are_half_open() {
        let clip = clip();
        let s = &clip.curves()[1];
        // At exactly t=1.0 the first segment no longer matches.
        assert_eq!(evaluate_curve(&clip, s, 0.999, None), 1.0);
        assert_eq!(evaluate_curve(&clip, s, 1.0, None), 3.0);
    }

    #[test]
    fn holds_last_value_without_seam() {
        let clip = clip();
        let p = &clip.curves()[0];
        assert_eq!(evaluate_curve(&clip, p, 1.75, None), 4.0);
        assert_eq!(evaluate_curve(&clip, p, 99.0, None), 4.0);
    }

    #[test]
    fn seam_returns_to_first_value() {
        let clip = clip();
        let p = &clip.curves()[0];
        let seam = Some(LoopSeam { end_time: 2.0 });
        // Halfway between (1.5, 4) and (2.0, 0).
        assert!((evaluate_curve(&clip, p, 1.75, seam) - 2.0).abs() < 1e-5);
        // At or after the seam end the last value is held.
        assert_eq!(evaluate_curve(&clip, p, 2.0, seam), 4.0);
    }

    #[test]
    fn seam_keeps_hold_kernels() {
        let clip = clip();
        let s = &clip.curves()[1];
        let seam = Some(LoopSeam { end_time: 2.0 });
        // Last segment is inverse stepped: snaps to the first value early.
        assert_eq!(evaluate_curve(&clip, s, 1.6, seam), 1.0);
    }
}
