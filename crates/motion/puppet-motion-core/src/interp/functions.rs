//! Interpolation kernels:
//! - linear_evaluate (2 points)
//! - bezier_evaluate (4 points, time parametrized by the chord; legacy)
//! - bezier_cardano_evaluate (4 points, time solved on the time cubic)
//! - stepped_evaluate / inverse_stepped_evaluate (2 points, hold)
//! - ease_sine (fade easing)
//!
//! Every kernel reads a point window that starts at the segment's first point.
//! They never fail; windows with non-increasing times are a loader bug.

use std::f32::consts::PI;

use crate::data::MotionPoint;

/// Coefficients below this are treated as zero when degrading the cubic.
const EPSILON: f32 = 1e-5;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_point(a: MotionPoint, b: MotionPoint, t: f32) -> MotionPoint {
    MotionPoint {
        time: lerp_f32(a.time, b.time, t),
        value: lerp_f32(a.value, b.value, t),
    }
}

/// Sine ease-in-out clamped to [0,1]: `(1 - cos(pi * x)) / 2`.
#[inline]
pub fn ease_sine(x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    0.5 - 0.5 * (x * PI).cos()
}

#[inline]
pub fn linear_evaluate(points: &[MotionPoint], time: f32) -> f32 {
    let (p0, p1) = (points[0], points[1]);
    let t = ((time - p0.time) / (p1.time - p0.time)).max(0.0);
    lerp_f32(p0.value, p1.value, t)
}

#[inline]
pub fn stepped_evaluate(points: &[MotionPoint], _time: f32) -> f32 {
    points[0].value
}

#[inline]
pub fn inverse_stepped_evaluate(points: &[MotionPoint], _time: f32) -> f32 {
    points[1].value
}

/// De Casteljau reduction of the four control points at parameter `t`.
#[inline]
fn de_casteljau(points: &[MotionPoint], t: f32) -> MotionPoint {
    let p01 = lerp_point(points[0], points[1], t);
    let p12 = lerp_point(points[1], points[2], t);
    let p23 = lerp_point(points[2], points[3], t);
    let p012 = lerp_point(p01, p12, t);
    let p123 = lerp_point(p12, p23, t);
    lerp_point(p012, p123, t)
}

/// Bezier with `t` taken from the chord `(time - p0) / (p3 - p0)`.
///
/// Exact only when the time axis is linear in `t`; kept for legacy assets.
pub fn bezier_evaluate(points: &[MotionPoint], time: f32) -> f32 {
    let t = ((time - points[0].time) / (points[3].time - points[0].time)).max(0.0);
    de_casteljau(points, t).value
}

/// Bezier with `t` solved from the time cubic, then applied to the value axis.
pub fn bezier_cardano_evaluate(points: &[MotionPoint], time: f32) -> f32 {
    let x1 = points[0].time;
    let x2 = points[3].time;
    let cx1 = points[1].time;
    let cx2 = points[2].time;

    let a = x2 - 3.0 * cx2 + 3.0 * cx1 - x1;
    let b = 3.0 * cx2 - 6.0 * cx1 + 3.0 * x1;
    let c = 3.0 * cx1 - 3.0 * x1;
    let d = x1 - time;

    let t = cardano_for_bezier(a, b, c, d);
    de_casteljau(points, t).value
}

/// Root of `b t^2 + c t + d` (or of the linear remainder) for a degenerate cubic.
fn quadratic_root(a: f32, b: f32, c: f32) -> f32 {
    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return -c;
        }
        return -c / b;
    }
    -(b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a)
}

/// Real root in [0,1] of `a t^3 + b t^2 + c t + d` by the closed-form method.
///
/// With three real roots the one nearest the middle of the unit interval is
/// taken, which is the parametric root for a monotonic time axis.
pub fn cardano_for_bezier(a: f32, b: f32, c: f32, d: f32) -> f32 {
    if a.abs() < EPSILON {
        return quadratic_root(b, c, d).clamp(0.0, 1.0);
    }

    let ba = b / a;
    let ca = c / a;
    let da = d / a;

    let p = (3.0 * ca - ba * ba) / 3.0;
    let p3 = p / 3.0;
    let q = (2.0 * ba * ba * ba - 9.0 * ba * ca + 27.0 * da) / 27.0;
    let q2 = q / 2.0;
    let discriminant = q2 * q2 + p3 * p3 * p3;

    let center = 0.5f32;
    let threshold = center + 0.01;
    let shift = ba / 3.0;

    if discriminant < 0.0 {
        // Three distinct real roots: trigonometric form.
        let mp3 = -p / 3.0;
        let r = (mp3 * mp3 * mp3).sqrt();
        let cos_phi = (-q / (2.0 * r)).clamp(-1.0, 1.0);
        let phi = cos_phi.acos();
        let t1 = 2.0 * r.cbrt();

        let root1 = t1 * (phi / 3.0).cos() - shift;
        if (root1 - center).abs() < threshold {
            return root1.clamp(0.0, 1.0);
        }
        let root2 = t1 * ((phi + 2.0 * PI) / 3.0).cos() - shift;
        if (root2 - center).abs() < threshold {
            return root2.clamp(0.0, 1.0);
        }
        let root3 = t1 * ((phi + 4.0 * PI) / 3.0).cos() - shift;
        return root3.clamp(0.0, 1.0);
    }

    if discriminant == 0.0 {
        // Repeated roots.
        let u1 = if q2 < 0.0 { (-q2).cbrt() } else { -q2.cbrt() };
        let root1 = 2.0 * u1 - shift;
        if (root1 - center).abs() < threshold {
            return root1.clamp(0.0, 1.0);
        }
        let root2 = -u1 - shift;
        return root2.clamp(0.0, 1.0);
    }

    let sd = discriminant.sqrt();
    let u1 = (sd - q2).cbrt();
    let v1 = (sd + q2).cbrt();
    (u1 - v1 - shift).clamp(0.0, 1.0)
}
