use glam::{DVec2, DVec3, Vec2, Vec3};

use crate::{
    bezier::bernstein::{BernsteinBasis, FACTORIAL_TABLE_LEN},
    foundation::error::{FlightError, FlightResult},
};

/// When the running parameter gets this close to 1 it is snapped to exactly 1.
const T_SNAP_EPSILON: f64 = 5e-6;

/// A point type the curve evaluator can weight and sum.
///
/// Accumulation always happens in f64; the result is narrowed once per sample.
pub trait CurvePoint: Copy {
    /// Wide accumulator type.
    type Acc: Copy;

    /// Zero accumulator.
    fn zero() -> Self::Acc;

    /// `acc + self * weight`.
    fn accumulate(self, acc: Self::Acc, weight: f64) -> Self::Acc;

    /// Narrow an accumulator back to the point type.
    fn finish(acc: Self::Acc) -> Self;

    /// Linear interpolation between two points.
    fn lerp_points(a: Self, b: Self, t: f32) -> Self;
}

impl CurvePoint for Vec2 {
    type Acc = DVec2;

    fn zero() -> DVec2 {
        DVec2::ZERO
    }

    fn accumulate(self, acc: DVec2, weight: f64) -> DVec2 {
        acc + self.as_dvec2() * weight
    }

    fn finish(acc: DVec2) -> Self {
        acc.as_vec2()
    }

    fn lerp_points(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl CurvePoint for Vec3 {
    type Acc = DVec3;

    fn zero() -> DVec3 {
        DVec3::ZERO
    }

    fn accumulate(self, acc: DVec3, weight: f64) -> DVec3 {
        acc + self.as_dvec3() * weight
    }

    fn finish(acc: DVec3) -> Self {
        acc.as_vec3()
    }

    fn lerp_points(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

/// Single-segment Bezier evaluator of arbitrary degree.
///
/// The degree is `control_points.len() - 1`, so at most [`FACTORIAL_TABLE_LEN`] control points
/// are supported.
#[derive(Clone, Debug, Default)]
pub struct BezierCurve {
    basis: BernsteinBasis,
}

impl BezierCurve {
    /// Create an evaluator with a freshly built factorial table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared Bernstein basis.
    pub fn basis(&self) -> &BernsteinBasis {
        &self.basis
    }

    /// Maximum number of control points a single curve may have.
    pub fn factorial_max(&self) -> usize {
        self.basis.factorial_max()
    }

    /// Sample a 2D curve at `sample_count` uniformly spaced parameters in `[0, 1]`.
    pub fn evaluate_2d(&self, control_points: &[Vec2], sample_count: usize) -> FlightResult<Vec<Vec2>> {
        self.evaluate(control_points, sample_count)
    }

    /// Sample a 3D curve at `sample_count` uniformly spaced parameters in `[0, 1]`.
    pub fn evaluate_3d(&self, control_points: &[Vec3], sample_count: usize) -> FlightResult<Vec<Vec3>> {
        self.evaluate(control_points, sample_count)
    }

    /// Generic evaluation shared by the 2D and 3D entry points.
    ///
    /// The first sample sits at `t = 0` and equals the first control point; the last sits at
    /// exactly `t = 1` and equals the last control point.
    #[tracing::instrument(level = "debug", skip(self, control_points), fields(points = control_points.len()))]
    pub fn evaluate<P: CurvePoint>(
        &self,
        control_points: &[P],
        sample_count: usize,
    ) -> FlightResult<Vec<P>> {
        if sample_count < 2 {
            return Err(FlightError::invalid_argument(format!(
                "curve evaluation needs at least 2 samples, got {sample_count}"
            )));
        }
        if control_points.is_empty() {
            return Err(FlightError::invalid_argument(
                "curve evaluation needs at least one control point",
            ));
        }
        if control_points.len() > FACTORIAL_TABLE_LEN {
            return Err(FlightError::domain(format!(
                "{} control points exceed the supported maximum of {FACTORIAL_TABLE_LEN}",
                control_points.len()
            )));
        }

        let degree = (control_points.len() - 1) as i32;
        let step = 1.0 / (sample_count - 1) as f64;
        let last = sample_count - 1;

        let mut out = Vec::with_capacity(sample_count);
        for s in 0..sample_count {
            let mut t = s as f64 * step;
            if s == last || (1.0 - t) < T_SNAP_EPSILON {
                t = 1.0;
            }

            let mut acc = P::zero();
            for (i, &p) in control_points.iter().enumerate() {
                let w = self.basis.bernstein(degree, i as i32, t)?;
                acc = p.accumulate(acc, w);
            }
            out.push(P::finish(acc));
        }
        Ok(out)
    }
}

/// Piecewise-linear densification of a polyline.
///
/// Emits the first point, then `steps_between - 1` interior points per segment at ratios
/// `j / steps_between`. Segment end points other than the very first are not emitted.
pub fn interpolate_between_points<P: CurvePoint>(points: &[P], steps_between: usize) -> Vec<P> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(1 + points.len().saturating_sub(1) * steps_between.saturating_sub(1));
    out.push(first);
    for pair in points.windows(2) {
        for j in 1..steps_between {
            let ratio = j as f64 / steps_between as f64;
            out.push(P::lerp_points(pair[0], pair[1], ratio as f32));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/bezier/curve.rs"]
mod tests;
