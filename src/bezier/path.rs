use glam::Vec3;
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{
    bezier::{bernstein::FACTORIAL_TABLE_LEN, curve::BezierCurve},
    foundation::{
        error::{FlightError, FlightResult},
        math::mix_seed,
    },
};

/// Fixed anchors every generated loop starts with.
pub const ANCHORS: [Vec3; 3] = [
    Vec3::new(-100.0, 100.0, -100.0),
    Vec3::new(-150.0, 0.0, -150.0),
    Vec3::new(0.0, 0.0, 0.0),
];

/// Upper bound on resampling attempts for a single procedural point.
const MAX_ATTEMPTS_PER_POINT: u32 = 100_000;

/// Parameters for [`generate_loop`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopSpec {
    /// Side length of the square x/z footprint, centered on the origin.
    pub bounding_size: f32,
    /// Number of procedural points placed after the anchors.
    pub point_count: usize,
    /// Minimum distance between a procedural point and its immediate predecessor.
    pub min_separation: f32,
    /// Inclusive height range for procedural points.
    pub height_range: (f32, f32),
    /// Seed for the candidate generator.
    pub seed: u64,
}

/// Closed, ordered control-point sequence (`first == last`).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ControlPointLoop {
    points: Vec<Vec3>,
}

impl ControlPointLoop {
    /// Close `points` by appending its first element. Needs at least one point.
    pub fn closed(mut points: Vec<Vec3>) -> FlightResult<Self> {
        let Some(&first) = points.first() else {
            return Err(FlightError::invalid_argument(
                "a control loop needs at least one point",
            ));
        };
        points.push(first);
        Ok(Self { points })
    }

    /// All points, including the closing duplicate.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of points, including the closing duplicate.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a loop holds at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Densify the loop into a trajectory of `sample_count` points.
    pub fn smooth(&self, curve: &BezierCurve, sample_count: usize) -> FlightResult<Vec<Vec3>> {
        curve.evaluate_3d(&self.points, sample_count)
    }
}

/// Generate a closed waypoint loop: [`ANCHORS`], then `point_count` procedural points, then the
/// first anchor again.
///
/// Procedural x/z are drawn uniformly in `[-bounding_size/2, bounding_size/2)`, y in
/// `height_range`. A candidate closer than `min_separation` to the point placed right before it
/// has its x/z (not y) redrawn with the next nonce. Only the immediate predecessor is checked.
#[tracing::instrument(level = "debug")]
pub fn generate_loop(spec: &LoopSpec) -> FlightResult<ControlPointLoop> {
    validate_spec(spec)?;

    let half = spec.bounding_size / 2.0;
    let (y_lo, y_hi) = spec.height_range;

    let mut points = Vec::with_capacity(ANCHORS.len() + spec.point_count + 1);
    points.extend_from_slice(&ANCHORS);

    for i in 0..spec.point_count {
        let index = i as u64;
        let mut rng = StdRng::seed_from_u64(mix_seed(&[spec.seed, index, 0]));
        let mut candidate = Vec3::new(
            rng.random_range(-half..half),
            rng.random_range(y_lo..=y_hi),
            rng.random_range(-half..half),
        );

        let prev = points[points.len() - 1];
        let mut nonce: u32 = 0;
        while candidate.distance(prev) < spec.min_separation {
            nonce += 1;
            if nonce > MAX_ATTEMPTS_PER_POINT {
                return Err(FlightError::invalid_argument(format!(
                    "could not place control point {i} at least {} away from its predecessor \
                     after {MAX_ATTEMPTS_PER_POINT} attempts",
                    spec.min_separation
                )));
            }
            let mut rng = StdRng::seed_from_u64(mix_seed(&[spec.seed, index, u64::from(nonce)]));
            candidate.x = rng.random_range(-half..half);
            candidate.z = rng.random_range(-half..half);
        }
        tracing::trace!(index = i, nonce, ?candidate, "placed control point");
        points.push(candidate);
    }

    ControlPointLoop::closed(points)
}

/// Largest `min_separation` every procedural point can satisfy in a `bounding_size` footprint.
///
/// Only x/z are redrawn, and the first predecessor is the anchor at the footprint center, whose
/// farthest reachable point is a corner half a diagonal away.
pub(crate) fn separation_limit(bounding_size: f32) -> f32 {
    bounding_size * std::f32::consts::FRAC_1_SQRT_2
}

fn validate_spec(spec: &LoopSpec) -> FlightResult<()> {
    // Subnormal sizes pass `> 0` but halve to zero, leaving no range to draw from.
    if !(spec.bounding_size.is_finite() && spec.bounding_size / 2.0 > 0.0) {
        return Err(FlightError::invalid_argument(format!(
            "bounding size must be > 0, got {}",
            spec.bounding_size
        )));
    }
    if !spec.min_separation.is_finite() || spec.min_separation < 0.0 {
        return Err(FlightError::invalid_argument(format!(
            "min separation must be >= 0, got {}",
            spec.min_separation
        )));
    }
    if spec.min_separation >= separation_limit(spec.bounding_size) {
        return Err(FlightError::invalid_argument(format!(
            "min separation {} is unreachable inside a {} footprint",
            spec.min_separation, spec.bounding_size
        )));
    }
    let (lo, hi) = spec.height_range;
    if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
        return Err(FlightError::invalid_argument(format!(
            "height range must be ordered, got [{lo}, {hi}]"
        )));
    }
    let total = ANCHORS.len() + spec.point_count + 1;
    if total > FACTORIAL_TABLE_LEN {
        return Err(FlightError::domain(format!(
            "loop of {total} points exceeds the curve limit of {FACTORIAL_TABLE_LEN}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/bezier/path.rs"]
mod tests;
