use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::foundation::{
    error::{FlightError, FlightResult},
    math::{signed_angle, wrap_index},
};

/// Timing of the autopilot relative to the trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowTiming {
    /// Trajectory samples advanced per second.
    pub samples_per_second: f64,
    /// How far ahead (seconds) the marker sphere runs.
    pub lookahead_secs: f64,
    /// How far behind (seconds) the banking reference point trails.
    pub trail_secs: f64,
}

impl Default for FollowTiming {
    fn default() -> Self {
        Self {
            samples_per_second: 40.0,
            lookahead_secs: 1.0,
            trail_secs: 0.1,
        }
    }
}

/// Camera pose sampled from the trajectory at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightPose {
    /// Trajectory index of the eye.
    pub index: usize,
    /// Camera position.
    pub eye: Vec3,
    /// Look-at point, halfway between the eye and the marker along the path.
    pub target: Vec3,
    /// Lookahead point, drawn as the marker sphere.
    pub marker: Vec3,
    /// Trailing point used as the banking reference.
    pub previous: Vec3,
    /// Banked up vector.
    pub up: Vec3,
}

impl FlightPose {
    /// Right-handed world-to-view matrix for this pose.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Plays back a precomputed trajectory as a banking fly-through camera.
#[derive(Clone, Debug)]
pub struct PathFollower {
    trajectory: Vec<Vec3>,
    timing: FollowTiming,
}

impl PathFollower {
    /// Wrap a trajectory. It needs at least two samples and a positive rate.
    pub fn new(trajectory: Vec<Vec3>, timing: FollowTiming) -> FlightResult<Self> {
        if trajectory.len() < 2 {
            return Err(FlightError::invalid_argument(format!(
                "trajectory needs at least 2 samples, got {}",
                trajectory.len()
            )));
        }
        if !(timing.samples_per_second.is_finite() && timing.samples_per_second > 0.0) {
            return Err(FlightError::invalid_argument(
                "trajectory playback rate must be > 0",
            ));
        }
        Ok(Self { trajectory, timing })
    }

    /// Dense trajectory samples.
    pub fn trajectory(&self) -> &[Vec3] {
        &self.trajectory
    }

    /// Playback timing.
    pub fn timing(&self) -> FollowTiming {
        self.timing
    }

    /// `floor(time * rate) mod len`, Euclidean so negative times stay in range.
    pub fn index_at(&self, time: f64) -> usize {
        let raw = (time * self.timing.samples_per_second).floor() as i64;
        wrap_index(raw, self.trajectory.len())
    }

    /// Sample eye, target, marker and banking at `time` seconds.
    ///
    /// The look-at index is taken halfway along the path from eye to marker modulo the
    /// trajectory length, so it stays ahead of the eye across the loop seam.
    pub fn pose_at(&self, time: f64) -> FlightPose {
        let n = self.trajectory.len();
        let eye_i = self.index_at(time);
        let marker_i = self.index_at(time + self.timing.lookahead_secs);
        let prev_i = self.index_at(time - self.timing.trail_secs);

        let ahead = (marker_i + n - eye_i) % n;
        let target_i = (eye_i + ahead / 2) % n;

        let eye = self.trajectory[eye_i];
        let target = self.trajectory[target_i];
        let marker = self.trajectory[marker_i];
        let previous = self.trajectory[prev_i];

        FlightPose {
            index: eye_i,
            eye,
            target,
            marker,
            previous,
            up: banked_up(eye, target, previous),
        }
    }
}

/// Up vector rolled by the turn between the incoming and outgoing path directions.
pub fn banked_up(eye: Vec3, target: Vec3, previous: Vec3) -> Vec3 {
    let angle = -signed_angle(target - eye, eye - previous, Vec3::X) / PI;
    Vec3::new(0.0, angle.cos().abs(), angle.sin())
}

#[cfg(test)]
#[path = "../../tests/unit/camera/autopilot.rs"]
mod tests;
