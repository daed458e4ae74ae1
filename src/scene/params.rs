use std::{fs::File, io::BufReader, path::Path};

use glam::Vec3;

use crate::{
    bezier::{
        bernstein::FACTORIAL_TABLE_LEN,
        path::{ANCHORS, LoopSpec, separation_limit},
    },
    camera::autopilot::FollowTiming,
    foundation::error::{FlightError, FlightResult},
};

/// Upper bound on simultaneously active directional lights.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// One directional light. Uploaded fresh every frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DirectionalLight {
    /// World-space direction the light travels in.
    pub direction: Vec3,
    /// Linear color.
    pub color: Vec3,
    /// Scalar multiplier.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -1.0, 0.0),
            color: Vec3::new(1.0, 0.0, 0.0),
            intensity: 1.0,
        }
    }
}

/// Which camera drives the view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Fly along the generated Bezier trajectory.
    #[default]
    Autopilot,
    /// Manual orbit camera driven by pointer drags.
    Orbit,
}

/// Depth-of-field focus planes, in view-space units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FocusPlanes {
    /// Distance rendered perfectly sharp.
    pub focus: f32,
    /// Blur ramp length in front of the focus plane.
    pub near: f32,
    /// Blur ramp length behind the focus plane.
    pub far: f32,
}

impl Default for FocusPlanes {
    fn default() -> Self {
        Self {
            focus: 15.0,
            near: 1.0,
            far: 50.0,
        }
    }
}

/// Camera path generation and playback settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PathParams {
    /// Generator seed. `None` lets the caller pick one (the binary uses the wall clock).
    pub seed: Option<u64>,
    /// Side of the square x/z footprint waypoints are drawn from.
    pub bounding_size: f32,
    /// Procedural waypoints after the three anchors.
    pub procedural_points: usize,
    /// Minimum distance between a waypoint and its predecessor.
    pub min_separation: f32,
    /// Waypoint height range `[lo, hi]`.
    pub height_range: [f32; 2],
    /// Trajectory samples per control point.
    pub smoothing: usize,
    /// Trajectory samples advanced per second.
    pub samples_per_second: f64,
    /// Lookahead of the marker sphere, seconds.
    pub lookahead_secs: f64,
    /// Trail of the banking reference point, seconds.
    pub trail_secs: f64,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            seed: None,
            bounding_size: 500.0,
            procedural_points: FACTORIAL_TABLE_LEN - ANCHORS.len() - 1,
            min_separation: 200.0,
            height_range: [1.0, 16.0],
            smoothing: 50,
            samples_per_second: 40.0,
            lookahead_secs: 1.0,
            trail_secs: 0.1,
        }
    }
}

impl PathParams {
    /// Loop generator input for a concrete seed.
    pub fn loop_spec(&self, seed: u64) -> LoopSpec {
        LoopSpec {
            bounding_size: self.bounding_size,
            point_count: self.procedural_points,
            min_separation: self.min_separation,
            height_range: (self.height_range[0], self.height_range[1]),
            seed,
        }
    }

    /// Number of trajectory samples for a loop of `control_points` points.
    pub fn sample_count(&self, control_points: usize) -> usize {
        control_points * self.smoothing
    }

    /// Playback timing for the path follower.
    pub fn timing(&self) -> FollowTiming {
        FollowTiming {
            samples_per_second: self.samples_per_second,
            lookahead_secs: self.lookahead_secs,
            trail_secs: self.trail_secs,
        }
    }
}

/// Perspective projection settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionParams {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub z_near: f32,
    /// Far clip distance.
    pub z_far: f32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            z_near: 0.1,
            z_far: 10_000.0,
        }
    }
}

/// Every tunable of the scene and pipeline.
///
/// Passed by reference into the orchestrator each frame; a debug overlay or a config file may
/// rewrite any field between frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneParams {
    /// Clear color of the final surface.
    pub clear_color: [f32; 4],
    /// Cubes per grid side. The grid draw issues `grid_size²` instances.
    pub grid_size: u32,
    /// Grid tint close to the camera.
    pub color_near: Vec3,
    /// Grid tint far from the camera.
    pub color_far: Vec3,
    /// Grid emissive brightness.
    pub brightness: f32,
    /// Grid distance attenuation.
    pub attenuation: f32,
    /// Active directional lights (at most [`MAX_DIRECTIONAL_LIGHTS`]).
    pub lights: Vec<DirectionalLight>,
    /// Color of the lookahead marker sphere.
    pub sphere_color: Vec3,
    /// Taps per side of the separable blur.
    pub blur_samples: i32,
    /// Gamma exponent; output is `color^(1/gamma)`.
    pub gamma: f32,
    /// Depth-of-field planes.
    pub focus: FocusPlanes,
    /// Camera driving the view.
    pub camera_mode: CameraMode,
    /// Blit the G-buffer attachments into the bottom of the final image.
    pub debug_views: bool,
    /// Path generation and playback.
    pub path: PathParams,
    /// Projection.
    pub projection: ProjectionParams,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            grid_size: 500,
            color_near: Vec3::new(0.91, 0.41, 0.19),
            color_far: Vec3::new(0.56, 0.06, 0.32),
            brightness: 100.0,
            attenuation: 7.0,
            lights: vec![DirectionalLight::default()],
            sphere_color: Vec3::ONE,
            blur_samples: 5,
            gamma: 1.2,
            focus: FocusPlanes::default(),
            camera_mode: CameraMode::default(),
            debug_views: false,
            path: PathParams::default(),
            projection: ProjectionParams::default(),
        }
    }
}

impl SceneParams {
    /// Parse from a JSON reader and validate.
    pub fn from_reader<R: std::io::Read>(r: R) -> FlightResult<Self> {
        let params: Self = serde_json::from_reader(r)
            .map_err(|e| FlightError::validation(format!("parse scene params JSON: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Load from a JSON file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> FlightResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FlightError::validation(format!("open scene params '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check structural limits. Slider-style tunables are not range checked.
    pub fn validate(&self) -> FlightResult<()> {
        if self.grid_size == 0 {
            return Err(FlightError::validation("grid_size must be > 0"));
        }
        if self.grid_size.checked_mul(self.grid_size).is_none() {
            return Err(FlightError::validation("grid_size squared overflows u32"));
        }
        if self.lights.len() > MAX_DIRECTIONAL_LIGHTS {
            return Err(FlightError::validation(format!(
                "at most {MAX_DIRECTIONAL_LIGHTS} directional lights are supported, got {}",
                self.lights.len()
            )));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(FlightError::validation("gamma must be > 0"));
        }
        if self.path.smoothing == 0 {
            return Err(FlightError::validation("path smoothing must be > 0"));
        }
        if !(self.path.bounding_size.is_finite() && self.path.bounding_size / 2.0 > 0.0) {
            return Err(FlightError::validation("path bounding_size must be > 0"));
        }
        if self.path.min_separation >= separation_limit(self.path.bounding_size) {
            return Err(FlightError::validation(format!(
                "path min_separation {} is unreachable inside a {} footprint",
                self.path.min_separation, self.path.bounding_size
            )));
        }
        let loop_len = ANCHORS.len() + self.path.procedural_points + 1;
        if loop_len > FACTORIAL_TABLE_LEN {
            return Err(FlightError::validation(format!(
                "path of {loop_len} control points exceeds the maximum of {FACTORIAL_TABLE_LEN}"
            )));
        }
        if !(self.path.samples_per_second.is_finite() && self.path.samples_per_second > 0.0) {
            return Err(FlightError::validation("path samples_per_second must be > 0"));
        }
        let p = &self.projection;
        if !(p.z_near > 0.0 && p.z_far > p.z_near && p.fov_y_degrees > 0.0 && p.fov_y_degrees < 180.0) {
            return Err(FlightError::validation(
                "projection needs 0 < z_near < z_far and 0 < fov_y_degrees < 180",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/params.rs"]
mod tests;
