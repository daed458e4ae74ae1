use glam::Mat4;

use crate::{
    bezier::{
        curve::BezierCurve,
        path::{ControlPointLoop, generate_loop},
    },
    camera::{autopilot::PathFollower, controls::MouseControls, orbit::OrbitCamera},
    foundation::{
        core::{FrameRgba, Resolution},
        error::{FlightError, FlightResult},
    },
    frame::platform::{FrameInput, Platform},
    render::{
        passes::{FrameState, PassBackend, execute_plan},
        plan::FramePlan,
        targets::RenderTargetSet,
    },
    scene::params::{CameraMode, SceneParams},
};

/// Frames presented and dropped by [`FrameOrchestrator::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames handed to [`Platform::present`].
    pub presented: u64,
    /// Frames skipped after a recoverable error.
    pub dropped: u64,
}

/// Owns every per-session resource and turns [`FrameInput`]s into presented frames.
///
/// The control loop, trajectory, render targets and pass plan are built once in
/// [`FrameOrchestrator::new`]. Tunables are read from the [`SceneParams`] passed into each frame,
/// except `debug_views`, which shapes the plan and is fixed at startup.
#[derive(Debug)]
pub struct FrameOrchestrator {
    resolution: Resolution,
    seed: u64,
    control_loop: ControlPointLoop,
    follower: PathFollower,
    orbit: OrbitCamera,
    controls: MouseControls,
    targets: RenderTargetSet,
    plan: FramePlan,
    frame_index: u64,
}

impl FrameOrchestrator {
    /// Generate the flight path for `seed` and build the pass plan for `resolution`.
    #[tracing::instrument(skip(params))]
    pub fn new(resolution: Resolution, params: &SceneParams, seed: u64) -> FlightResult<Self> {
        params.validate()?;

        let control_loop = generate_loop(&params.path.loop_spec(seed))?;
        let curve = BezierCurve::new();
        let trajectory =
            control_loop.smooth(&curve, params.path.sample_count(control_loop.len()))?;
        let follower = PathFollower::new(trajectory, params.path.timing())?;

        let targets = RenderTargetSet::new(resolution);
        let plan = FramePlan::standard(&targets, params.debug_views)?;

        tracing::info!(
            width = resolution.width,
            height = resolution.height,
            control_points = control_loop.len(),
            trajectory_samples = follower.trajectory().len(),
            passes = plan.passes.len(),
            "frame orchestrator ready"
        );

        Ok(Self {
            resolution,
            seed,
            control_loop,
            follower,
            orbit: OrbitCamera::default(),
            controls: MouseControls::default(),
            targets,
            plan,
            frame_index: 0,
        })
    }

    /// Output resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Seed the control loop was generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Closed control loop behind the trajectory.
    pub fn control_loop(&self) -> &ControlPointLoop {
        &self.control_loop
    }

    /// Autopilot playback of the smoothed trajectory.
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Manually driven camera.
    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    /// Validated pass plan.
    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    /// Frames rendered so far, including dropped ones.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Update the camera from `input` and derive this frame's matrices.
    ///
    /// The marker sphere follows the path lookahead in both camera modes.
    pub fn frame_state<'p>(
        &mut self,
        input: &FrameInput,
        params: &'p SceneParams,
    ) -> FrameState<'p> {
        let pose = self.follower.pose_at(input.time);
        let (view, eye) = match params.camera_mode {
            CameraMode::Autopilot => (pose.view_matrix(), pose.eye),
            CameraMode::Orbit => {
                self.controls.apply(&input.pointer, &mut self.orbit);
                (self.orbit.view_matrix(), self.orbit.eye())
            }
        };

        let p = &params.projection;
        let projection = Mat4::perspective_rh(
            p.fov_y_degrees.to_radians(),
            self.resolution.aspect(),
            p.z_near,
            p.z_far,
        );

        FrameState {
            frame_index: self.frame_index,
            time: input.time as f32,
            resolution: self.resolution,
            view,
            projection,
            inverse_projection: projection.inverse(),
            eye,
            marker: pose.marker,
            params,
        }
    }

    /// Render one frame through `backend`.
    #[tracing::instrument(level = "debug", skip_all, fields(frame = self.frame_index))]
    pub fn render_frame<B: PassBackend + ?Sized>(
        &mut self,
        input: &FrameInput,
        params: &SceneParams,
        backend: &mut B,
    ) -> FlightResult<FrameRgba> {
        let frame = self.frame_state(input, params);
        let out = execute_plan(backend, &self.plan, &mut self.targets, &frame);
        self.frame_index += 1;
        out
    }

    /// Drive frames from `platform` until it requests close.
    ///
    /// Recoverable errors (see [`FlightError::is_fatal`]) drop the frame with a warning and the loop
    /// carries on; anything else ends the run.
    pub fn run<P, B>(
        &mut self,
        platform: &mut P,
        backend: &mut B,
        params: &SceneParams,
    ) -> FlightResult<RunSummary>
    where
        P: Platform + ?Sized,
        B: PassBackend + ?Sized,
    {
        if platform.resolution() != self.resolution {
            return Err(FlightError::validation(format!(
                "platform resolution {:?} differs from the orchestrator's {:?}",
                platform.resolution(),
                self.resolution
            )));
        }

        let mut summary = RunSummary::default();
        loop {
            let input = platform.poll();
            if input.close_requested {
                tracing::info!(
                    presented = summary.presented,
                    dropped = summary.dropped,
                    "close requested"
                );
                return Ok(summary);
            }

            let frame = self.frame_index;
            let result = self
                .render_frame(&input, params, backend)
                .and_then(|rgba| platform.present(rgba));
            match result {
                Ok(()) => summary.presented += 1,
                Err(e) if !e.is_fatal() => {
                    tracing::warn!(frame, error = %e, "frame dropped");
                    summary.dropped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/orchestrator.rs"]
mod tests;
