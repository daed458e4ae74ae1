use glam::{Mat4, Vec3};

use crate::{
    foundation::{
        core::{FrameRgba, Resolution},
        error::FlightResult,
    },
    render::{
        plan::{FramePlan, FxPass, GeometryPass, LightingPass, Pass},
        targets::{RenderTargetSet, SurfaceDesc, SurfaceId},
    },
    scene::params::SceneParams,
};

/// Everything a pass may read for the current frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameState<'a> {
    /// Frames rendered before this one.
    pub frame_index: u64,
    /// Elapsed seconds.
    pub time: f32,
    /// Output resolution.
    pub resolution: Resolution,
    /// World to view.
    pub view: Mat4,
    /// View to clip.
    pub projection: Mat4,
    /// Clip to view, for depth unprojection.
    pub inverse_projection: Mat4,
    /// Camera position.
    pub eye: Vec3,
    /// Lookahead marker position.
    pub marker: Vec3,
    /// Tunables for this frame.
    pub params: &'a SceneParams,
}

impl FrameState<'_> {
    /// `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// A backend that can execute the passes of a [`FramePlan`].
pub trait PassBackend {
    /// Make sure `id` is allocated with `desc`. Called every frame; allocation happens once.
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> FlightResult<()>;

    /// Called before the first pass of a frame.
    fn begin_frame(&mut self, _frame: &FrameState<'_>) -> FlightResult<()> {
        Ok(())
    }

    /// Draw scene geometry into the G-buffer.
    fn exec_geometry(&mut self, pass: &GeometryPass, frame: &FrameState<'_>) -> FlightResult<()>;

    /// Accumulate directional lights.
    fn exec_lighting(&mut self, pass: &LightingPass, frame: &FrameState<'_>) -> FlightResult<()>;

    /// Run one post-process stage into the surface bound to the effect color-0 slot.
    fn exec_fx(&mut self, pass: &FxPass, frame: &FrameState<'_>) -> FlightResult<()>;

    /// Read `surface` back as tightly packed RGBA8.
    fn readback_rgba8(&mut self, surface: SurfaceId, desc: &SurfaceDesc)
    -> FlightResult<FrameRgba>;

    /// Called after readback, also when a pass failed.
    fn end_frame(&mut self) -> FlightResult<()> {
        Ok(())
    }
}

/// Run every pass of `plan` in order and read back the final surface.
///
/// Effect and lighting outputs are bound to the shared color-0 slot of `targets` right before the
/// pass executes.
pub fn execute_plan<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &FramePlan,
    targets: &mut RenderTargetSet,
    frame: &FrameState<'_>,
) -> FlightResult<FrameRgba> {
    for (id, desc) in targets.iter() {
        backend.ensure_surface(id, desc)?;
    }

    backend.begin_frame(frame)?;
    let out = run_passes(backend, plan, targets, frame).and_then(|()| {
        let desc = targets.desc(plan.final_surface)?;
        backend.readback_rgba8(plan.final_surface, desc)
    });
    let closed = backend.end_frame();

    let out = out?;
    closed?;
    Ok(out)
}

fn run_passes<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &FramePlan,
    targets: &mut RenderTargetSet,
    frame: &FrameState<'_>,
) -> FlightResult<()> {
    for pass in &plan.passes {
        match pass {
            Pass::Geometry(p) => backend.exec_geometry(p, frame)?,
            Pass::Lighting(p) => {
                targets.rebind_color0(p.target)?;
                backend.exec_lighting(p, frame)?;
            }
            Pass::Fx(p) => {
                targets.rebind_color0(p.output)?;
                backend.exec_fx(p, frame)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
