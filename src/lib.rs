//! Gridflight flies a camera along a procedural Bezier loop above an instanced cube grid and renders
//! each frame through a deferred pipeline with depth of field.
//!
//! # Pipeline overview
//!
//! 1. **Path**: seeded waypoint loop -> Bernstein-weighted Bezier trajectory ([`generate_loop`],
//!    [`BezierCurve`])
//! 2. **Camera**: banking autopilot over the trajectory ([`PathFollower`]) or a mouse-driven
//!    [`OrbitCamera`]
//! 3. **Plan**: fixed pass list over explicit surfaces ([`FramePlan`], [`RenderTargetSet`])
//! 4. **Render**: geometry into the G-buffer, additive lights, then blur, circle of confusion,
//!    depth of field, gamma and glitch ([`execute_plan`] over a [`PassBackend`])
//!
//! [`FrameOrchestrator`] ties the steps together per frame and drives a [`Platform`] until it asks
//! to close. The wgpu backend (`GpuBackend`) is behind the `gpu` feature.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic paths**: a seed fully determines the control loop and trajectory.
//! - **Startup failures are fatal**: shader, pipeline and target creation happen once; per-frame
//!   GPU errors drop the frame and the loop continues.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod bezier;
mod camera;
mod foundation;
mod frame;
mod render;
mod scene;

pub use bezier::bernstein::{BernsteinBasis, FACTORIAL_TABLE_LEN, MAX_DEGREE};
pub use bezier::curve::{BezierCurve, CurvePoint, interpolate_between_points};
pub use bezier::path::{ANCHORS, ControlPointLoop, LoopSpec, generate_loop};
pub use camera::autopilot::{FlightPose, FollowTiming, PathFollower, banked_up};
pub use camera::controls::{
    MOUSE_PAN_SPEED, MOUSE_TURN_SPEED, MOUSE_ZOOM_SPEED, MouseControls, PointerState,
};
pub use camera::orbit::{DEFAULT_RADIUS, MIN_RADIUS, OrbitCamera};
pub use foundation::core::{FrameRgba, Mat4, Resolution, Vec2, Vec3, Vec4};
pub use foundation::error::{FlightError, FlightResult};
pub use foundation::math::signed_angle;
pub use frame::orchestrator::{FrameOrchestrator, RunSummary};
pub use frame::platform::{FixedStepClock, FrameInput, Platform};
pub use render::fx::{
    GLITCH_BANDS, GLITCH_MAX_SHIFT, GLITCH_RATE, GLITCH_THRESHOLD, box_blur_rgba8,
    circle_of_confusion, depth_of_field, gamma_correct, glitch_shift, view_depth,
};
#[cfg(feature = "gpu")]
pub use render::gpu::{GpuBackend, UNIFORM_SLOT_SIZE};
pub use render::passes::{FrameState, PassBackend, execute_plan};
pub use render::plan::{
    BlurDirection, FramePlan, FxInput, FxPass, FxStage, GeometryDraw, GeometryPass, LightingPass,
    Pass, Viewport,
};
pub use render::shaders::{
    Blending, EmbeddedShaders, ShaderKind, ShaderLibrary, TextureSample, resolve_texture_slots,
};
pub use render::targets::{
    FX_POOL_SIZE, GBuffer, PixelFormat, RenderTargetSet, SurfaceDesc, SurfaceId,
};
pub use render::uniforms::{
    LIGHT_RECORD_SIZE, ScopedUpload, UniformWriter, UploadTarget, write_fx, write_grid,
    write_light, write_marker, write_viewport,
};
pub use scene::mesh::{MeshData, SPHERE_SUBDIVISIONS, cube, grid_instance_position, uv_sphere};
pub use scene::params::{
    CameraMode, DirectionalLight, FocusPlanes, MAX_DIRECTIONAL_LIGHTS, PathParams,
    ProjectionParams, SceneParams,
};
