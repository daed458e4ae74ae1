use std::fmt;

use crate::{
    foundation::{
        core::Resolution,
        error::{FlightError, FlightResult},
    },
    render::targets::{GBuffer, PixelFormat, RenderTargetSet, SurfaceId},
};

#[derive(Clone, Debug)]
/// Fixed per-frame pass sequence over the surfaces of a [`RenderTargetSet`].
///
/// A plan consists of:
/// - a geometry pass filling the G-buffer
/// - a lighting pass accumulating into an effect surface
/// - the post-process chain, ending on `final_surface`
///
/// The plan is built and validated once at startup and never changes afterwards.
pub struct FramePlan {
    /// Passes in execution order.
    pub passes: Vec<Pass>,
    /// Surface read back and presented after the last pass.
    pub final_surface: SurfaceId,
}

#[derive(Clone, Debug)]
/// A single pass in a [`FramePlan`].
pub enum Pass {
    /// Instanced scene geometry into the G-buffer.
    Geometry(GeometryPass),
    /// Additive directional lights from the G-buffer.
    Lighting(LightingPass),
    /// One full-screen post-process stage.
    Fx(FxPass),
}

impl Pass {
    /// Short name used in logs and `plan` listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Geometry(_) => "geometry",
            Self::Lighting(_) => "lighting",
            Self::Fx(p) => p.stage.label(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Draw issued by the geometry pass.
pub enum GeometryDraw {
    /// `grid_size²` cube instances, placed from the instance index.
    CubeGrid,
    /// Sphere marking the path lookahead point.
    Marker,
}

#[derive(Clone, Debug)]
/// Clear the G-buffer, then draw with depth test and depth write, no blending.
pub struct GeometryPass {
    /// Attachments written.
    pub gbuffer: GBuffer,
    /// Draws in order.
    pub draws: Vec<GeometryDraw>,
}

#[derive(Clone, Debug)]
/// Clear `target`, add one full-screen draw per active light, then optionally add the albedo.
pub struct LightingPass {
    /// Attachments sampled.
    pub gbuffer: GBuffer,
    /// Accumulation surface.
    pub target: SurfaceId,
    /// Add the unlit G-buffer color after the lights.
    pub add_albedo: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Axis of one separable blur pass.
pub enum BlurDirection {
    /// Along x.
    Horizontal,
    /// Along y.
    Vertical,
}

impl BlurDirection {
    /// Integer texel step.
    pub fn step(self) -> [i32; 2] {
        match self {
            Self::Horizontal => [1, 0],
            Self::Vertical => [0, 1],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Full-screen effect stage.
pub enum FxStage {
    /// One direction of the separable box blur.
    Blur(BlurDirection),
    /// Depth to blur weight.
    CircleOfConfusion,
    /// Sharp/blurred mix driven by the circle of confusion.
    DepthOfField,
    /// Power-law remap.
    Gamma,
    /// Time-driven row displacement.
    Glitch,
    /// Plain color copy (G-buffer inspection).
    Blit,
    /// Linearized depth copy (G-buffer inspection).
    BlitDepth,
}

impl FxStage {
    /// Short name used in logs and `plan` listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Blur(BlurDirection::Horizontal) => "blur_horizontal",
            Self::Blur(BlurDirection::Vertical) => "blur_vertical",
            Self::CircleOfConfusion => "coc",
            Self::DepthOfField => "dof",
            Self::Gamma => "gamma",
            Self::Glitch => "glitch",
            Self::Blit => "blit",
            Self::BlitDepth => "blit_depth",
        }
    }

    /// Texture binding names the stage reads, in binding order.
    pub fn input_names(self) -> &'static [&'static str] {
        match self {
            Self::Blur(_) | Self::Gamma | Self::Glitch | Self::Blit => &["texture"],
            Self::CircleOfConfusion | Self::BlitDepth => &["depth"],
            Self::DepthOfField => &["color", "coc", "blur"],
        }
    }

    /// Whether the named input is a depth surface.
    pub fn input_is_depth(self, name: &str) -> bool {
        name == "depth"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Named texture input of an [`FxPass`].
pub struct FxInput {
    /// Binding name in the stage's shader program.
    pub name: &'static str,
    /// Surface bound under that name.
    pub surface: SurfaceId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Pixel rectangle of the output surface a pass draws into.
pub struct Viewport {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Viewport {
    /// The whole surface.
    pub fn full(resolution: Resolution) -> Self {
        Self {
            x: 0,
            y: 0,
            width: resolution.width,
            height: resolution.height,
        }
    }
}

#[derive(Clone, Debug)]
/// One post-process draw: read `inputs`, write `output`.
pub struct FxPass {
    /// Effect.
    pub stage: FxStage,
    /// Texture inputs by binding name.
    pub inputs: Vec<FxInput>,
    /// Surface bound to the effect framebuffer's color-0 slot.
    pub output: SurfaceId,
    /// Sub-rectangle to draw into; `None` covers the whole output.
    pub viewport: Option<Viewport>,
    /// Clear `output` before drawing.
    pub clear: bool,
}

impl FxPass {
    fn full(stage: FxStage, inputs: &[SurfaceId], output: SurfaceId) -> Self {
        Self {
            stage,
            inputs: stage
                .input_names()
                .iter()
                .zip(inputs)
                .map(|(&name, &surface)| FxInput { name, surface })
                .collect(),
            output,
            viewport: None,
            clear: true,
        }
    }

    /// Surface bound under `name`, if any.
    pub fn input(&self, name: &str) -> Option<SurfaceId> {
        self.inputs.iter().find(|i| i.name == name).map(|i| i.surface)
    }
}

impl FramePlan {
    /// The fixed pipeline over `targets`.
    ///
    /// Wiring: lights into fx0, vertical blur fx0→fx1, horizontal blur fx1→fx2, CoC from depth
    /// into fx1, DoF (fx0, fx1, fx2)→fx3, gamma fx3→fx1, glitch fx1→final. With `debug_views`,
    /// the G-buffer attachments are blitted into thirds of the bottom quarter of the final surface;
    /// below 3x4 pixels those insets would be empty and are left out.
    pub fn standard(targets: &RenderTargetSet, debug_views: bool) -> FlightResult<Self> {
        let g = targets.gbuffer();
        let [fx0, fx1, fx2, fx3] = targets.fx_pool();
        let final_surface = targets.final_surface();

        let mut passes = vec![
            Pass::Geometry(GeometryPass {
                gbuffer: g,
                draws: vec![GeometryDraw::CubeGrid, GeometryDraw::Marker],
            }),
            Pass::Lighting(LightingPass {
                gbuffer: g,
                target: fx0,
                add_albedo: true,
            }),
            Pass::Fx(FxPass::full(FxStage::Blur(BlurDirection::Vertical), &[fx0], fx1)),
            Pass::Fx(FxPass::full(FxStage::Blur(BlurDirection::Horizontal), &[fx1], fx2)),
            Pass::Fx(FxPass::full(FxStage::CircleOfConfusion, &[g.depth], fx1)),
            Pass::Fx(FxPass::full(FxStage::DepthOfField, &[fx0, fx1, fx2], fx3)),
            Pass::Fx(FxPass::full(FxStage::Gamma, &[fx3], fx1)),
            Pass::Fx(FxPass::full(FxStage::Glitch, &[fx1], final_surface)),
        ];

        let res = targets.resolution();
        let (width, height) = (res.width / 3, res.height / 4);
        if debug_views && (width == 0 || height == 0) {
            tracing::warn!(
                width = res.width,
                height = res.height,
                "resolution too small for debug views, skipping them"
            );
        } else if debug_views {
            let y = res.height - height;
            let views = [
                (FxStage::Blit, g.color),
                (FxStage::Blit, g.normal),
                (FxStage::BlitDepth, g.depth),
            ];
            for (slot, (stage, src)) in views.into_iter().enumerate() {
                let mut pass = FxPass::full(stage, &[src], final_surface);
                pass.viewport = Some(Viewport {
                    x: slot as u32 * width,
                    y,
                    width,
                    height,
                });
                pass.clear = false;
                passes.push(Pass::Fx(pass));
            }
        }

        let plan = Self {
            passes,
            final_surface,
        };
        plan.validate(targets)?;
        Ok(plan)
    }

    /// Check surface existence, formats, input names, and that no pass reads the surface it writes.
    pub fn validate(&self, targets: &RenderTargetSet) -> FlightResult<()> {
        let format_of = |id: SurfaceId| targets.desc(id).map(|d| d.format);

        if !targets.accepts_color0(self.final_surface) {
            return Err(FlightError::validation(format!(
                "final surface {:?} is not a color target",
                self.final_surface
            )));
        }

        let mut writes_final = false;
        for (idx, pass) in self.passes.iter().enumerate() {
            let label = pass.label();
            match pass {
                Pass::Geometry(p) => {
                    expect_format(format_of(p.gbuffer.color)?, PixelFormat::Rgba8, label)?;
                    expect_format(format_of(p.gbuffer.normal)?, PixelFormat::Rgba32Float, label)?;
                    expect_format(format_of(p.gbuffer.depth)?, PixelFormat::Depth24, label)?;
                }
                Pass::Lighting(p) => {
                    format_of(p.target)?;
                    if !targets.accepts_color0(p.target) {
                        return Err(FlightError::validation(format!(
                            "pass {idx} ({label}) writes {:?}, which is not an effect target",
                            p.target
                        )));
                    }
                    let g = p.gbuffer;
                    if [g.color, g.normal, g.depth].contains(&p.target) {
                        return Err(read_while_write(idx, label, p.target));
                    }
                    writes_final |= p.target == self.final_surface;
                }
                Pass::Fx(p) => {
                    format_of(p.output)?;
                    if !targets.accepts_color0(p.output) {
                        return Err(FlightError::validation(format!(
                            "pass {idx} ({label}) writes {:?}, which is not an effect target",
                            p.output
                        )));
                    }
                    let expected = p.stage.input_names();
                    let names: Vec<_> = p.inputs.iter().map(|i| i.name).collect();
                    if names != expected {
                        return Err(FlightError::validation(format!(
                            "pass {idx} ({label}) binds {names:?}, expected {expected:?}"
                        )));
                    }
                    for input in &p.inputs {
                        if input.surface == p.output {
                            return Err(read_while_write(idx, label, p.output));
                        }
                        let fmt = format_of(input.surface)?;
                        if p.stage.input_is_depth(input.name) != (fmt == PixelFormat::Depth24) {
                            return Err(FlightError::validation(format!(
                                "pass {idx} ({label}) input '{}' has format {fmt:?}",
                                input.name
                            )));
                        }
                    }
                    if let Some(vp) = p.viewport {
                        let res = targets.resolution();
                        if vp.width == 0
                            || vp.height == 0
                            || vp.x + vp.width > res.width
                            || vp.y + vp.height > res.height
                        {
                            return Err(FlightError::validation(format!(
                                "pass {idx} ({label}) viewport {vp:?} is outside {}x{}",
                                res.width, res.height
                            )));
                        }
                    }
                    writes_final |= p.output == self.final_surface;
                }
            }
        }

        if !writes_final {
            return Err(FlightError::validation(
                "no pass writes the final surface",
            ));
        }
        Ok(())
    }

    /// Number of full-screen effect passes.
    pub fn fx_pass_count(&self) -> usize {
        self.passes
            .iter()
            .filter(|p| matches!(p, Pass::Fx(_)))
            .count()
    }
}

impl fmt::Display for FramePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, pass) in self.passes.iter().enumerate() {
            write!(f, "{idx:2} {:<16}", pass.label())?;
            match pass {
                Pass::Geometry(p) => write!(
                    f,
                    " -> color {} normal {} depth {} ({:?})",
                    p.gbuffer.color.0, p.gbuffer.normal.0, p.gbuffer.depth.0, p.draws
                )?,
                Pass::Lighting(p) => write!(
                    f,
                    " gbuffer ({}, {}, {}) -> {}{}",
                    p.gbuffer.color.0,
                    p.gbuffer.normal.0,
                    p.gbuffer.depth.0,
                    p.target.0,
                    if p.add_albedo { " +albedo" } else { "" }
                )?,
                Pass::Fx(p) => {
                    for input in &p.inputs {
                        write!(f, " {}={}", input.name, input.surface.0)?;
                    }
                    write!(f, " -> {}", p.output.0)?;
                    if let Some(vp) = p.viewport {
                        write!(f, " @{},{} {}x{}", vp.x, vp.y, vp.width, vp.height)?;
                    }
                }
            }
            writeln!(f)?;
        }
        write!(f, "final surface {}", self.final_surface.0)
    }
}

fn expect_format(actual: PixelFormat, expected: PixelFormat, label: &str) -> FlightResult<()> {
    if actual != expected {
        return Err(FlightError::validation(format!(
            "{label} pass expects {expected:?}, surface is {actual:?}"
        )));
    }
    Ok(())
}

fn read_while_write(idx: usize, label: &str, id: SurfaceId) -> FlightError {
    FlightError::validation(format!(
        "pass {idx} ({label}) reads and writes surface {id:?}"
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
